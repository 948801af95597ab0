//! Main workflow definition type and validation

use crate::workflow::{StateId, WorkflowState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur when creating definition-related types
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Workflow ID cannot be empty or whitespace only
    #[error("Workflow ID cannot be empty or whitespace only")]
    EmptyWorkflowId,
}

/// Result type for definition operations
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Unique identifier for workflow definitions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(String);

impl WorkflowId {
    /// Create a new workflow ID
    ///
    /// # Panics
    /// Panics if the ID is empty or whitespace only. For non-panicking creation,
    /// use `try_new` instead.
    pub fn new(id: impl Into<String>) -> Self {
        Self::try_new(id).expect("Workflow ID cannot be empty or whitespace only")
    }

    /// Create a new workflow ID, returning an error for invalid input
    pub fn try_new(id: impl Into<String>) -> DefinitionResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DefinitionError::EmptyWorkflowId);
        }
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkflowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkflowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The static, declarative graph of states a workflow instance runs against
///
/// Immutable per version. Transition targets are resolved lazily during
/// execution, so a definition under iterative editing may carry dangling
/// references; only the start reference and condition shape are checked
/// up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Unique key for this workflow
    pub workflow_id: WorkflowId,
    /// Definition version, informational only
    pub version: u32,
    /// Display name
    pub name: String,
    /// ID of the state the instance starts in
    pub start: StateId,
    /// All states, keyed by state ID
    pub states: HashMap<StateId, WorkflowState>,
}

impl WorkflowDefinition {
    /// Create a new definition with no states
    pub fn new(workflow_id: WorkflowId, name: impl Into<String>, start: StateId) -> Self {
        Self {
            workflow_id,
            version: 1,
            name: name.into(),
            start,
            states: Default::default(),
        }
    }

    /// Add or replace a state
    pub fn add_state(&mut self, id: StateId, state: WorkflowState) {
        self.states.insert(id, state);
    }

    /// Look up a state by ID
    pub fn get_state(&self, id: &StateId) -> Option<&WorkflowState> {
        self.states.get(id)
    }

    /// Validate the definition structure
    ///
    /// Checks the start reference and that no state's routing table carries
    /// more than one `else` entry. Transition targets are deliberately not
    /// checked; they resolve lazily when a token reaches them.
    pub fn validate_structure(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Workflow name cannot be empty".to_string());
        }

        if !self.states.contains_key(&self.start) {
            errors.push(format!(
                "Start state '{}' not found in workflow states. Available states: {:?}",
                self.start,
                self.states.keys().map(|k| k.as_str()).collect::<Vec<_>>()
            ));
        }

        for (id, state) in &self.states {
            if let Some(conditions) = &state.conditions {
                let else_count = conditions
                    .iter()
                    .filter(|c| c.else_target.is_some())
                    .count();
                if else_count > 1 {
                    errors.push(format!(
                        "State '{id}' has {else_count} 'else' condition entries; at most one is allowed"
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
