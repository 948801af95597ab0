//! State-related types for workflow definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reserved transition target that ends a single token's path without
/// aborting the rest of the instance.
pub const TERMINATE_SENTINEL: &str = "__TERMINATE__";

/// Milliseconds per hour, used to convert legacy `slaHours` values
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Errors that can occur when creating state-related types
#[derive(Debug, Error)]
pub enum StateError {
    /// State ID cannot be empty or whitespace only
    #[error("State ID cannot be empty or whitespace only")]
    EmptyStateId,
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;

/// Unique identifier for workflow states
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateId(String);

impl StateId {
    /// Create a new state ID
    ///
    /// # Panics
    /// Panics if the ID is empty or whitespace only. For non-panicking creation,
    /// use `try_new` instead.
    pub fn new(id: impl Into<String>) -> Self {
        Self::try_new(id).expect("State ID cannot be empty or whitespace only")
    }

    /// Create a new state ID, returning an error for invalid input
    pub fn try_new(id: impl Into<String>) -> StateResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(StateError::EmptyStateId);
        }
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this ID is the reserved terminate sentinel
    pub fn is_terminate(&self) -> bool {
        self.0 == TERMINATE_SENTINEL
    }
}

impl From<String> for StateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rule deciding when a parallel group's join fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionRule {
    /// Wait for every branch to finish
    #[default]
    All,
    /// First branch finishing completes the join, cancelling siblings
    Any,
}

impl CompletionRule {
    /// Get the string representation of the completion rule
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionRule::All => "all",
            CompletionRule::Any => "any",
        }
    }
}

/// One entry of a decision state's routing table
///
/// Entries carry either an `if` expression routing to `next`, or an `else`
/// value naming the fallback target directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkflowCondition {
    /// Boolean expression over the instance context, bound as `data`
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub if_expr: Option<String>,
    /// Fallback target taken when no `if` entry has matched yet
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    pub else_target: Option<StateId>,
    /// Target taken when the `if` expression matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<StateId>,
}

/// A single state within a workflow definition
///
/// Which optional fields are meaningful depends on the execution mode the
/// behavior registry resolves for `state_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    /// Key into the state-type registry
    #[serde(rename = "type")]
    pub state_type: String,
    /// Role the step is assigned to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Default successor state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<StateId>,
    /// Successor taken on rejection; absent means rejection stops the instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_reject: Option<StateId>,
    /// Child states spawned by a parallel state, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<StateId>>,
    /// When the parallel group counts as finished
    #[serde(default)]
    pub completion_rule: CompletionRule,
    /// Ordered routing table for decision states
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<WorkflowCondition>>,
    /// Deprecated hour-granularity SLA, superseded by `sla_duration`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_hours: Option<f64>,
    /// Maximum dwell time in milliseconds before escalation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_duration: Option<i64>,
    /// Successor taken when the SLA is breached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_timeout: Option<StateId>,
    /// Identifier logged when an automated state executes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Approver group, display-only metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_group: Option<String>,
    /// Group approval rule, display-only metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_rule: Option<String>,
}

impl WorkflowState {
    /// Create a state of the given type with no optional fields set
    pub fn new(state_type: impl Into<String>) -> Self {
        Self {
            state_type: state_type.into(),
            role: None,
            next: None,
            on_reject: None,
            branches: None,
            completion_rule: CompletionRule::default(),
            conditions: None,
            sla_hours: None,
            sla_duration: None,
            on_timeout: None,
            action: None,
            role_group: None,
            approval_rule: None,
        }
    }

    /// Effective SLA for this state, if a positive one is configured
    ///
    /// `sla_duration` takes precedence; legacy `sla_hours` converts at
    /// 3,600,000 ms per hour.
    pub fn sla(&self) -> Option<chrono::Duration> {
        let millis = self
            .sla_duration
            .or_else(|| self.sla_hours.map(|hours| (hours * MILLIS_PER_HOUR) as i64))?;
        if millis > 0 {
            Some(chrono::Duration::milliseconds(millis))
        } else {
            None
        }
    }
}
