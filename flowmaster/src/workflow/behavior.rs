//! Behavior resolution: state type -> base behavior -> execution mode

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Execution semantics of a state, resolved through the behavior registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Blocks until an external approve/reject decision arrives
    #[default]
    Interactive,
    /// Advances on its own, logging its configured action
    Automated,
    /// Routes by evaluating its condition table against the instance context
    Decision,
    /// Spawns one token per declared branch
    Parallel,
}

impl ExecutionMode {
    /// Get the string representation of the execution mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Interactive => "interactive",
            ExecutionMode::Automated => "automated",
            ExecutionMode::Decision => "decision",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator-editable template describing how a family of states executes
///
/// The capability flags gate which `WorkflowState` fields the designer offers
/// for states of this behavior; the engine itself only reads `execution_mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseBehaviorDefinition {
    /// Key referenced by `StateTypeDefinition::base_type`
    #[serde(rename = "type")]
    pub behavior_type: String,
    /// Display name
    pub name: String,
    /// Description shown in the behavior editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// How states of this behavior execute
    pub execution_mode: ExecutionMode,
    /// States may carry a role assignment
    #[serde(default)]
    pub has_role: bool,
    /// States may carry an SLA and timeout route
    #[serde(default)]
    pub has_sla: bool,
    /// States may carry an automated action identifier
    #[serde(default)]
    pub has_action_config: bool,
    /// States may carry a condition table
    #[serde(default)]
    pub has_conditions: bool,
    /// States may carry parallel branches
    #[serde(default)]
    pub has_branches: bool,
}

impl BaseBehaviorDefinition {
    /// Create a behavior with the given key and mode, all flags off
    pub fn new(
        behavior_type: impl Into<String>,
        name: impl Into<String>,
        execution_mode: ExecutionMode,
    ) -> Self {
        Self {
            behavior_type: behavior_type.into(),
            name: name.into(),
            description: None,
            execution_mode,
            has_role: false,
            has_sla: false,
            has_action_config: false,
            has_conditions: false,
            has_branches: false,
        }
    }
}

/// Display-facing state type, resolved to a base behavior by indirection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTypeDefinition {
    /// Key referenced by `WorkflowState::state_type`
    #[serde(rename = "type")]
    pub state_type: String,
    /// Display name
    pub name: String,
    /// Key of the `BaseBehaviorDefinition` this type executes as
    pub base_type: String,
    /// Color token for rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Description shown in the type picker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StateTypeDefinition {
    fn core(
        state_type: &str,
        name: &str,
        base_type: &str,
        color: &str,
        description: &str,
    ) -> Self {
        Self {
            state_type: state_type.to_string(),
            name: name.to_string(),
            base_type: base_type.to_string(),
            color: Some(color.to_string()),
            description: Some(description.to_string()),
        }
    }
}

/// Read-only (during execution) registries mapping state types to execution
/// semantics
///
/// Both lookups fall back to [`ExecutionMode::Interactive`] when a key is
/// missing, so definitions referencing unregistered types still run. Deleting
/// a behavior that a state type still references leaves a dangling reference;
/// that is tolerated the same way.
#[derive(Debug, Clone, Default)]
pub struct BehaviorRegistry {
    state_types: HashMap<String, StateTypeDefinition>,
    behaviors: HashMap<String, BaseBehaviorDefinition>,
}

impl BehaviorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with the five core state types and their
    /// behaviors
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_state_type(StateTypeDefinition::core(
            "task",
            "User Task",
            "task",
            "indigo",
            "Standard human approval step",
        ));
        registry.register_state_type(StateTypeDefinition::core(
            "multi-approver",
            "Group Approval",
            "multi-approver",
            "blue",
            "Requires approval from a group of users",
        ));
        registry.register_state_type(StateTypeDefinition::core(
            "parallel",
            "Parallel Split",
            "parallel",
            "purple",
            "Splits workflow into concurrent branches",
        ));
        registry.register_state_type(StateTypeDefinition::core(
            "decision",
            "Logic Gate",
            "decision",
            "emerald",
            "Conditional routing based on data",
        ));
        registry.register_state_type(StateTypeDefinition::core(
            "system",
            "System Action",
            "system",
            "slate",
            "Automated background process",
        ));

        let mut task = BaseBehaviorDefinition::new("task", "User Task", ExecutionMode::Interactive);
        task.has_role = true;
        task.has_sla = true;
        registry.register_behavior(task);

        let mut group = BaseBehaviorDefinition::new(
            "multi-approver",
            "Group Approval",
            ExecutionMode::Interactive,
        );
        group.has_role = true;
        group.has_sla = true;
        registry.register_behavior(group);

        let mut parallel =
            BaseBehaviorDefinition::new("parallel", "Parallel Split", ExecutionMode::Parallel);
        parallel.has_branches = true;
        registry.register_behavior(parallel);

        let mut decision =
            BaseBehaviorDefinition::new("decision", "Logic Gate", ExecutionMode::Decision);
        decision.has_conditions = true;
        registry.register_behavior(decision);

        let mut system =
            BaseBehaviorDefinition::new("system", "System Action", ExecutionMode::Automated);
        system.has_action_config = true;
        registry.register_behavior(system);

        registry
    }

    /// Add or replace a state type
    pub fn register_state_type(&mut self, definition: StateTypeDefinition) {
        self.state_types
            .insert(definition.state_type.clone(), definition);
    }

    /// Add or replace a base behavior
    pub fn register_behavior(&mut self, definition: BaseBehaviorDefinition) {
        self.behaviors
            .insert(definition.behavior_type.clone(), definition);
    }

    /// Remove a state type by key
    pub fn remove_state_type(&mut self, state_type: &str) -> Option<StateTypeDefinition> {
        self.state_types.remove(state_type)
    }

    /// Remove a base behavior by key
    ///
    /// State types still referencing it keep their dangling `base_type`;
    /// affected states resolve as interactive until the behavior returns.
    pub fn remove_behavior(&mut self, behavior_type: &str) -> Option<BaseBehaviorDefinition> {
        self.behaviors.remove(behavior_type)
    }

    /// Look up a state type by key
    pub fn state_type(&self, state_type: &str) -> Option<&StateTypeDefinition> {
        self.state_types.get(state_type)
    }

    /// Look up a base behavior by key
    pub fn behavior(&self, behavior_type: &str) -> Option<&BaseBehaviorDefinition> {
        self.behaviors.get(behavior_type)
    }

    /// Resolve a state type to its execution mode
    ///
    /// Pure function of the two registries: state type -> base type ->
    /// execution mode, falling back to interactive at either hop.
    pub fn resolve_execution_mode(&self, state_type: &str) -> ExecutionMode {
        let Some(type_def) = self.state_types.get(state_type) else {
            return ExecutionMode::Interactive;
        };
        self.behaviors
            .get(&type_def.base_type)
            .map(|behavior| behavior.execution_mode)
            .unwrap_or(ExecutionMode::Interactive)
    }
}
