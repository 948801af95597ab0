//! Workflow runtime execution types

use crate::workflow::{StateId, WorkflowDefinition, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use ulid::Ulid;

/// Pseudo state ID recorded on the initial history entry
pub const START_HISTORY_STATE: &str = "START";

/// Unique identifier for task instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskInstanceId(Ulid);

impl TaskInstanceId {
    /// Create a new random task instance ID
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a TaskInstanceId from a string representation
    pub fn parse(s: &str) -> Result<Self, String> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| format!("Invalid task instance ID '{s}': {e}"))
    }
}

impl Default for TaskInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overall status of a task instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    /// Tokens are active or the instance has not started
    Running,
    /// All tokens drained without a final rejection
    Completed,
    /// The last transition was a fatal rejection
    Rejected,
}

impl InstanceStatus {
    /// Get the string representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Running => "running",
            InstanceStatus::Completed => "completed",
            InstanceStatus::Rejected => "rejected",
        }
    }
}

/// Kind of event recorded in the instance history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    /// External approval decision
    Approve,
    /// External rejection decision
    Reject,
    /// Engine-driven transition
    Auto,
    /// Instance creation
    Start,
}

impl HistoryAction {
    /// Get the string representation of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Approve => "approve",
            HistoryAction::Reject => "reject",
            HistoryAction::Auto => "auto",
            HistoryAction::Start => "start",
        }
    }
}

/// One entry of the append-only audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the transition was processed
    pub timestamp: DateTime<Utc>,
    /// The state the transition concerned
    pub state_id: StateId,
    /// What drove the transition
    pub action: HistoryAction,
    /// Human-readable rationale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Live execution state of one workflow instance
///
/// Owned by the caller, mutated exclusively through [`WorkflowExecutor`]
/// transition operations. [`WorkflowRun::snapshot`] projects the serializable
/// [`TaskInstance`] view for display or storage.
///
/// [`WorkflowExecutor`]: crate::workflow::WorkflowExecutor
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    /// Unique identifier for this instance
    pub id: TaskInstanceId,
    /// The definition being executed
    pub definition: WorkflowDefinition,
    /// Active tokens, one per concurrently live state
    pub current_states: Vec<StateId>,
    /// Append-only audit trail
    pub history: Vec<HistoryEntry>,
    /// Instance context data, referenced by decision expressions as `data`
    pub data: Value,
    /// Finished branches per parallel state, for join accounting
    pub parallel_completion: HashMap<StateId, Vec<StateId>>,
    /// Entry time of each active token, for SLA clocks
    pub(crate) entered_at: HashMap<StateId, DateTime<Utc>>,
    /// Parallel states whose join fires at the end of the current tick
    pub(crate) pending_joins: Vec<StateId>,
    /// When the instance was created
    pub created_at: DateTime<Utc>,
    /// When the instance last changed
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRun {
    /// Create a new run positioned at the definition's start state
    pub fn new(definition: WorkflowDefinition, data: Value, now: DateTime<Utc>) -> Self {
        let start = definition.start.clone();
        let mut entered_at = HashMap::new();
        entered_at.insert(start.clone(), now);

        Self {
            id: TaskInstanceId::new(),
            current_states: vec![start.clone()],
            history: vec![HistoryEntry {
                timestamp: now,
                state_id: StateId::new(START_HISTORY_STATE),
                action: HistoryAction::Start,
                details: Some(format!("Workflow started at {start}")),
            }],
            definition,
            data,
            parallel_completion: HashMap::new(),
            entered_at,
            pending_joins: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a token is currently positioned at `state_id`
    pub fn is_active(&self, state_id: &StateId) -> bool {
        self.current_states.contains(state_id)
    }

    /// Add a token, deduplicating against already-active states
    ///
    /// A re-added token keeps its original entry time; SLA clocks measure
    /// continuous residence.
    pub(crate) fn add_token(&mut self, state_id: StateId, now: DateTime<Utc>) {
        if self.is_active(&state_id) {
            return;
        }
        self.entered_at.insert(state_id.clone(), now);
        self.current_states.push(state_id);
        self.updated_at = now;
    }

    /// Remove a token and its SLA clock
    pub(crate) fn remove_token(&mut self, state_id: &StateId) {
        self.current_states.retain(|s| s != state_id);
        self.entered_at.remove(state_id);
    }

    /// Append a history entry
    pub(crate) fn record(
        &mut self,
        state_id: StateId,
        action: HistoryAction,
        details: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.history.push(HistoryEntry {
            timestamp: now,
            state_id,
            action,
            details,
        });
        self.updated_at = now;
    }

    /// Stop the whole instance, dropping every token
    pub(crate) fn halt(&mut self, now: DateTime<Utc>) {
        self.current_states.clear();
        self.entered_at.clear();
        self.pending_joins.clear();
        self.updated_at = now;
    }

    /// Current instance status
    ///
    /// Running while any token is active (or before the start entry exists);
    /// once the token set drains, the last history action decides between
    /// rejected and completed.
    pub fn status(&self) -> InstanceStatus {
        if !self.current_states.is_empty() || self.history.is_empty() {
            return InstanceStatus::Running;
        }
        match self.history.last().map(|entry| entry.action) {
            Some(HistoryAction::Reject) => InstanceStatus::Rejected,
            _ => InstanceStatus::Completed,
        }
    }

    /// Project the serializable snapshot of this run
    ///
    /// Side-effect free; call after every transition to keep displayed or
    /// persisted views consistent.
    pub fn snapshot(&self) -> TaskInstance {
        TaskInstance {
            id: self.id,
            workflow_id: self.definition.workflow_id.clone(),
            workflow_name: self.definition.name.clone(),
            status: self.status(),
            data: self.data.clone(),
            current_states: self.current_states.clone(),
            history: self.history.clone(),
            parallel_completion: self.parallel_completion.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Serializable snapshot of a running or finished instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstance {
    /// Unique identifier for this instance
    pub id: TaskInstanceId,
    /// Key of the definition being executed
    pub workflow_id: WorkflowId,
    /// Definition display name, cached for display
    pub workflow_name: String,
    /// Overall status
    pub status: InstanceStatus,
    /// Instance context data
    pub data: Value,
    /// Active tokens at snapshot time
    pub current_states: Vec<StateId>,
    /// Append-only audit trail
    pub history: Vec<HistoryEntry>,
    /// Finished branches per parallel state
    pub parallel_completion: HashMap<StateId, Vec<StateId>>,
    /// When the instance was created
    pub created_at: DateTime<Utc>,
    /// When the instance last changed
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_helpers::*;

    #[test]
    fn test_task_instance_id_creation() {
        let id1 = TaskInstanceId::new();
        let id2 = TaskInstanceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_task_instance_id_parse_round_trip() {
        let id = TaskInstanceId::new();
        let id_str = id.to_string();

        let parsed = TaskInstanceId::parse(&id_str).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id_str, parsed.to_string());
    }

    #[test]
    fn test_task_instance_id_parse_invalid() {
        let result = TaskInstanceId::parse("not-a-ulid");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid task instance ID"));
    }

    #[test]
    fn test_run_starts_at_start_state() {
        let run = WorkflowRun::new(
            create_linear_definition(),
            serde_json::json!({}),
            Utc::now(),
        );

        assert_eq!(run.current_states, vec![StateId::new("submit")]);
        assert_eq!(run.status(), InstanceStatus::Running);
        assert_eq!(run.history.len(), 1);
        assert_eq!(run.history[0].action, HistoryAction::Start);
        assert_eq!(run.history[0].state_id.as_str(), START_HISTORY_STATE);
        assert_eq!(
            run.history[0].details.as_deref(),
            Some("Workflow started at submit")
        );
    }

    #[test]
    fn test_add_token_deduplicates_and_keeps_entry_time() {
        let mut run = WorkflowRun::new(
            create_linear_definition(),
            serde_json::json!({}),
            Utc::now(),
        );
        let first = Utc::now();
        let later = first + chrono::Duration::seconds(10);

        run.add_token(StateId::new("review"), first);
        run.add_token(StateId::new("review"), later);

        assert_eq!(
            run.current_states
                .iter()
                .filter(|s| s.as_str() == "review")
                .count(),
            1
        );
        assert_eq!(run.entered_at[&StateId::new("review")], first);
    }

    #[test]
    fn test_status_from_last_history_action() {
        let now = Utc::now();
        let mut run = WorkflowRun::new(create_linear_definition(), serde_json::json!({}), now);

        run.remove_token(&StateId::new("submit"));
        run.record(StateId::new("submit"), HistoryAction::Auto, None, now);
        assert_eq!(run.status(), InstanceStatus::Completed);

        run.record(StateId::new("submit"), HistoryAction::Reject, None, now);
        assert_eq!(run.status(), InstanceStatus::Rejected);
    }

    #[test]
    fn test_snapshot_mirrors_run() {
        let now = Utc::now();
        let run = WorkflowRun::new(
            create_linear_definition(),
            serde_json::json!({ "amount": 42 }),
            now,
        );

        let snapshot = run.snapshot();
        assert_eq!(snapshot.id, run.id);
        assert_eq!(snapshot.workflow_name, run.definition.name);
        assert_eq!(snapshot.status, InstanceStatus::Running);
        assert_eq!(snapshot.current_states, run.current_states);
        assert_eq!(snapshot.data, run.data);

        let serialized = serde_json::to_string(&snapshot).unwrap();
        assert!(serialized.contains("\"workflowId\""));
        assert!(serialized.contains("\"currentStates\""));
        assert!(serialized.contains("\"parallelCompletion\""));

        let reparsed: TaskInstance = serde_json::from_str(&serialized).unwrap();
        assert_eq!(snapshot, reparsed);
    }
}
