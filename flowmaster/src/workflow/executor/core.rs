//! Core workflow execution logic

use super::{ExecutorError, ExecutorResult, TransitionAction, MAX_TRANSITIONS};
use crate::workflow::{
    BehaviorRegistry, ConditionEvaluator, ExecutionMode, HistoryAction, StateId,
    WorkflowDefinition, WorkflowRun,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Workflow execution engine
///
/// Interprets transitions for a [`WorkflowRun`] against the behavior
/// registries. Holds no per-instance state itself; one executor can drive any
/// number of runs. Registry edits made between calls are visible on the next
/// transition lookup.
pub struct WorkflowExecutor {
    registry: BehaviorRegistry,
    evaluator: ConditionEvaluator,
}

impl WorkflowExecutor {
    /// Create an executor with the default behavior registry
    pub fn new() -> Self {
        Self::with_registry(BehaviorRegistry::with_defaults())
    }

    /// Create an executor with a custom behavior registry
    pub fn with_registry(registry: BehaviorRegistry) -> Self {
        Self {
            registry,
            evaluator: ConditionEvaluator::new(),
        }
    }

    /// The behavior registry in use
    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    /// Mutable access to the behavior registry
    pub fn registry_mut(&mut self) -> &mut BehaviorRegistry {
        &mut self.registry
    }

    /// The condition evaluator in use
    pub(super) fn evaluator(&self) -> &ConditionEvaluator {
        &self.evaluator
    }

    /// Start a new run of `definition` with the supplied context data
    ///
    /// Validates the definition structure, then positions a single token at
    /// the start state and records the start history entry.
    pub fn start_workflow(
        &self,
        definition: WorkflowDefinition,
        data: Value,
        now: DateTime<Utc>,
    ) -> ExecutorResult<WorkflowRun> {
        definition
            .validate_structure()
            .map_err(|errors| ExecutorError::ValidationFailed(errors.join("; ")))?;

        let run = WorkflowRun::new(definition, data, now);
        tracing::info!("Started workflow: {}", run.definition.name);
        Ok(run)
    }

    /// Approve the interactive state `state_id`
    ///
    /// Returns `Ok(false)` without touching the run when the state is not an
    /// active interactive token; stray decision calls are ignored, not errors.
    pub fn approve(
        &self,
        run: &mut WorkflowRun,
        state_id: &StateId,
        now: DateTime<Utc>,
    ) -> ExecutorResult<bool> {
        if !self.awaits_decision(run, state_id) {
            tracing::debug!("Ignoring approve for inactive or non-interactive state '{state_id}'");
            return Ok(false);
        }

        run.record(state_id.clone(), HistoryAction::Approve, None, now);
        self.process_transition(run, state_id, TransitionAction::Approve, now)?;
        Ok(true)
    }

    /// Reject the interactive state `state_id`
    ///
    /// With an `onReject` route the token is rerouted locally; without one the
    /// entire instance stops, including concurrently active branches. Returns
    /// `Ok(false)` when the state is not an active interactive token.
    pub fn reject(
        &self,
        run: &mut WorkflowRun,
        state_id: &StateId,
        now: DateTime<Utc>,
    ) -> ExecutorResult<bool> {
        if !self.awaits_decision(run, state_id) {
            tracing::debug!("Ignoring reject for inactive or non-interactive state '{state_id}'");
            return Ok(false);
        }

        self.process_transition(run, state_id, TransitionAction::Reject, now)?;
        Ok(true)
    }

    /// Whether `state_id` is an active token blocked on an external decision
    pub fn awaits_decision(&self, run: &WorkflowRun, state_id: &StateId) -> bool {
        run.is_active(state_id)
            && run
                .definition
                .states
                .get(state_id)
                .map(|state| {
                    self.registry.resolve_execution_mode(&state.state_type)
                        == ExecutionMode::Interactive
                })
                .unwrap_or(false)
    }

    /// Active tokens currently blocked on an external decision, in token order
    pub fn awaiting_input(&self, run: &WorkflowRun) -> Vec<StateId> {
        run.current_states
            .iter()
            .filter(|state_id| self.awaits_decision(run, state_id))
            .cloned()
            .collect()
    }

    /// Apply one transition to the token at `state_id`
    ///
    /// This is the single mutation path for a run. The caller supplies the
    /// action; mode-specific routing (decision tables, automated actions,
    /// parallel forks) and join accounting happen here.
    pub fn process_transition(
        &self,
        run: &mut WorkflowRun,
        state_id: &StateId,
        action: TransitionAction,
        now: DateTime<Utc>,
    ) -> ExecutorResult<()> {
        let Some(state) = run.definition.states.get(state_id).cloned() else {
            return Err(ExecutorError::StateNotFound(state_id.clone()));
        };
        let mode = self.registry.resolve_execution_mode(&state.state_type);
        let mut next_target = state.next.clone();

        match action {
            TransitionAction::Timeout => {
                // Unreachable when SLA scheduling is correct
                let Some(on_timeout) = state.on_timeout.clone() else {
                    tracing::debug!("Timeout for '{state_id}' without an onTimeout route, ignoring");
                    return Ok(());
                };
                run.record(
                    state_id.clone(),
                    HistoryAction::Auto,
                    Some(format!("SLA breached. Escalating to {on_timeout}")),
                    now,
                );
                next_target = Some(on_timeout);
            }
            TransitionAction::Reject => match state.on_reject.clone() {
                Some(target) => {
                    run.record(
                        state_id.clone(),
                        HistoryAction::Reject,
                        Some(format!("Rejected. Moving to {target}")),
                        now,
                    );
                    next_target = Some(target);
                }
                None => {
                    // No reject route means rejection is fatal to the whole
                    // instance, not just this token
                    run.record(
                        state_id.clone(),
                        HistoryAction::Reject,
                        Some("User rejected. Workflow stopped.".to_string()),
                        now,
                    );
                    run.halt(now);
                    return Ok(());
                }
            },
            TransitionAction::Approve | TransitionAction::Auto => match mode {
                ExecutionMode::Decision => {
                    next_target = self.route_decision(run, state_id, &state, now);
                }
                ExecutionMode::Automated => {
                    let detail = match &state.action {
                        Some(action_name) => format!("System action executed: {action_name}"),
                        None => "System action executed".to_string(),
                    };
                    run.record(state_id.clone(), HistoryAction::Auto, Some(detail), now);
                }
                ExecutionMode::Parallel => {
                    if let Some(branches) = &state.branches {
                        self.execute_fork(run, state_id, branches, now);
                        return Ok(());
                    }
                }
                ExecutionMode::Interactive => {}
            },
        }

        // A finishing branch feeds its parent's join accounting instead of
        // following its own next-target
        if let Some(parent_id) = self.find_parallel_parent(run, state_id) {
            self.complete_branch(run, &parent_id, state_id, now);
            return Ok(());
        }

        run.remove_token(state_id);
        match next_target {
            Some(target) if target.is_terminate() => {
                run.record(
                    state_id.clone(),
                    HistoryAction::Auto,
                    Some("Terminated".to_string()),
                    now,
                );
            }
            Some(target) => {
                tracing::debug!(
                    "Transitioning from {} to {} for workflow {}",
                    state_id,
                    target,
                    run.definition.name
                );
                run.add_token(target, now);
            }
            None => {
                run.record(
                    state_id.clone(),
                    HistoryAction::Auto,
                    Some("Workflow End".to_string()),
                    now,
                );
            }
        }

        Ok(())
    }

    /// One scheduling pass over the active tokens
    ///
    /// Advances every automated, decision, and parallel token with `auto`,
    /// fires due SLA escalations on interactive tokens, then finalizes joins
    /// whose completion rule was met during this pass. Tokens are processed in
    /// array order over a snapshot taken at entry.
    ///
    /// Returns whether the run changed. A token positioned at a state the
    /// definition no longer contains surfaces [`ExecutorError::StateNotFound`]
    /// after the remaining tokens of the pass have been processed; history and
    /// sibling tokens are preserved.
    pub fn tick(&self, run: &mut WorkflowRun, now: DateTime<Utc>) -> ExecutorResult<bool> {
        let snapshot = run.current_states.clone();
        let history_before = run.history.len();
        let mut first_error: Option<ExecutorError> = None;

        for state_id in &snapshot {
            // A join finalized by an earlier token may have removed this one
            if !run.is_active(state_id) {
                continue;
            }

            let Some(state) = run.definition.states.get(state_id) else {
                tracing::warn!("Active token references unknown state '{state_id}'");
                if first_error.is_none() {
                    first_error = Some(ExecutorError::StateNotFound(state_id.clone()));
                }
                continue;
            };

            let mode = self.registry.resolve_execution_mode(&state.state_type);
            let sla_due = state
                .sla()
                .filter(|_| state.on_timeout.is_some())
                .zip(run.entered_at.get(state_id).copied())
                .map(|(sla, entered)| now.signed_duration_since(entered) >= sla)
                .unwrap_or(false);

            let result = match mode {
                ExecutionMode::Automated | ExecutionMode::Decision | ExecutionMode::Parallel => {
                    self.process_transition(run, state_id, TransitionAction::Auto, now)
                }
                ExecutionMode::Interactive if sla_due => {
                    self.process_transition(run, state_id, TransitionAction::Timeout, now)
                }
                ExecutionMode::Interactive => Ok(()),
            };
            if let Err(err) = result {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        // Joins only fire after every branch completion reported in this pass
        // has been recorded
        self.finalize_joins(run, now);

        if let Some(err) = first_error {
            return Err(err);
        }
        Ok(run.current_states != snapshot || run.history.len() != history_before)
    }

    /// Drive `tick` to a fixed point with time frozen at `now`
    ///
    /// Equivalent to the host polling loop without the presentational pacing;
    /// returns once no token changes, leaving interactive tokens blocked.
    pub fn run_to_settled(&self, run: &mut WorkflowRun, now: DateTime<Utc>) -> ExecutorResult<()> {
        for _ in 0..MAX_TRANSITIONS {
            if !self.tick(run, now)? {
                return Ok(());
            }
        }
        Err(ExecutorError::TransitionLimitExceeded {
            limit: MAX_TRANSITIONS,
        })
    }
}

impl Default for WorkflowExecutor {
    fn default() -> Self {
        Self::new()
    }
}
