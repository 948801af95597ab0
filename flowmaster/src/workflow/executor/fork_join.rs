//! Fork/join parallel execution functionality

use super::core::WorkflowExecutor;
use crate::workflow::{CompletionRule, ExecutionMode, HistoryAction, StateId, WorkflowRun};
use chrono::{DateTime, Utc};

impl WorkflowExecutor {
    /// Spawn one token per branch and retire the forking token
    pub(super) fn execute_fork(
        &self,
        run: &mut WorkflowRun,
        state_id: &StateId,
        branches: &[StateId],
        now: DateTime<Utc>,
    ) {
        let spawned = branches
            .iter()
            .map(|branch| branch.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        run.record(
            state_id.clone(),
            HistoryAction::Auto,
            Some(format!("Spawning branches: {spawned}")),
            now,
        );

        run.remove_token(state_id);
        for branch in branches {
            run.add_token(branch.clone(), now);
        }
    }

    /// Find the parallel state (if any) that lists `state_id` as a branch
    pub(super) fn find_parallel_parent(
        &self,
        run: &WorkflowRun,
        state_id: &StateId,
    ) -> Option<StateId> {
        run.definition.states.iter().find_map(|(id, state)| {
            let is_parallel = self
                .registry()
                .resolve_execution_mode(&state.state_type)
                == ExecutionMode::Parallel;
            let lists_branch = state
                .branches
                .as_ref()
                .map(|branches| branches.contains(state_id))
                .unwrap_or(false);
            if is_parallel && lists_branch {
                Some(id.clone())
            } else {
                None
            }
        })
    }

    /// Record a finished branch and queue the parent's join when its rule is
    /// met
    ///
    /// Recording is idempotent: a branch already in the finished set changes
    /// nothing, and a join already queued is not queued (or logged) twice. The
    /// finishing branch's token is removed regardless of completeness.
    pub(super) fn complete_branch(
        &self,
        run: &mut WorkflowRun,
        parent_id: &StateId,
        branch_id: &StateId,
        now: DateTime<Utc>,
    ) {
        run.remove_token(branch_id);

        let Some(parent) = run.definition.states.get(parent_id).cloned() else {
            return;
        };

        let finished = run.parallel_completion.entry(parent_id.clone()).or_default();
        if finished.contains(branch_id) {
            return;
        }
        finished.push(branch_id.clone());
        let finished = finished.clone();

        let complete = match parent.completion_rule {
            CompletionRule::Any => true,
            CompletionRule::All => parent
                .branches
                .iter()
                .flatten()
                .all(|branch| finished.contains(branch)),
        };

        if complete && !run.pending_joins.contains(parent_id) {
            tracing::debug!(
                "Parallel group '{parent_id}' complete under rule '{}'",
                parent.completion_rule.as_str()
            );
            run.record(
                parent_id.clone(),
                HistoryAction::Auto,
                Some(format!(
                    "Parallel completion rule '{}' met. Merging.",
                    parent.completion_rule.as_str()
                )),
                now,
            );
            run.pending_joins.push(parent_id.clone());
        }
    }

    /// Finalize joins queued during the current scheduling pass
    ///
    /// Removes every branch token of each completed group (cancelling
    /// unfinished siblings under the `any` rule) and spawns the parent's merge
    /// token. Token deduplication guarantees exactly one merge token per
    /// completed group even when a sibling raced the same completion.
    pub(super) fn finalize_joins(&self, run: &mut WorkflowRun, now: DateTime<Utc>) {
        let pending = std::mem::take(&mut run.pending_joins);
        for parent_id in pending {
            let Some(parent) = run.definition.states.get(&parent_id).cloned() else {
                continue;
            };

            if let Some(branches) = &parent.branches {
                for branch in branches {
                    run.remove_token(branch);
                }
            }

            match parent.next {
                Some(next) if next.is_terminate() => {
                    run.record(
                        parent_id.clone(),
                        HistoryAction::Auto,
                        Some("Terminated".to_string()),
                        now,
                    );
                }
                Some(next) => {
                    run.add_token(next, now);
                }
                None => {}
            }
        }
    }
}
