//! Decision-state condition routing

use super::core::WorkflowExecutor;
use crate::workflow::{HistoryAction, StateId, WorkflowRun, WorkflowState};
use chrono::{DateTime, Utc};

impl WorkflowExecutor {
    /// Resolve a decision state's next target from its condition table
    ///
    /// Entries are scanned in order. The first matching `if` expression wins
    /// and stops the scan; `else` entries apply provisionally until then, so
    /// a later `if` can still override an earlier fallback. Definitions with
    /// several `else` entries are rejected at load time, but for tables built
    /// programmatically the last scanned `else` wins.
    ///
    /// With no match and no fallback the decision resolves to the state's own
    /// `next` (usually absent), a dead end that silently drops the token.
    pub(super) fn route_decision(
        &self,
        run: &mut WorkflowRun,
        state_id: &StateId,
        state: &WorkflowState,
        now: DateTime<Utc>,
    ) -> Option<StateId> {
        let Some(conditions) = &state.conditions else {
            return state.next.clone();
        };

        let mut target = state.next.clone();
        for condition in conditions {
            if let Some(expression) = &condition.if_expr {
                if self.evaluator().evaluate(expression, &run.data) {
                    target = condition.next.clone();
                    let detail = match &condition.next {
                        Some(next) => format!("Condition matched: {expression} -> {next}"),
                        None => format!("Condition matched: {expression}"),
                    };
                    run.record(state_id.clone(), HistoryAction::Auto, Some(detail), now);
                    break;
                }
            } else if let Some(else_target) = &condition.else_target {
                target = Some(else_target.clone());
                run.record(
                    state_id.clone(),
                    HistoryAction::Auto,
                    Some(format!("Else condition -> {else_target}")),
                    now,
                );
            }
        }

        target
    }
}
