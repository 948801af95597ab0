//! Workflow execution engine

pub mod conditions;
pub mod core;
pub mod fork_join;

use crate::workflow::StateId;
use thiserror::Error;

/// Errors that can occur during workflow execution
///
/// Only dangling definition references surface as hard failures; recoverable
/// conditions (failed expressions, stray decision calls, dead-end routing)
/// degrade gracefully inside the engine.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// A traversed state ID does not exist in the definition
    #[error("State not found: {0}")]
    StateNotFound(StateId),
    /// Definition failed structural validation before execution
    #[error("Workflow validation failed: {0}")]
    ValidationFailed(String),
    /// Maximum transition limit exceeded to prevent infinite loops
    #[error("Maximum transition limit of {limit} exceeded")]
    TransitionLimitExceeded {
        /// The maximum number of scheduling passes that was exceeded
        limit: usize,
    },
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Maximum number of scheduling passes allowed when driving a run to a fixed
/// point
pub const MAX_TRANSITIONS: usize = 1000;

/// Action applied to one token by a caller or the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// External approval of an interactive state
    Approve,
    /// External rejection of an interactive state
    Reject,
    /// Engine-driven advance of an automated, decision, or parallel state
    Auto,
    /// SLA breach escalation
    Timeout,
}

impl std::fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransitionAction::Approve => "approve",
            TransitionAction::Reject => "reject",
            TransitionAction::Auto => "auto",
            TransitionAction::Timeout => "timeout",
        };
        write!(f, "{s}")
    }
}

// Re-export main types
pub use core::WorkflowExecutor;
