//! Workflow system data structures and types
//!
//! This module provides the core types for representing and executing
//! approval workflows: declarative definitions, behavior resolution, a
//! sandboxed condition evaluator, and the token-based execution engine.

mod behavior;
mod definition;
mod executor;
mod expression;
mod run;
mod state;
#[cfg(test)]
mod test_helpers;

pub use behavior::{
    BaseBehaviorDefinition, BehaviorRegistry, ExecutionMode, StateTypeDefinition,
};
pub use definition::{DefinitionError, DefinitionResult, WorkflowDefinition, WorkflowId};
pub use executor::{
    ExecutorError, ExecutorResult, TransitionAction, WorkflowExecutor, MAX_TRANSITIONS,
};
pub use expression::ConditionEvaluator;
pub use run::{
    HistoryAction, HistoryEntry, InstanceStatus, TaskInstance, TaskInstanceId, WorkflowRun,
    START_HISTORY_STATE,
};
pub use state::{
    CompletionRule, StateError, StateId, StateResult, WorkflowCondition, WorkflowState,
    TERMINATE_SENTINEL,
};
