//! Test helper functions for workflow module
//!
//! This module provides common test utilities to reduce code duplication
//! across workflow tests.

#![cfg(test)]

use crate::workflow::{
    CompletionRule, StateId, WorkflowCondition, WorkflowDefinition, WorkflowId, WorkflowState,
};

/// Test helper to create an interactive task state
pub fn task_state(next: Option<&str>) -> WorkflowState {
    let mut state = WorkflowState::new("task");
    state.next = next.map(StateId::new);
    state
}

/// Test helper to create an automated system state
#[allow(dead_code)]
pub fn system_state(action: &str, next: Option<&str>) -> WorkflowState {
    let mut state = WorkflowState::new("system");
    state.action = Some(action.to_string());
    state.next = next.map(StateId::new);
    state
}

/// Test helper to create a decision state with the given condition table
#[allow(dead_code)]
pub fn decision_state(conditions: Vec<WorkflowCondition>) -> WorkflowState {
    let mut state = WorkflowState::new("decision");
    state.conditions = Some(conditions);
    state
}

/// Test helper to create a parallel state
#[allow(dead_code)]
pub fn parallel_state(
    branches: &[&str],
    completion_rule: CompletionRule,
    next: Option<&str>,
) -> WorkflowState {
    let mut state = WorkflowState::new("parallel");
    state.branches = Some(branches.iter().map(|b| StateId::new(*b)).collect());
    state.completion_rule = completion_rule;
    state.next = next.map(StateId::new);
    state
}

/// Test helper for an `if` condition entry
#[allow(dead_code)]
pub fn if_condition(expression: &str, next: &str) -> WorkflowCondition {
    WorkflowCondition {
        if_expr: Some(expression.to_string()),
        else_target: None,
        next: Some(StateId::new(next)),
    }
}

/// Test helper for an `else` condition entry
#[allow(dead_code)]
pub fn else_condition(target: &str) -> WorkflowCondition {
    WorkflowCondition {
        if_expr: None,
        else_target: Some(StateId::new(target)),
        next: None,
    }
}

/// Test helper to create a definition with the given states
pub fn create_definition(start: &str, states: Vec<(&str, WorkflowState)>) -> WorkflowDefinition {
    let mut definition =
        WorkflowDefinition::new(WorkflowId::new("test_v1"), "Test Workflow", StateId::new(start));
    for (id, state) in states {
        definition.add_state(StateId::new(id), state);
    }
    definition
}

/// Test helper for a two-step linear approval definition
pub fn create_linear_definition() -> WorkflowDefinition {
    create_definition(
        "submit",
        vec![
            ("submit", task_state(Some("review"))),
            ("review", task_state(None)),
        ],
    )
}

/// Test helper for a fork/join definition with two branches
#[allow(dead_code)]
pub fn create_parallel_definition(completion_rule: CompletionRule) -> WorkflowDefinition {
    create_definition(
        "fanout",
        vec![
            (
                "fanout",
                parallel_state(&["finance_review", "legal_review"], completion_rule, Some("merge")),
            ),
            ("finance_review", task_state(None)),
            ("legal_review", task_state(None)),
            ("merge", task_state(None)),
        ],
    )
}
