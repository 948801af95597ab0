//! # FlowMaster
//!
//! An in-memory workflow execution engine for business approval processes.
//!
//! ## Features
//!
//! - **Declarative Definitions**: JSON-shaped workflow documents with states,
//!   transitions, and routing rules
//! - **Token-Based Execution**: parallel forks/joins, conditional branching,
//!   SLA timeouts, and rejection routing
//! - **Behavior Resolution**: operator-editable state types resolved to
//!   execution semantics by indirection
//! - **Sandboxed Conditions**: CEL expressions evaluated against instance
//!   context only, failing safe to `false`
//! - **Deterministic Scheduling**: an explicit tick the host drives, with
//!   simulated-time support for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowmaster::workflow::{StateId, WorkflowDefinition, WorkflowExecutor};
//! use chrono::Utc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let definition: WorkflowDefinition = serde_json::from_str(
//!     r#"{
//!         "workflowId": "leave_v1",
//!         "version": 1,
//!         "name": "Leave Request",
//!         "start": "submit",
//!         "states": {
//!             "submit": { "type": "task", "role": "employee", "next": null }
//!         }
//!     }"#,
//! )?;
//!
//! let executor = WorkflowExecutor::new();
//! let mut run = executor.start_workflow(definition, serde_json::json!({}), Utc::now())?;
//!
//! executor.approve(&mut run, &StateId::new("submit"), Utc::now())?;
//! executor.run_to_settled(&mut run, Utc::now())?;
//!
//! println!("{}", run.snapshot().status.as_str());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Workflow system for token-based execution
pub mod workflow;

// Re-export core types
pub use workflow::{
    BaseBehaviorDefinition, BehaviorRegistry, ExecutionMode, ExecutorError, ExecutorResult,
    InstanceStatus, StateId, StateTypeDefinition, TaskInstance, TaskInstanceId,
    WorkflowDefinition, WorkflowExecutor, WorkflowId, WorkflowRun, WorkflowState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
