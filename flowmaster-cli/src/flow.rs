//! Flow command implementation for executing workflow simulations

use crate::cli::FlowSubcommand;
use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use flowmaster::workflow::{
    HistoryAction, InstanceStatus, StateId, WorkflowDefinition, WorkflowExecutor, WorkflowRun,
};
use std::path::Path;
use std::time::Duration;

/// Main entry point for flow command
pub async fn run_flow_command(subcommand: FlowSubcommand) -> Result<()> {
    match subcommand {
        FlowSubcommand::Run {
            definition,
            data,
            auto_approve,
            tick_ms,
            json,
        } => run_workflow_command(&definition, data, auto_approve, tick_ms, json).await,
        FlowSubcommand::Inspect { definition } => inspect_workflow_command(&definition),
    }
}

/// Load a workflow definition from a JSON or YAML file
fn load_definition(path: &Path) -> Result<WorkflowDefinition> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow definition {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    tracing::debug!("Loading workflow definition from {}", path.display());
    if is_yaml {
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid workflow definition in {}", path.display()))
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid workflow definition in {}", path.display()))
    }
}

fn parse_context_data(data: Option<String>) -> Result<serde_json::Value> {
    match data {
        Some(raw) => serde_json::from_str(&raw).context("Invalid --data JSON"),
        None => Ok(serde_json::json!({})),
    }
}

/// Execute a workflow simulation
async fn run_workflow_command(
    path: &Path,
    data: Option<String>,
    auto_approve: bool,
    tick_ms: u64,
    json: bool,
) -> Result<()> {
    let definition = load_definition(path)?;
    let data = parse_context_data(data)?;

    let executor = WorkflowExecutor::new();
    let mut run = executor.start_workflow(definition, data, Utc::now())?;
    println!(
        "{} {} ({})",
        "Running".green().bold(),
        run.definition.name,
        run.id
    );

    let mut printed = 0;
    loop {
        executor.run_to_settled(&mut run, Utc::now())?;
        printed = print_history(&run, printed);

        if run.status() != InstanceStatus::Running {
            break;
        }

        let waiting = executor.awaiting_input(&run);
        if waiting.is_empty() {
            // Nothing to decide; only SLA clocks can move the run forward
            tokio::time::sleep(Duration::from_millis(tick_ms)).await;
            continue;
        }

        for state_id in waiting {
            // An earlier decision in this pass may have drained the run
            if !run.is_active(&state_id) {
                continue;
            }
            let approved = if auto_approve {
                true
            } else {
                prompt_decision(&run, &state_id)?
            };
            if approved {
                executor.approve(&mut run, &state_id, Utc::now())?;
            } else {
                executor.reject(&mut run, &state_id, Utc::now())?;
            }
            printed = print_history(&run, printed);
        }
    }

    match run.status() {
        InstanceStatus::Completed => println!("{}", "Workflow completed".green().bold()),
        InstanceStatus::Rejected => println!("{}", "Workflow rejected".red().bold()),
        InstanceStatus::Running => {}
    }

    if json {
        let snapshot = run.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}

/// Ask the operator for an approve/reject decision on one interactive token
fn prompt_decision(run: &WorkflowRun, state_id: &StateId) -> Result<bool> {
    let state = run.definition.get_state(state_id);
    let assignee = state.and_then(|s| s.role.clone().or_else(|| s.role_group.clone()));
    let prompt = match assignee {
        Some(role) => format!("Decision for '{state_id}' (assigned to {role})"),
        None => format!("Decision for '{state_id}'"),
    };

    let choice = dialoguer::Select::new()
        .with_prompt(prompt)
        .items(&["Approve", "Reject"])
        .default(0)
        .interact()?;
    Ok(choice == 0)
}

/// Print history entries added since the last call, returning the new cursor
fn print_history(run: &WorkflowRun, from: usize) -> usize {
    for entry in &run.history[from..] {
        let action = match entry.action {
            HistoryAction::Approve => "approve".green(),
            HistoryAction::Reject => "reject".red(),
            HistoryAction::Auto => "auto".blue(),
            HistoryAction::Start => "start".cyan(),
        };
        println!(
            "  {} {:<7} {} {}",
            entry
                .timestamp
                .format("%H:%M:%S%.3f")
                .to_string()
                .dimmed(),
            action,
            entry.state_id.to_string().bold(),
            entry.details.as_deref().unwrap_or("").dimmed()
        );
    }
    run.history.len()
}

/// Show the structure of a workflow definition without running it
fn inspect_workflow_command(path: &Path) -> Result<()> {
    let definition = load_definition(path)?;
    let executor = WorkflowExecutor::new();

    println!("Workflow: {}", definition.name.bold());
    println!(
        "ID: {} (version {})",
        definition.workflow_id, definition.version
    );
    println!("Start: {}", definition.start);
    println!("States: {}", definition.states.len());
    println!();

    for (state_id, state) in &definition.states {
        let mode = executor.registry().resolve_execution_mode(&state.state_type);
        let mut notes = Vec::new();
        if let Some(role) = &state.role {
            notes.push(format!("role: {role}"));
        }
        if let Some(next) = &state.next {
            notes.push(format!("next: {next}"));
        }
        if let Some(on_reject) = &state.on_reject {
            notes.push(format!("onReject: {on_reject}"));
        }
        if let Some(branches) = &state.branches {
            let listed = branches
                .iter()
                .map(|branch| branch.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            notes.push(format!(
                "branches [{}]: {listed}",
                state.completion_rule.as_str()
            ));
        }
        if let Some(conditions) = &state.conditions {
            notes.push(format!("{} conditions", conditions.len()));
        }
        if let Some(sla) = state.sla() {
            notes.push(format!("SLA: {}ms", sla.num_milliseconds()));
        }
        if let Some(on_timeout) = &state.on_timeout {
            notes.push(format!("onTimeout: {on_timeout}"));
        }
        println!(
            "  {} [{mode}] {}",
            state_id.to_string().bold(),
            notes.join(", ").dimmed()
        );
    }

    if let Err(errors) = definition.validate_structure() {
        println!();
        for error in &errors {
            println!("  {} {error}", "error:".red().bold());
        }
        anyhow::bail!("Definition failed validation");
    }

    Ok(())
}
