//! Integration tests driving the flowmaster binary end to end

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn workflow_path(name: &str) -> String {
    format!("{}/workflows/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn flowmaster() -> Command {
    let mut cmd = Command::cargo_bin("flowmaster").unwrap();
    // Keep colored history lines plain so predicates match the raw text
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn run_leave_request_short_leave_auto_approves() {
    flowmaster()
        .args([
            "flow",
            "run",
            &workflow_path("simple_leave_request.json"),
            "--data",
            r#"{"days": 1}"#,
            "--auto-approve",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Condition matched: data.days < 3 -> auto_approve",
        ))
        .stdout(predicate::str::contains(
            "System action executed: approveRequest",
        ))
        .stdout(predicate::str::contains("System action executed: sendEmail"))
        .stdout(predicate::str::contains("\"status\": \"completed\""));
}

#[test]
fn run_leave_request_long_leave_routes_to_hr() {
    flowmaster()
        .args([
            "flow",
            "run",
            &workflow_path("simple_leave_request.json"),
            "--data",
            r#"{"days": 10}"#,
            "--auto-approve",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Else condition -> hr_approval"))
        .stdout(predicate::str::contains("Workflow completed"));
}

#[test]
fn run_transaction_approval_forks_and_merges() {
    flowmaster()
        .args([
            "flow",
            "run",
            &workflow_path("complex_transaction_approval.json"),
            "--data",
            r#"{"amount": 1000000, "type": "Cash"}"#,
            "--auto-approve",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Spawning branches: finance_review, legal_review",
        ))
        .stdout(predicate::str::contains(
            "Parallel completion rule 'any' met. Merging.",
        ))
        .stdout(predicate::str::contains(
            "Condition matched: data.amount > 1000 -> ceo_approval",
        ))
        .stdout(predicate::str::contains(
            "System action executed: completeTransaction",
        ))
        .stdout(predicate::str::contains("\"status\": \"completed\""));
}

#[test]
fn run_rejects_invalid_data_json() {
    flowmaster()
        .args([
            "flow",
            "run",
            &workflow_path("simple_leave_request.json"),
            "--data",
            "not json",
            "--auto-approve",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --data JSON"));
}

#[test]
fn run_rejects_missing_definition_file() {
    flowmaster()
        .args(["flow", "run", "no_such_workflow.json", "--auto-approve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read workflow definition"));
}

#[test]
fn run_accepts_yaml_definitions() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    write!(
        file,
        "workflowId: ping_v1\n\
         version: 1\n\
         name: Ping\n\
         start: ping\n\
         states:\n\
         \x20 ping:\n\
         \x20   type: system\n\
         \x20   action: ping\n"
    )
    .unwrap();

    flowmaster()
        .args([
            "flow",
            "run",
            file.path().to_str().unwrap(),
            "--auto-approve",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("System action executed: ping"))
        .stdout(predicate::str::contains("Workflow completed"));
}

#[test]
fn inspect_shows_definition_structure() {
    flowmaster()
        .args([
            "flow",
            "inspect",
            &workflow_path("complex_transaction_approval.json"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Complex Transaction Approval"))
        .stdout(predicate::str::contains("Start: maker_submit"))
        .stdout(predicate::str::contains("States: 7"))
        .stdout(predicate::str::contains(
            "branches [any]: finance_review, legal_review",
        ));
}

#[test]
fn inspect_flags_invalid_definition() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "workflowId": "broken_v1",
            "version": 1,
            "name": "Broken",
            "start": "missing",
            "states": {{ "submit": {{ "type": "task" }} }}
        }}"#
    )
    .unwrap();

    flowmaster()
        .args(["flow", "inspect", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Start state 'missing' not found"));
}
