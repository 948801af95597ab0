use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flowmaster")]
#[command(version)]
#[command(about = "Simulator CLI for the FlowMaster workflow engine")]
#[command(long_about = "
flowmaster drives workflow definitions through the in-memory execution
engine: interactive steps prompt for approve/reject decisions, automated
steps advance on their own, and the execution log streams to the terminal.

Example usage:
  flowmaster flow run workflows/simple_leave_request.json --data '{\"days\": 5}'
  flowmaster flow run expense.yaml --auto-approve --json
  flowmaster flow inspect workflows/complex_transaction_approval.json
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute and inspect workflow definitions
    Flow {
        #[command(subcommand)]
        subcommand: FlowSubcommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum FlowSubcommand {
    /// Run a workflow definition as a live simulation
    Run {
        /// Path to the workflow definition (JSON or YAML)
        definition: PathBuf,

        /// Initial context data as inline JSON
        #[arg(long)]
        data: Option<String>,

        /// Approve every interactive step without prompting
        #[arg(long)]
        auto_approve: bool,

        /// Polling interval while only SLA clocks can advance the run, in
        /// milliseconds
        #[arg(long, default_value_t = 200)]
        tick_ms: u64,

        /// Print the final task instance snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the structure of a workflow definition
    Inspect {
        /// Path to the workflow definition (JSON or YAML)
        definition: PathBuf,
    },
}
