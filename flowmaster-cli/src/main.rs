use std::process;

mod cli;
mod flow;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Flow { subcommand } => flow::run_flow_command(subcommand).await,
    };

    match result {
        Ok(()) => process::exit(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(EXIT_ERROR);
        }
    }
}
