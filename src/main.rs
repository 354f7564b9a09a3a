//! Idea API E2E - runs ordered end-to-end scenarios against the Idea API

use clap::Parser;
use idea_e2e::commands::Commands;
use idea_e2e::{cli, common::logging};

#[derive(Parser)]
#[command(name = "idea-e2e", about = "End-to-end scenarios for the Idea API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    logging::init_cli(verbose);

    let result = cli::dispatch(cli.command).await;
    if let Err(e) = &result {
        eprintln!("Error: {e}");
    }

    let code = cli::exit_code(&result);
    if code != 0 {
        std::process::exit(code);
    }
}
