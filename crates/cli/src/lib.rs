pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "haggle",
    about = "Haggle operator CLI",
    long_about = "Inspect haggle configuration, check classifier readiness, and judge a discount reason without starting the HTTP service.",
    after_help = "Examples:\n  haggle config\n  haggle doctor --json --probe\n  haggle judge --reason \"the box arrived damaged\" --prior \"too expensive\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and classifier readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Send one classification request to the configured provider")]
        probe: bool,
    },
    #[command(about = "Run reason validation and sentiment analysis against a single reason")]
    Judge {
        #[arg(long, help = "Reason to judge")]
        reason: String,
        #[arg(long = "prior", help = "Reason given earlier in the negotiation (repeatable)")]
        prior: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json, probe } => commands::doctor::run(json, probe),
        Command::Judge { reason, prior } => commands::judge::run(&reason, &prior),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
