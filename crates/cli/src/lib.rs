pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cardline",
    about = "Cardline card services operator CLI",
    long_about = "Inspect configuration, check completion readiness, classify messages offline, and chat with the virtual agent.",
    after_help = "Examples:\n  cardline doctor --json\n  cardline config\n  cardline classify \"I lost my card\"\n  cardline chat"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate config, completion credentials, and embedded sample data")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Classify a message's sentiment, intent, and off-topic status offline")]
    Classify {
        #[arg(help = "Message text to classify")]
        message: String,
    },
    #[command(about = "Start an interactive conversation with the virtual agent")]
    Chat,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Classify { message } => commands::classify::run(&message),
        Command::Chat => commands::chat::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
