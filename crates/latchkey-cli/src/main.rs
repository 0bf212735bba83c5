//! Latchkey - console door access controller
//!
//! - `latchkey` / `latchkey run`: interactive menu (verify access, enroll, exit)
//! - `latchkey init-db`: create the photos directory and the database schema
//! - `latchkey self-test`: exercise the display and the latch once

use anyhow::Result;
use clap::{Parser, Subcommand};
use latchkey_core::LatchkeyConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod input;
mod menu;
mod shutdown;

/// Latchkey CLI
#[derive(Parser)]
#[command(name = "latchkey")]
#[command(about = "Door access controller with photo verification", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to ./latchkey.toml when present)
    #[arg(short, long, env = "LATCHKEY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Interactive menu (default)
    Run,
    /// Create the photos directory and database schema, then exit
    InitDb,
    /// Write two display frames, open and close the latch, then exit
    SelfTest,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = LatchkeyConfig::load(cli.config.as_deref())?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => match commands::run(&config).await? {
            commands::RunOutcome::Finished => Ok(()),
            // The stdin reader thread may still be parked on a read and
            // would hold up runtime shutdown.
            commands::RunOutcome::Interrupted => std::process::exit(130),
        },
        Command::InitDb => {
            let db = commands::init_db(&config).await?;
            db.close().await;
            println!("Database ready.");
            Ok(())
        }
        Command::SelfTest => commands::self_test(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["latchkey", "--config", "/etc/latchkey.toml", "init-db"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/latchkey.toml")));
        assert_eq!(cli.command, Some(Command::InitDb));

        let cli = Cli::try_parse_from(["latchkey"]).unwrap();
        assert_eq!(cli.command, None);
    }
}
