//! Platform supervisor.
//!
//! Starts the search engine, waits until it reports an operational cluster
//! health, then starts the web server and the compute engine. All children are
//! stopped on SIGTERM or SIGINT.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use supervisor_engine::constants::supervisor::{
    CONFIG_FILE_ENV, POLL_INTERVAL_SECS, STOP_TIMEOUT_SECS,
};
use supervisor_engine::domain::constants::PATH_TEMP;
use supervisor_engine::domain::{CommandFactory, ProcessKind, Settings};
use supervisor_engine::infrastructure::load_settings;

mod commands;

/// Platform process supervisor
#[derive(Parser, Debug)]
#[command(name = "sonar-supervisor")]
#[command(about = "Start and supervise the platform's search engine, web server and compute engine")]
struct Cli {
    /// Properties file holding the platform settings
    #[arg(short, long, env = CONFIG_FILE_ENV)]
    config: Option<PathBuf>,

    /// Java installation used by every child process
    #[arg(long, env = "JAVA_HOME")]
    java_home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the launch commands as JSON without starting anything
    Render {
        /// Process to render (es, web, ce); all of them when omitted
        #[arg(short, long)]
        kind: Option<ProcessKind>,

        /// Render the web server as startup leader
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        leader: bool,
    },

    /// Query the search engine health once
    Check {
        /// Keep retrying while the engine is unreachable
        #[arg(long)]
        wait: bool,
    },

    /// Start all processes and supervise them until a stop signal
    Run {
        /// Seconds between two health polls while the search engine starts
        #[arg(long, default_value_t = POLL_INTERVAL_SECS)]
        poll_interval_secs: u64,

        /// Seconds a child is given to exit before being killed
        #[arg(long, default_value_t = STOP_TIMEOUT_SECS)]
        stop_timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG takes precedence, fallback to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "Starting platform supervisor"
    );

    let settings = load_settings(cli.config.as_deref(), std::env::vars())
        .context("Cannot load platform settings")?;

    match cli.command {
        Command::Render { kind, leader } => {
            let factory = command_factory(settings, cli.java_home)?;
            commands::render(&factory, kind, leader)
        }
        Command::Check { wait } => commands::check(&settings, wait),
        Command::Run {
            poll_interval_secs,
            stop_timeout_secs,
        } => {
            let temp_dir = temp_dir(&settings)?;
            let factory = command_factory(settings, cli.java_home)?;
            commands::run(
                &factory,
                temp_dir,
                std::time::Duration::from_secs(poll_interval_secs),
                std::time::Duration::from_secs(stop_timeout_secs),
            )
            .await
        }
    }
}

fn temp_dir(settings: &Settings) -> anyhow::Result<PathBuf> {
    settings
        .mandatory_path(PATH_TEMP)
        .context("Cannot resolve temp directory")
}

fn command_factory(
    settings: Settings,
    java_home: Option<PathBuf>,
) -> anyhow::Result<CommandFactory> {
    let temp_dir = temp_dir(&settings)?;
    let factory = CommandFactory::new(settings, temp_dir);
    Ok(match java_home {
        Some(java_home) => factory.with_java_home(java_home),
        None => factory,
    })
}
