//! Subcommand handlers

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Serialize;
use supervisor_engine::domain::constants::{SEARCH_HOST, SEARCH_HTTP_PORT};
use supervisor_engine::domain::ports::{HealthConnector, LaunchedProcess, ProcessLauncher};
use supervisor_engine::domain::{
    CommandFactory, HealthLevel, ProcessCommand, ProcessHealthMonitor, ProcessKind, RetryPolicy,
    SearchEngineCommand, SearchEngineEndpoint, Settings,
};
use supervisor_engine::infrastructure::{HttpHealthConnector, TokioProcessLauncher};
use tracing::{error, info, warn};

/// Build the commands of the requested kinds, in start order.
pub fn build_commands(
    factory: &CommandFactory,
    kind: Option<ProcessKind>,
    leader: bool,
) -> anyhow::Result<Vec<ProcessCommand>> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => ProcessKind::ALL.to_vec(),
    };
    kinds
        .into_iter()
        .map(|kind| {
            factory
                .create_command(kind, leader)
                .with_context(|| format!("Cannot create {} command", kind.human_name()))
        })
        .collect()
}

pub fn render(
    factory: &CommandFactory,
    kind: Option<ProcessKind>,
    leader: bool,
) -> anyhow::Result<()> {
    let commands = build_commands(factory, kind, leader)?;
    println!("{}", serde_json::to_string_pretty(&commands)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct CheckReport {
    endpoint: String,
    operational: bool,
    level: Option<HealthLevel>,
}

pub fn endpoint(settings: &Settings) -> anyhow::Result<SearchEngineEndpoint> {
    let host = settings.mandatory_value(SEARCH_HOST)?;
    let port = settings
        .value_as_port(SEARCH_HTTP_PORT)?
        .with_context(|| format!("Missing mandatory property '{SEARCH_HTTP_PORT}'"))?;
    Ok(SearchEngineEndpoint::new(host, port))
}

pub fn check(settings: &Settings, wait: bool) -> anyhow::Result<()> {
    let mut monitor =
        ProcessHealthMonitor::new(endpoint(settings)?, Arc::new(HttpHealthConnector::new()));
    if !wait {
        monitor = monitor.with_retry_policy(RetryPolicy::new(1, Duration::ZERO));
    }

    let operational = monitor.is_operational();
    let report = CheckReport {
        endpoint: monitor.endpoint().to_string(),
        operational,
        level: monitor.last_level(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !operational {
        bail!("Search engine at {} is not operational", report.endpoint);
    }
    Ok(())
}

pub async fn run(
    factory: &CommandFactory,
    temp_dir: PathBuf,
    poll_interval: Duration,
    stop_timeout: Duration,
) -> anyhow::Result<()> {
    let launcher = TokioProcessLauncher::new(temp_dir);
    let search_engine = factory
        .create_search_engine_command()
        .context("Cannot create search engine command")?;
    let monitor = Arc::new(warmup_monitor(
        &search_engine,
        Arc::new(HttpHealthConnector::new()),
    ));

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut running = vec![launcher.launch(&search_engine.into()).await?];

    info!(endpoint = %monitor.endpoint(), "Waiting for search engine to become operational");
    loop {
        let poll = {
            let monitor = monitor.clone();
            tokio::task::spawn_blocking(move || monitor.is_operational())
        };
        tokio::select! {
            result = &mut shutdown => {
                result?;
                return stop_all(&launcher, &mut running, stop_timeout).await;
            }
            operational = poll => {
                if operational.unwrap_or(false) {
                    break;
                }
            }
        }

        if let Some(kind) = first_exited(&mut running) {
            stop_all(&launcher, &mut running, stop_timeout).await?;
            bail!("{} exited before becoming operational", kind.human_name());
        }
        tokio::select! {
            result = &mut shutdown => {
                result?;
                return stop_all(&launcher, &mut running, stop_timeout).await;
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }

    for kind in [ProcessKind::WebServer, ProcessKind::ComputeEngine] {
        let started = match factory.create_command(kind, true) {
            Ok(command) => launcher.launch(&command).await,
            Err(e) => Err(e),
        };
        match started {
            Ok(process) => running.push(process),
            Err(e) => {
                error!(process = %kind, error = %e, "Cannot start process");
                stop_all(&launcher, &mut running, stop_timeout).await?;
                return Err(e).with_context(|| format!("Cannot start {}", kind.human_name()));
            }
        }
    }
    info!(count = running.len(), "All processes started");

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            _ = tokio::time::sleep(poll_interval) => {
                if let Some(kind) = first_exited(&mut running) {
                    warn!(process = %kind, "Process exited, stopping the others");
                    break;
                }
            }
        }
    }
    stop_all(&launcher, &mut running, stop_timeout).await
}

/// Monitor polled while the search engine starts.
///
/// One query per poll: the run loop does the waiting between polls, so a
/// stop signal never waits on a blocking retry sequence.
fn warmup_monitor(
    command: &SearchEngineCommand,
    connector: Arc<dyn HealthConnector>,
) -> ProcessHealthMonitor {
    ProcessHealthMonitor::for_search_engine(command, connector)
        .with_retry_policy(RetryPolicy::new(1, Duration::ZERO))
}

fn first_exited(running: &mut [LaunchedProcess]) -> Option<ProcessKind> {
    running.iter_mut().find_map(|process| match process.child.try_wait() {
        Ok(Some(status)) => {
            warn!(process = %process.kind, status = %status, "Process exited");
            Some(process.kind)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(process = %process.kind, error = %e, "Cannot read process status");
            None
        }
    })
}

/// Stop in reverse start order so the search engine goes last.
async fn stop_all(
    launcher: &TokioProcessLauncher,
    running: &mut Vec<LaunchedProcess>,
    timeout: Duration,
) -> anyhow::Result<()> {
    let mut failed = 0;
    while let Some(mut process) = running.pop() {
        if let Err(e) = launcher.stop(&mut process, timeout).await {
            error!(process = %process.kind, error = %e, "Failed to stop process");
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} process(es) could not be stopped");
    }
    info!("All processes stopped");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C");
    Ok(())
}
