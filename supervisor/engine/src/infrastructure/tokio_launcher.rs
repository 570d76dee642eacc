//! Tokio Process Launcher
//! Real implementation of the ProcessLauncher port using tokio::process
//!
//! The search engine is started through its own launcher script after its
//! configuration files are generated. JVM processes are started with `java`,
//! their settings handed over in a properties file.

use crate::domain::ports::{LaunchedProcess, ProcessLauncher};
use crate::domain::{
    CommandDescriptor, DomainError, ManagedProcessCommand, ProcessCommand, SearchEngineCommand,
};
use async_trait::async_trait;
use java_properties::PropertiesWriter;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

const KILL_TIMEOUT: Duration = Duration::from_secs(10);

const CLASSPATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

pub struct TokioProcessLauncher {
    temp_dir: PathBuf,
}

impl TokioProcessLauncher {
    /// `temp_dir` receives the properties files handed to JVM processes.
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    pub fn properties_file(&self, command: &ManagedProcessCommand) -> PathBuf {
        self.temp_dir
            .join(format!("{}-process.properties", command.descriptor().kind().key()))
    }

    fn launch_search_engine(&self, command: &SearchEngineCommand) -> Result<Command, DomainError> {
        command.write_generated_files()?;

        let mut cmd = Command::new(command.executable());
        cmd.args(command.engine_options());
        Ok(cmd)
    }

    fn launch_managed(&self, command: &ManagedProcessCommand) -> Result<Command, DomainError> {
        std::fs::create_dir_all(&self.temp_dir).map_err(|e| {
            DomainError::io(
                format!("Cannot create temp directory '{}'", self.temp_dir.display()),
                e,
            )
        })?;
        let properties = self.properties_file(command);
        write_properties(command.descriptor(), &properties)?;

        let mut cmd = Command::new(command.java_executable());
        cmd.args(java_arguments(command, &properties));
        Ok(cmd)
    }
}

/// `<jvm options> -cp <classpath> <main class> <properties file>`
pub fn java_arguments(command: &ManagedProcessCommand, properties: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = command
        .jvm_options()
        .all()
        .iter()
        .map(OsString::from)
        .collect();
    args.push("-cp".into());
    args.push(command.classpath().join(CLASSPATH_SEPARATOR).into());
    args.push(command.main_class().into());
    args.push(properties.as_os_str().to_owned());
    args
}

fn write_properties(descriptor: &CommandDescriptor, path: &Path) -> Result<(), DomainError> {
    let context = || format!("Cannot write process properties file '{}'", path.display());

    let file = File::create(path).map_err(|e| DomainError::io(context(), e))?;
    let mut writer = PropertiesWriter::new(BufWriter::new(file));
    descriptor
        .arguments()
        .iter()
        .try_for_each(|(key, value)| writer.write(key, value))
        .and_then(|_| writer.finish())
        .map_err(|e| DomainError::Launch(format!("{}: {e}", context())))?;

    debug!(
        process = %descriptor.kind(),
        path = %path.display(),
        count = descriptor.arguments().len(),
        "Wrote process properties file"
    );
    Ok(())
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn launch(&self, command: &ProcessCommand) -> Result<LaunchedProcess, DomainError> {
        let descriptor = command.descriptor();
        let kind = descriptor.kind();

        let mut cmd = match command {
            ProcessCommand::SearchEngine(command) => self.launch_search_engine(command)?,
            ProcessCommand::Managed(command) => self.launch_managed(command)?,
        };

        debug!(
            process = %kind,
            working_dir = %descriptor.working_directory().display(),
            "Setting working directory"
        );
        cmd.current_dir(descriptor.working_directory())
            .envs(descriptor.environment())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            error!(process = %kind, error = %e, "Failed to spawn process");
            DomainError::Launch(format!("Failed to start {}: {e}", kind.human_name()))
        })?;
        let pid = child.id().ok_or_else(|| {
            DomainError::Launch(format!("{} exited during startup", kind.human_name()))
        })?;

        info!(process = %kind, pid, "Process spawned successfully");
        Ok(LaunchedProcess { kind, pid, child })
    }

    async fn stop(
        &self,
        process: &mut LaunchedProcess,
        timeout: Duration,
    ) -> Result<(), DomainError> {
        let kind = process.kind;
        if let Ok(Some(status)) = process.child.try_wait() {
            debug!(process = %kind, status = %status, "Process already exited");
            return Ok(());
        }

        info!(process = %kind, pid = process.pid, "Sending SIGTERM");
        terminate(process);

        if let Ok(status) = tokio::time::timeout(timeout, process.child.wait()).await {
            let status = status.map_err(|e| DomainError::io("Cannot wait for process exit", e))?;
            info!(process = %kind, status = %status, "Process stopped");
            return Ok(());
        }

        warn!(
            process = %kind,
            timeout_secs = timeout.as_secs(),
            "Stop timeout reached, killing process"
        );
        process
            .child
            .start_kill()
            .map_err(|e| DomainError::io(format!("Cannot kill {}", kind.human_name()), e))?;
        match tokio::time::timeout(KILL_TIMEOUT, process.child.wait()).await {
            Ok(status) => {
                status.map_err(|e| DomainError::io("Cannot wait for process exit", e))?;
                Ok(())
            }
            Err(_) => Err(DomainError::Launch(format!(
                "{} still running after kill",
                kind.human_name()
            ))),
        }
    }
}

#[cfg(unix)]
fn terminate(process: &LaunchedProcess) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    if let Err(e) = signal::kill(Pid::from_raw(process.pid as i32), Signal::SIGTERM) {
        warn!(process = %process.kind, error = %e, "Failed to send SIGTERM");
    }
}

// no graceful signal outside unix; the kill after the timeout does the work
#[cfg(not(unix))]
fn terminate(_process: &LaunchedProcess) {}
