//! Port for starting and stopping OS processes from command descriptors

use crate::domain::{DomainError, ProcessCommand, ProcessKind};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Child;

/// A started child process.
#[derive(Debug)]
pub struct LaunchedProcess {
    pub kind: ProcessKind,
    pub pid: u32,
    pub child: Child,
}

#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Write any files the command needs and spawn it.
    async fn launch(&self, command: &ProcessCommand) -> Result<LaunchedProcess, DomainError>;

    /// Ask the process to terminate, then kill it once `timeout` has elapsed.
    async fn stop(&self, process: &mut LaunchedProcess, timeout: Duration)
    -> Result<(), DomainError>;
}
