//! Domain-level errors
//! Command construction failures are fatal for the affected process; health
//! check failures are consumed by the monitor and never reach its caller.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    // Command construction errors
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Cannot find executable: {}", .0.display())]
    MissingBinary(PathBuf),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Health check errors
    #[error("Health endpoint unreachable: {0}")]
    Connectivity(String),

    #[error("Health check failed: {0}")]
    HealthCheck(String),

    // Launcher errors
    #[error("Failed to launch process: {0}")]
    Launch(String),
}

impl DomainError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Connectivity failures are the only ones worth retrying.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
