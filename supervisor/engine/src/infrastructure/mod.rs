//! Infrastructure Layer
//!
//! Adapters implementing the domain ports, plus configuration loading.
//!
//! ## Adapters
//!
//! - `HttpHealthConnector`: cluster health queries over HTTP with ureq
//! - `TokioProcessLauncher`: child processes started and stopped with tokio
//!
//! ## Usage
//!
//! ```rust,no_run
//! use supervisor_engine::domain::{CommandFactory, ProcessHealthMonitor};
//! use supervisor_engine::infrastructure::{load_settings, HttpHealthConnector};
//! use std::sync::Arc;
//!
//! let settings = load_settings(None, std::env::vars()).unwrap();
//! let factory = CommandFactory::new(settings, "/opt/platform/temp");
//! let command = factory.create_search_engine_command().unwrap();
//! let monitor =
//!     ProcessHealthMonitor::for_search_engine(&command, Arc::new(HttpHealthConnector::new()));
//! ```

pub mod config;
pub mod http_health_connector;
pub mod tokio_launcher;

pub use config::{apply_env_overrides, load_properties_file, load_settings, read_properties};
pub use http_health_connector::HttpHealthConnector;
pub use tokio_launcher::TokioProcessLauncher;
