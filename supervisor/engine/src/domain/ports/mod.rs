pub mod health_connector;
pub mod process_launcher;

pub use health_connector::HealthConnector;
pub use process_launcher::{LaunchedProcess, ProcessLauncher};
