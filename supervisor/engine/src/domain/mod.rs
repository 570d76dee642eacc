pub mod constants;
pub mod error;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use error::{DomainError, Result};
pub use services::{CommandFactory, ProcessHealthMonitor, RetryPolicy};
pub use value_objects::{
    CommandDescriptor, HealthLevel, JvmOptions, ManagedProcessCommand, ProcessCommand,
    ProcessKind, SearchEngineCommand, SearchEngineEndpoint, SearchEngineLayout,
    SearchEngineLogging, SearchEngineSettings, Settings,
};
