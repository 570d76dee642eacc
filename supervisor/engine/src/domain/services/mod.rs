pub mod command_factory;
pub mod process_health_monitor;

pub use command_factory::CommandFactory;
pub use process_health_monitor::{ProcessHealthMonitor, RetryPolicy};
