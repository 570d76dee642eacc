pub mod command;
pub mod health_level;
pub mod jvm_options;
pub mod process_kind;
pub mod search_engine_layout;
pub mod search_engine_logging;
pub mod search_engine_settings;
pub mod settings;

pub use command::{
    CommandDescriptor, CommandDescriptorBuilder, ManagedProcessCommand, ProcessCommand,
    SearchEngineCommand,
};
pub use health_level::HealthLevel;
pub use jvm_options::JvmOptions;
pub use process_kind::ProcessKind;
pub use search_engine_layout::SearchEngineLayout;
pub use search_engine_logging::SearchEngineLogging;
pub use search_engine_settings::{SearchEngineEndpoint, SearchEngineSettings};
pub use settings::Settings;
