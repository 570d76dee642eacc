//! Command descriptors
//! Fully resolved launch data, one variant per way of starting a process
//!
//! Descriptors are assembled by the command factory through
//! [`CommandDescriptorBuilder`] and are read-only once built.

use crate::domain::value_objects::{
    JvmOptions, ProcessKind, SearchEngineEndpoint, SearchEngineLayout, SearchEngineLogging,
    SearchEngineSettings,
};
use crate::domain::{DomainError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Launch data shared by every process kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    kind: ProcessKind,
    home_directory: PathBuf,
    working_directory: PathBuf,
    environment: BTreeMap<String, String>,
    arguments: Vec<(String, String)>,
}

impl CommandDescriptor {
    pub fn builder(kind: ProcessKind, home_directory: impl Into<PathBuf>) -> CommandDescriptorBuilder {
        let home_directory = home_directory.into();
        CommandDescriptorBuilder {
            descriptor: CommandDescriptor {
                kind,
                working_directory: home_directory.clone(),
                home_directory,
                environment: BTreeMap::new(),
                arguments: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> ProcessKind {
        self.kind
    }

    pub fn home_directory(&self) -> &Path {
        &self.home_directory
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.environment.get(name).map(String::as_str)
    }

    /// Raw key/value pairs forwarded to the child process.
    pub fn arguments(&self) -> &[(String, String)] {
        &self.arguments
    }

    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub struct CommandDescriptorBuilder {
    descriptor: CommandDescriptor,
}

impl CommandDescriptorBuilder {
    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.descriptor.working_directory = dir.into();
        self
    }

    /// Set an environment variable; the last value set for a name wins.
    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.environment.insert(name.into(), value.into());
        self
    }

    /// Forward all pairs, in iteration order.
    pub fn arguments<'a>(mut self, pairs: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (key, value) in pairs {
            self = self.argument(key.clone(), value.clone());
        }
        self
    }

    /// Set one argument. An existing key keeps its position and takes the new value.
    pub fn argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.descriptor.arguments.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.descriptor.arguments.push((key, value)),
        }
        self
    }

    pub fn build(self) -> CommandDescriptor {
        self.descriptor
    }
}

/// Search engine command, started through the engine's own launcher script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEngineCommand {
    descriptor: CommandDescriptor,
    executable: PathBuf,
    layout: SearchEngineLayout,
    engine_options: Vec<String>,
    jvm_options: JvmOptions,
    settings: SearchEngineSettings,
    logging: SearchEngineLogging,
}

impl SearchEngineCommand {
    pub(crate) fn new(
        descriptor: CommandDescriptor,
        layout: SearchEngineLayout,
        engine_options: Vec<String>,
        jvm_options: JvmOptions,
        settings: SearchEngineSettings,
        logging: SearchEngineLogging,
    ) -> Self {
        Self {
            executable: layout.executable(),
            descriptor,
            layout,
            engine_options,
            jvm_options,
            settings,
            logging,
        }
    }

    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn layout(&self) -> &SearchEngineLayout {
        &self.layout
    }

    /// Options passed to the engine's launcher script.
    pub fn engine_options(&self) -> &[String] {
        &self.engine_options
    }

    pub fn jvm_options(&self) -> &JvmOptions {
        &self.jvm_options
    }

    pub fn settings(&self) -> &SearchEngineSettings {
        &self.settings
    }

    /// Log4j2 configuration written next to the settings file.
    pub fn logging(&self) -> &SearchEngineLogging {
        &self.logging
    }

    pub fn endpoint(&self) -> SearchEngineEndpoint {
        self.settings.endpoint()
    }

    /// Write the JVM options, settings and logging files the engine reads at startup.
    pub fn write_generated_files(&self) -> Result<()> {
        let conf = self.layout.conf_directory();
        std::fs::create_dir_all(conf).map_err(|e| {
            DomainError::io(
                format!("Cannot create search engine conf directory '{}'", conf.display()),
                e,
            )
        })?;
        self.jvm_options
            .write_to_file(&self.layout.jvm_options_file())?;
        self.settings.write_to_file(&self.layout.settings_file())?;
        self.logging
            .write_to_file(&self.layout.log4j2_properties_file())?;
        info!(conf = %conf.display(), "Generated search engine configuration");
        Ok(())
    }
}

/// JVM process started from a main class and classpath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedProcessCommand {
    descriptor: CommandDescriptor,
    java_executable: PathBuf,
    main_class: String,
    classpath: Vec<String>,
    jvm_options: JvmOptions,
}

impl ManagedProcessCommand {
    pub(crate) fn new(
        descriptor: CommandDescriptor,
        java_executable: PathBuf,
        main_class: String,
        classpath: Vec<String>,
        jvm_options: JvmOptions,
    ) -> Self {
        Self {
            descriptor,
            java_executable,
            main_class,
            classpath,
            jvm_options,
        }
    }

    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    pub fn java_executable(&self) -> &Path {
        &self.java_executable
    }

    pub fn main_class(&self) -> &str {
        &self.main_class
    }

    /// Classpath entries in loading precedence order.
    pub fn classpath(&self) -> &[String] {
        &self.classpath
    }

    pub fn jvm_options(&self) -> &JvmOptions {
        &self.jvm_options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessCommand {
    SearchEngine(SearchEngineCommand),
    Managed(ManagedProcessCommand),
}

impl ProcessCommand {
    pub fn descriptor(&self) -> &CommandDescriptor {
        match self {
            Self::SearchEngine(cmd) => cmd.descriptor(),
            Self::Managed(cmd) => cmd.descriptor(),
        }
    }

    pub fn kind(&self) -> ProcessKind {
        self.descriptor().kind()
    }

    pub fn jvm_options(&self) -> &JvmOptions {
        match self {
            Self::SearchEngine(cmd) => cmd.jvm_options(),
            Self::Managed(cmd) => cmd.jvm_options(),
        }
    }
}

impl From<SearchEngineCommand> for ProcessCommand {
    fn from(cmd: SearchEngineCommand) -> Self {
        Self::SearchEngine(cmd)
    }
}

impl From<ManagedProcessCommand> for ProcessCommand {
    fn from(cmd: ManagedProcessCommand) -> Self {
        Self::Managed(cmd)
    }
}
