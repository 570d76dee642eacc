//! Command factory
//! Turns platform settings into launch descriptors for each process kind

use crate::domain::constants::{
    CLUSTER_WEB_STARTUP_LEADER, HTTP_PROXY_HOST, HTTP_PROXY_PORT, HTTPS_PROXY_HOST,
    HTTPS_PROXY_PORT, JDBC_DRIVER_PATH, PATH_HOME, PATH_LOGS, PROXY_PROPERTY_KEYS,
};
use crate::domain::value_objects::{
    CommandDescriptor, JvmOptions, ManagedProcessCommand, ProcessCommand, ProcessKind,
    SearchEngineCommand, SearchEngineLayout, SearchEngineLogging, SearchEngineSettings, Settings,
};
use crate::domain::{DomainError, Result};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Environment variable telling the engine's launcher script where the JVM options are.
pub const ES_JVM_OPTIONS_ENV: &str = "ES_JVM_OPTIONS";
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";

pub struct CommandFactory {
    settings: Settings,
    temp_dir: PathBuf,
    java_home: Option<PathBuf>,
}

impl CommandFactory {
    /// `settings` are expected to be completed with defaults already.
    pub fn new(settings: Settings, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            temp_dir: temp_dir.into(),
            java_home: None,
        }
    }

    /// Builder method to set the Java installation used by every child process
    pub fn with_java_home(mut self, java_home: impl Into<PathBuf>) -> Self {
        self.java_home = Some(java_home.into());
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build the command of any process kind.
    ///
    /// `leader` only matters for the web server.
    pub fn create_command(&self, kind: ProcessKind, leader: bool) -> Result<ProcessCommand> {
        if kind.is_managed_jvm() {
            self.create_managed_process_command(kind, leader)
                .map(Into::into)
        } else {
            self.create_search_engine_command().map(Into::into)
        }
    }

    pub fn create_search_engine_command(&self) -> Result<SearchEngineCommand> {
        let layout = SearchEngineLayout::from_settings(&self.settings)?;
        let executable = layout.executable();
        if !executable.is_file() {
            error!(path = %executable.display(), "Cannot find search engine binary");
            return Err(DomainError::MissingBinary(executable));
        }

        let engine_settings = SearchEngineSettings::build(&self.settings, &layout)?;
        let logging = SearchEngineLogging::build(&self.settings, layout.log_directory())?;

        let kind = ProcessKind::SearchEngine;
        let mut jvm_options = JvmOptions::search_engine();
        jvm_options
            .add_from_mandatory_property(&self.settings, kind.java_opts_key())?
            .add_from_property(&self.settings, kind.java_additional_opts_key());

        let mut builder = CommandDescriptor::builder(kind, layout.home_directory())
            .arguments(self.settings.raw())
            .env(
                ES_JVM_OPTIONS_ENV,
                layout.jvm_options_file().display().to_string(),
            );
        if let Some(ref java_home) = self.java_home {
            builder = builder.env(JAVA_HOME_ENV, java_home.display().to_string());
        }

        let engine_options = vec![format!(
            "-Epath.conf={}",
            layout.conf_directory().display()
        )];

        info!(
            process = %kind,
            executable = %executable.display(),
            cluster = engine_settings.cluster_name(),
            host = engine_settings.host(),
            port = engine_settings.transport_port(),
            "Created search engine command"
        );
        Ok(SearchEngineCommand::new(
            builder.build(),
            layout,
            engine_options,
            jvm_options,
            engine_settings,
            logging,
        ))
    }

    /// Build the command of a JVM process started from its main class.
    pub fn create_managed_process_command(
        &self,
        kind: ProcessKind,
        leader: bool,
    ) -> Result<ManagedProcessCommand> {
        let main_class = kind.main_class().ok_or_else(|| {
            DomainError::Configuration(format!(
                "{} is not started as a managed JVM process",
                kind.human_name()
            ))
        })?;

        let home = self.settings.mandatory_path(PATH_HOME)?;
        if !home.is_dir() {
            return Err(DomainError::Configuration(format!(
                "Home directory '{}' does not exist",
                home.display()
            )));
        }

        let mut jvm_options = JvmOptions::for_kind(kind, &self.temp_dir);
        jvm_options
            .add_from_mandatory_property(&self.settings, kind.java_opts_key())?
            .add_from_property(&self.settings, kind.java_additional_opts_key());
        add_proxy_options(&self.settings, &mut jvm_options);

        let mut builder = CommandDescriptor::builder(kind, &home).arguments(self.settings.raw());
        if kind == ProcessKind::WebServer {
            // the web server's access log valve reads the logs path from its environment
            builder = builder
                .env(PATH_LOGS, self.settings.mandatory_value(PATH_LOGS)?)
                .argument(CLUSTER_WEB_STARTUP_LEADER, leader.to_string());
        }

        let mut classpath: Vec<String> = kind.classpath().iter().map(|s| s.to_string()).collect();
        if let Some(driver) = self.settings.non_blank_value(JDBC_DRIVER_PATH) {
            debug!(process = %kind, driver, "Adding external JDBC driver to classpath");
            classpath.push(driver.to_string());
        }

        info!(
            process = %kind,
            home = %home.display(),
            main_class,
            "Created managed process command"
        );
        Ok(ManagedProcessCommand::new(
            builder.build(),
            self.java_executable(),
            main_class.to_string(),
            classpath,
            jvm_options,
        ))
    }

    pub fn create_web_command(&self, leader: bool) -> Result<ManagedProcessCommand> {
        self.create_managed_process_command(ProcessKind::WebServer, leader)
    }

    pub fn create_compute_engine_command(&self) -> Result<ManagedProcessCommand> {
        self.create_managed_process_command(ProcessKind::ComputeEngine, false)
    }

    fn java_executable(&self) -> PathBuf {
        let name = if cfg!(windows) { "java.exe" } else { "java" };
        match self.java_home {
            Some(ref home) => home.join("bin").join(name),
            None => PathBuf::from(name),
        }
    }
}

/// Forward the configured proxy settings as system properties.
///
/// HTTPS host and port fall back to their HTTP counterparts when not set.
fn add_proxy_options(settings: &Settings, jvm_options: &mut JvmOptions) {
    for key in PROXY_PROPERTY_KEYS {
        if let Some(value) = settings.non_blank_value(key) {
            jvm_options.add(format!("-D{key}={value}"));
        }
    }

    for (https_key, http_key) in [
        (HTTPS_PROXY_HOST, HTTP_PROXY_HOST),
        (HTTPS_PROXY_PORT, HTTP_PROXY_PORT),
    ] {
        if settings.non_blank_value(https_key).is_none()
            && let Some(value) = settings.non_blank_value(http_key)
        {
            jvm_options.add(format!("-D{https_key}={value}"));
        }
    }
}
