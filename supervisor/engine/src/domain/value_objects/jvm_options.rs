//! JVM options value object
//! Ordered, append-only list of launch flags for one process

use crate::domain::value_objects::{ProcessKind, Settings};
use crate::domain::{DomainError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Flags every search engine JVM starts with, in this order.
const SEARCH_ENGINE_MANDATORY_OPTIONS: [&str; 16] = [
    "-XX:+UseConcMarkSweepGC",
    "-XX:CMSInitiatingOccupancyFraction=75",
    "-XX:+UseCMSInitiatingOccupancyOnly",
    "-XX:+AlwaysPreTouch",
    "-server",
    "-Xss1m",
    "-Djava.awt.headless=true",
    "-Dfile.encoding=UTF-8",
    "-Djna.nosys=true",
    "-Djdk.io.permissionsUseCanonicalPath=true",
    "-Dio.netty.noUnsafe=true",
    "-Dio.netty.noKeySetOptimization=true",
    "-Dio.netty.recycler.maxCapacityPerThread=0",
    "-Dlog4j.shutdownHookEnabled=false",
    "-Dlog4j2.disable.jmx=true",
    "-Dlog4j.skipJansi=true",
];

/// JVM flags for one process kind.
///
/// The mandatory defaults of the kind are seeded at construction and always
/// come first. Later flags are appended; duplicates are kept as-is and the JVM
/// applies the last occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JvmOptions {
    kind: ProcessKind,
    options: Vec<String>,
}

impl JvmOptions {
    pub fn search_engine() -> Self {
        Self::with_mandatory(
            ProcessKind::SearchEngine,
            SEARCH_ENGINE_MANDATORY_OPTIONS.iter().map(|s| s.to_string()),
        )
    }

    pub fn web_server(tmp_dir: &Path) -> Self {
        Self::with_mandatory(ProcessKind::WebServer, jvm_process_defaults(tmp_dir))
    }

    pub fn compute_engine(tmp_dir: &Path) -> Self {
        Self::with_mandatory(ProcessKind::ComputeEngine, jvm_process_defaults(tmp_dir))
    }

    pub fn for_kind(kind: ProcessKind, tmp_dir: &Path) -> Self {
        match kind {
            ProcessKind::SearchEngine => Self::search_engine(),
            ProcessKind::WebServer => Self::web_server(tmp_dir),
            ProcessKind::ComputeEngine => Self::compute_engine(tmp_dir),
        }
    }

    fn with_mandatory(kind: ProcessKind, mandatory: impl IntoIterator<Item = String>) -> Self {
        Self {
            kind,
            options: mandatory.into_iter().collect(),
        }
    }

    pub fn kind(&self) -> ProcessKind {
        self.kind
    }

    /// Append a single literal flag.
    pub fn add(&mut self, flag: impl Into<String>) -> &mut Self {
        self.options.push(flag.into());
        self
    }

    /// Append the whitespace-separated flags of a property that must be set.
    pub fn add_from_mandatory_property(
        &mut self,
        settings: &Settings,
        key: &str,
    ) -> Result<&mut Self> {
        let value = settings.mandatory_value(key)?;
        self.extend_from_value(value);
        Ok(self)
    }

    /// Append the whitespace-separated flags of a property, if it is set.
    pub fn add_from_property(&mut self, settings: &Settings, key: &str) -> &mut Self {
        if let Some(value) = settings.non_blank_value(key) {
            self.extend_from_value(value);
        }
        self
    }

    fn extend_from_value(&mut self, value: &str) {
        self.options
            .extend(value.split_whitespace().map(|token| token.to_string()));
    }

    pub fn all(&self) -> &[String] {
        &self.options
    }

    /// Write the options file read by the process launcher script.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let context = || {
            format!(
                "Cannot write {} JVM options file '{}'",
                self.kind.human_name(),
                path.display()
            )
        };

        let file = File::create(path).map_err(|e| DomainError::io(context(), e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(self.render().as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| DomainError::io(context(), e))?;

        debug!(
            process = %self.kind,
            path = %path.display(),
            count = self.options.len(),
            "Wrote JVM options file"
        );
        Ok(())
    }

    fn render(&self) -> String {
        let mut content = format!(
            "# This file has been automatically generated by the platform supervisor during startup.\n\
             # Please use {} in sonar.properties to specify jvm options for the {}\n\
             \n\
             # DO NOT EDIT THIS FILE\n\
             \n",
            self.kind.java_opts_key(),
            self.kind.human_name()
        );
        for option in &self.options {
            content.push_str(option);
            content.push('\n');
        }
        content
    }
}

fn jvm_process_defaults(tmp_dir: &Path) -> impl Iterator<Item = String> {
    [
        "-Djava.awt.headless=true".to_string(),
        "-Dfile.encoding=UTF-8".to_string(),
        format!("-Djava.io.tmpdir={}", tmp_dir.display()),
    ]
    .into_iter()
}
