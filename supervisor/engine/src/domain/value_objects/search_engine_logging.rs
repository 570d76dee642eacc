//! Search engine logging
//! Log4j2 configuration handed to the search engine through its conf directory

use crate::domain::constants::{LOG_LEVEL, SEARCH_LOG_LEVEL};
use crate::domain::value_objects::Settings;
use crate::domain::{DomainError, Result};
use java_properties::PropertiesWriter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

const LOG_FILE_NAME: &str = "es.log";
const LOG_PATTERN: &str = "%d{yyyy.MM.dd HH:mm:ss} %-5level es[][%logger{1.}] %msg%n";
const DEFAULT_LEVEL: &str = "INFO";
const SUPPORTED_LEVELS: [&str; 3] = ["TRACE", "DEBUG", "INFO"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchEngineLogging {
    properties: BTreeMap<String, String>,
}

impl SearchEngineLogging {
    /// Daily rolling `es.log` in `log_directory`.
    ///
    /// The root level comes from `sonar.log.level.es`, then `sonar.log.level`,
    /// then `INFO`.
    pub fn build(settings: &Settings, log_directory: &Path) -> Result<Self> {
        let level = root_level(settings)?;
        let log_file = log_directory.join(LOG_FILE_NAME);
        let file_pattern = log_directory.join("es.%d{yyyy-MM-dd}.log");

        let properties = [
            ("status", "ERROR".to_string()),
            ("appender.rolling.type", "RollingFile".to_string()),
            ("appender.rolling.name", "rolling".to_string()),
            ("appender.rolling.fileName", log_file.display().to_string()),
            ("appender.rolling.filePattern", file_pattern.display().to_string()),
            ("appender.rolling.layout.type", "PatternLayout".to_string()),
            ("appender.rolling.layout.pattern", LOG_PATTERN.to_string()),
            ("appender.rolling.policies.type", "Policies".to_string()),
            (
                "appender.rolling.policies.time.type",
                "TimeBasedTriggeringPolicy".to_string(),
            ),
            ("appender.rolling.policies.time.interval", "1".to_string()),
            ("appender.rolling.policies.time.modulate", "true".to_string()),
            ("rootLogger.level", level),
            ("rootLogger.appenderRef.rolling.ref", "rolling".to_string()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

        Ok(Self { properties })
    }

    pub fn root_level(&self) -> Option<&str> {
        self.properties.get("rootLogger.level").map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let context = || {
            format!(
                "Cannot write search engine logging file '{}'",
                path.display()
            )
        };

        let file = File::create(path).map_err(|e| DomainError::io(context(), e))?;
        let mut writer = PropertiesWriter::new(BufWriter::new(file));
        self.properties
            .iter()
            .try_for_each(|(key, value)| writer.write(key, value))
            .and_then(|_| writer.finish())
            .map_err(|e| DomainError::Configuration(format!("{}: {e}", context())))?;

        debug!(path = %path.display(), "Wrote search engine logging file");
        Ok(())
    }
}

fn root_level(settings: &Settings) -> Result<String> {
    let Some((key, value)) = [SEARCH_LOG_LEVEL, LOG_LEVEL]
        .into_iter()
        .find_map(|key| settings.non_blank_value(key).map(|value| (key, value)))
    else {
        return Ok(DEFAULT_LEVEL.to_string());
    };

    let level = value.to_uppercase();
    if !SUPPORTED_LEVELS.contains(&level.as_str()) {
        return Err(DomainError::Configuration(format!(
            "Invalid log level '{value}' for property '{key}', supported values are {}",
            SUPPORTED_LEVELS.join(", ")
        )));
    }
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_info_rolling_file() {
        let logging = SearchEngineLogging::build(&Settings::new(), Path::new("/var/log/platform"))
            .unwrap();

        assert_eq!(logging.root_level(), Some("INFO"));
        assert_eq!(
            logging.as_map()["appender.rolling.fileName"],
            Path::new("/var/log/platform").join("es.log").display().to_string()
        );
        assert_eq!(logging.as_map()["rootLogger.appenderRef.rolling.ref"], "rolling");
    }

    #[test]
    fn test_engine_level_takes_precedence() {
        let settings = Settings::new()
            .with(LOG_LEVEL, "DEBUG")
            .with(SEARCH_LOG_LEVEL, "trace");
        let logging = SearchEngineLogging::build(&settings, Path::new("/logs")).unwrap();
        assert_eq!(logging.root_level(), Some("TRACE"));

        let settings = Settings::new().with(LOG_LEVEL, "debug");
        let logging = SearchEngineLogging::build(&settings, Path::new("/logs")).unwrap();
        assert_eq!(logging.root_level(), Some("DEBUG"));
    }

    #[test]
    fn test_invalid_level_is_a_configuration_error() {
        let settings = Settings::new().with(LOG_LEVEL, "verbose");
        let err = SearchEngineLogging::build(&settings, Path::new("/logs")).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
        assert!(err.to_string().contains(LOG_LEVEL));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log4j2.properties");
        let logging = SearchEngineLogging::build(&Settings::new(), dir.path()).unwrap();

        logging.write_to_file(&path).unwrap();

        let written: BTreeMap<String, String> = java_properties::read(File::open(&path).unwrap())
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(&written, logging.as_map());
    }
}
