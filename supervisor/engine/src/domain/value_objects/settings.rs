//! Settings value object
//! Flat, read-only key/value configuration shared by every command builder

use crate::domain::constants::{DEFAULTS, PATH_HOME, PATH_KEYS};
use crate::domain::{DomainError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration as a flat key -> string mapping.
///
/// Values are trimmed on read. Keys are kept sorted so that everything derived
/// from the raw mapping (forwarded arguments, dry-run output) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Builder method to set a key (last write wins)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Trimmed value, `None` when the key is absent.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.trim())
    }

    /// Trimmed value, `None` when the key is absent or blank.
    pub fn non_blank_value(&self, key: &str) -> Option<&str> {
        self.value(key).filter(|v| !v.is_empty())
    }

    pub fn mandatory_value(&self, key: &str) -> Result<&str> {
        self.non_blank_value(key).ok_or_else(|| {
            DomainError::Configuration(format!("Missing mandatory property '{key}'"))
        })
    }

    pub fn value_as_path(&self, key: &str) -> Option<PathBuf> {
        self.non_blank_value(key).map(PathBuf::from)
    }

    pub fn mandatory_path(&self, key: &str) -> Result<PathBuf> {
        self.mandatory_value(key).map(PathBuf::from)
    }

    pub fn value_as_port(&self, key: &str) -> Result<Option<u16>> {
        self.non_blank_value(key)
            .map(|v| {
                v.parse::<u16>().map_err(|_| {
                    DomainError::Configuration(format!(
                        "Property '{key}' is not a valid port: '{v}'"
                    ))
                })
            })
            .transpose()
    }

    /// All configured pairs, in key order.
    pub fn raw(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Fill in defaults for absent keys and make path keys absolute.
    ///
    /// Relative paths are resolved against `sonar.path.home`; when home is not
    /// configured they are left untouched and the command factory reports it.
    pub fn complete_defaults(mut self) -> Self {
        for (key, default) in DEFAULTS {
            if !self.values.contains_key(key) {
                self.values.insert(key.to_string(), default.to_string());
            }
        }

        if let Some(home) = self.value_as_path(PATH_HOME) {
            for key in PATH_KEYS {
                if let Some(path) = self.value_as_path(key)
                    && path.is_relative()
                {
                    let resolved = home.join(&path);
                    self.values
                        .insert(key.to_string(), resolved.to_string_lossy().into_owned());
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::*;

    #[test]
    fn test_value_is_trimmed() {
        let settings = Settings::new().with("a", "  b  ");
        assert_eq!(settings.value("a"), Some("b"));
        assert_eq!(settings.value("missing"), None);
    }

    #[test]
    fn test_blank_value_is_not_mandatory_compliant() {
        let settings = Settings::new().with("blank", "   ");
        assert_eq!(settings.value("blank"), Some(""));
        assert_eq!(settings.non_blank_value("blank"), None);

        let err = settings.mandatory_value("blank").unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
        assert!(err.to_string().contains("'blank'"));
    }

    #[test]
    fn test_last_write_wins() {
        let settings = Settings::new().with("k", "1").with("k", "2");
        assert_eq!(settings.value("k"), Some("2"));
    }

    #[test]
    fn test_value_as_port() {
        let settings = Settings::new().with("p", "9001").with("bad", "http");
        assert_eq!(settings.value_as_port("p").unwrap(), Some(9001));
        assert_eq!(settings.value_as_port("none").unwrap(), None);
        assert!(settings.value_as_port("bad").is_err());
    }

    #[test]
    fn test_complete_defaults_keeps_explicit_values() {
        let settings = Settings::new()
            .with(SEARCH_PORT, "1234")
            .complete_defaults();
        assert_eq!(settings.value(SEARCH_PORT), Some("1234"));
        assert_eq!(settings.value(SEARCH_HOST), Some("127.0.0.1"));
        assert_eq!(settings.value(CLUSTER_NAME), Some("sonarqube"));
        assert_eq!(settings.value(WEB_JAVA_ADDITIONAL_OPTS), Some(""));
    }

    #[test]
    fn test_complete_defaults_resolves_relative_paths_against_home() {
        let settings = Settings::new()
            .with(PATH_HOME, "/opt/platform")
            .with(PATH_LOGS, "/var/log/platform")
            .complete_defaults();
        assert_eq!(
            settings.value_as_path(PATH_DATA),
            Some(PathBuf::from("/opt/platform/data"))
        );
        assert_eq!(
            settings.value_as_path(PATH_TEMP),
            Some(PathBuf::from("/opt/platform/temp"))
        );
        assert_eq!(
            settings.value_as_path(PATH_LOGS),
            Some(PathBuf::from("/var/log/platform"))
        );
    }

    #[test]
    fn test_complete_defaults_without_home_leaves_paths_relative() {
        let settings = Settings::new().complete_defaults();
        assert_eq!(settings.value(PATH_DATA), Some("data"));
        assert!(settings.value(PATH_HOME).is_none());
    }
}
