//! Process kind value object
//! Identifies which of the supervised children a command is built for

use crate::domain::constants::{
    CE_JAVA_ADDITIONAL_OPTS, CE_JAVA_OPTS, SEARCH_JAVA_ADDITIONAL_OPTS, SEARCH_JAVA_OPTS,
    WEB_JAVA_ADDITIONAL_OPTS, WEB_JAVA_OPTS,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    SearchEngine,
    WebServer,
    ComputeEngine,
}

impl ProcessKind {
    /// Start order used by the supervisor.
    pub const ALL: [ProcessKind; 3] = [
        ProcessKind::SearchEngine,
        ProcessKind::WebServer,
        ProcessKind::ComputeEngine,
    ];

    /// Short stable key, used in generated file names.
    pub fn key(self) -> &'static str {
        match self {
            Self::SearchEngine => "es",
            Self::WebServer => "web",
            Self::ComputeEngine => "ce",
        }
    }

    pub fn human_name(self) -> &'static str {
        match self {
            Self::SearchEngine => "Search Engine",
            Self::WebServer => "Web Server",
            Self::ComputeEngine => "Compute Engine",
        }
    }

    /// Property holding the base JVM options (mandatory).
    pub fn java_opts_key(self) -> &'static str {
        match self {
            Self::SearchEngine => SEARCH_JAVA_OPTS,
            Self::WebServer => WEB_JAVA_OPTS,
            Self::ComputeEngine => CE_JAVA_OPTS,
        }
    }

    /// Property holding user-supplied extra JVM options (optional).
    pub fn java_additional_opts_key(self) -> &'static str {
        match self {
            Self::SearchEngine => SEARCH_JAVA_ADDITIONAL_OPTS,
            Self::WebServer => WEB_JAVA_ADDITIONAL_OPTS,
            Self::ComputeEngine => CE_JAVA_ADDITIONAL_OPTS,
        }
    }

    /// Entry point class of the JVM processes. The search engine is started
    /// through its own launcher script and has none.
    pub fn main_class(self) -> Option<&'static str> {
        match self {
            Self::SearchEngine => None,
            Self::WebServer => Some("org.sonar.server.app.WebServer"),
            Self::ComputeEngine => Some("org.sonar.ce.app.CeServer"),
        }
    }

    /// Classpath globs relative to the home directory, in loading order.
    pub fn classpath(self) -> &'static [&'static str] {
        match self {
            Self::SearchEngine => &[],
            Self::WebServer => &["./lib/common/*", "./lib/server/*"],
            Self::ComputeEngine => &["./lib/common/*", "./lib/server/*", "./lib/ce/*"],
        }
    }

    pub fn is_managed_jvm(self) -> bool {
        self.main_class().is_some()
    }
}

impl std::fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ProcessKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es" | "search" | "search_engine" => Ok(Self::SearchEngine),
            "web" | "web_server" => Ok(Self::WebServer),
            "ce" | "compute_engine" => Ok(Self::ComputeEngine),
            other => Err(format!("unknown process kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trips_through_from_str() {
        for kind in ProcessKind::ALL {
            assert_eq!(kind.key().parse::<ProcessKind>().unwrap(), kind);
        }
        assert!("db".parse::<ProcessKind>().is_err());
    }

    #[test]
    fn test_only_jvm_kinds_have_a_main_class() {
        assert!(!ProcessKind::SearchEngine.is_managed_jvm());
        assert!(ProcessKind::WebServer.is_managed_jvm());
        assert!(ProcessKind::ComputeEngine.is_managed_jvm());
    }

    #[test]
    fn test_compute_engine_classpath_extends_web_classpath() {
        let web = ProcessKind::WebServer.classpath();
        let ce = ProcessKind::ComputeEngine.classpath();
        assert_eq!(&ce[..web.len()], web);
        assert_eq!(ce.last(), Some(&"./lib/ce/*"));
    }
}
