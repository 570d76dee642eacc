//! Configuration loading
//!
//! Settings come from a Java properties file, then
//! environment overrides, then built-in defaults for whatever is still absent.

use crate::constants::supervisor::ENV_OVERRIDE_PREFIX;
use crate::domain::constants::{
    DEFAULTS, JDBC_DRIVER_PATH, LOG_LEVEL, PATH_HOME, PROXY_PROPERTY_KEYS, SEARCH_LOG_LEVEL,
};
use crate::domain::{DomainError, Result, Settings};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Read properties content with `java.util.Properties` semantics.
///
/// Escapes are decoded, whitespace is accepted as a separator and lines
/// ending with an odd number of backslashes are continued.
pub fn read_properties<R: Read>(reader: R) -> Result<Settings> {
    let pairs = java_properties::read(reader)
        .map_err(|e| DomainError::Configuration(format!("Invalid properties content: {e}")))?;
    Ok(Settings::from_pairs(pairs))
}

pub fn load_properties_file(path: &Path) -> Result<Settings> {
    let file = File::open(path).map_err(|e| {
        DomainError::io(
            format!("Cannot read configuration file '{}'", path.display()),
            e,
        )
    })?;
    let pairs = java_properties::read(BufReader::new(file)).map_err(|e| {
        DomainError::Configuration(format!(
            "Cannot parse configuration file '{}': {e}",
            path.display()
        ))
    })?;
    let settings = Settings::from_pairs(pairs);
    debug!(path = %path.display(), count = settings.raw().len(), "Loaded configuration file");
    Ok(settings)
}

/// Environment variable overriding `key`.
///
/// `sonar.search.javaOpts` is overridden by `SONAR_SEARCH_JAVAOPTS`,
/// `http.proxyHost` by `SONAR_HTTP_PROXYHOST`.
pub fn env_override_name(key: &str) -> String {
    let stripped = key.strip_prefix("sonar.").unwrap_or(key);
    format!(
        "{ENV_OVERRIDE_PREFIX}{}",
        stripped.to_uppercase().replace(['.', '-'], "_")
    )
}

/// Apply overrides for every key already set or known to the supervisor.
pub fn apply_env_overrides<I>(mut settings: Settings, env: I) -> Settings
where
    I: IntoIterator<Item = (String, String)>,
{
    let env: BTreeMap<String, String> = env
        .into_iter()
        .filter(|(name, _)| name.starts_with(ENV_OVERRIDE_PREFIX))
        .collect();
    if env.is_empty() {
        return settings;
    }

    let known: BTreeSet<String> = settings
        .raw()
        .keys()
        .cloned()
        .chain(DEFAULTS.iter().map(|(key, _)| key.to_string()))
        .chain(
            [PATH_HOME, JDBC_DRIVER_PATH, LOG_LEVEL, SEARCH_LOG_LEVEL]
                .into_iter()
                .chain(PROXY_PROPERTY_KEYS)
                .map(str::to_string),
        )
        .collect();

    for key in known {
        if let Some(value) = env.get(&env_override_name(&key)) {
            info!(property = %key, "Configuration property overridden from environment");
            settings.set(key, value.clone());
        }
    }
    settings
}

/// Load the complete settings: file (if any), then environment, then defaults.
pub fn load_settings<I>(path: Option<&Path>, env: I) -> Result<Settings>
where
    I: IntoIterator<Item = (String, String)>,
{
    let settings = match path {
        Some(path) => load_properties_file(path)?,
        None => {
            warn!("No configuration file given, using environment and defaults only");
            Settings::new()
        }
    };
    Ok(apply_env_overrides(settings, env).complete_defaults())
}
