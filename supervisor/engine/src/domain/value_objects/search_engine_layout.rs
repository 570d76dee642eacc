//! Search engine installation layout
//! Where the engine is installed and where its generated files go

use crate::domain::Result;
use crate::domain::constants::{PATH_DATA, PATH_HOME, PATH_LOGS, PATH_TEMP};
use crate::domain::value_objects::Settings;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEngineLayout {
    home_directory: PathBuf,
    data_directory: PathBuf,
    conf_directory: PathBuf,
    log_directory: PathBuf,
}

impl SearchEngineLayout {
    /// Resolve the layout from completed settings.
    ///
    /// The engine ships in `<home>/elasticsearch`. Its configuration is
    /// regenerated at each start under `<temp>/conf/es`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let platform_home = settings.mandatory_path(PATH_HOME)?;
        let data = settings
            .value_as_path(PATH_DATA)
            .unwrap_or_else(|| platform_home.join("data"));
        let temp = settings
            .value_as_path(PATH_TEMP)
            .unwrap_or_else(|| platform_home.join("temp"));
        let logs = settings
            .value_as_path(PATH_LOGS)
            .unwrap_or_else(|| platform_home.join("logs"));

        Ok(Self {
            home_directory: platform_home.join("elasticsearch"),
            data_directory: data.join("es5"),
            conf_directory: temp.join("conf").join("es"),
            log_directory: logs,
        })
    }

    pub fn home_directory(&self) -> &Path {
        &self.home_directory
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    pub fn conf_directory(&self) -> &Path {
        &self.conf_directory
    }

    pub fn log_directory(&self) -> &Path {
        &self.log_directory
    }

    pub fn executable(&self) -> PathBuf {
        let name = if cfg!(windows) {
            "elasticsearch.bat"
        } else {
            "elasticsearch"
        };
        self.home_directory.join("bin").join(name)
    }

    pub fn jvm_options_file(&self) -> PathBuf {
        self.conf_directory.join("jvm.options")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.conf_directory.join("elasticsearch.yml")
    }

    pub fn log4j2_properties_file(&self) -> PathBuf {
        self.conf_directory.join("log4j2.properties")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_defaults() {
        let settings = Settings::new()
            .with(PATH_HOME, "/opt/platform")
            .complete_defaults();

        let layout = SearchEngineLayout::from_settings(&settings).unwrap();

        assert_eq!(
            layout.home_directory(),
            Path::new("/opt/platform/elasticsearch")
        );
        assert_eq!(layout.data_directory(), Path::new("/opt/platform/data/es5"));
        assert_eq!(
            layout.conf_directory(),
            Path::new("/opt/platform/temp/conf/es")
        );
        assert_eq!(layout.log_directory(), Path::new("/opt/platform/logs"));
        assert_eq!(
            layout.jvm_options_file(),
            PathBuf::from("/opt/platform/temp/conf/es/jvm.options")
        );
        assert_eq!(
            layout.settings_file(),
            PathBuf::from("/opt/platform/temp/conf/es/elasticsearch.yml")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_path() {
        let settings = Settings::new().with(PATH_HOME, "/opt/platform");
        let layout = SearchEngineLayout::from_settings(&settings).unwrap();
        assert_eq!(
            layout.executable(),
            PathBuf::from("/opt/platform/elasticsearch/bin/elasticsearch")
        );
    }

    #[test]
    fn test_custom_data_and_logs() {
        let settings = Settings::new()
            .with(PATH_HOME, "/opt/platform")
            .with(PATH_DATA, "/srv/data")
            .with(PATH_LOGS, "/var/log/platform")
            .complete_defaults();

        let layout = SearchEngineLayout::from_settings(&settings).unwrap();

        assert_eq!(layout.data_directory(), Path::new("/srv/data/es5"));
        assert_eq!(layout.log_directory(), Path::new("/var/log/platform"));
    }

    #[test]
    fn test_missing_home_is_a_configuration_error() {
        let err = SearchEngineLayout::from_settings(&Settings::new()).unwrap_err();
        assert!(err.to_string().contains(PATH_HOME));
    }
}
