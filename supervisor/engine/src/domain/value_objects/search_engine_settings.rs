//! Search engine settings
//! Native configuration of the search engine, derived from the platform settings

use crate::domain::constants::{
    CLUSTER_NAME, CLUSTER_NODE_NAME, SEARCH_HOST, SEARCH_HTTP_PORT, SEARCH_PORT,
};
use crate::domain::value_objects::{SearchEngineLayout, Settings};
use crate::domain::{DomainError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::TcpListener;
use std::path::Path;
use tracing::{debug, info};

const SETTINGS_FILE_HEADER: &str = "# This file has been automatically generated by the platform supervisor during startup.\n\
     \n\
     # DO NOT EDIT THIS FILE\n\
     \n";

/// Address of the search engine's HTTP interface, used for health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEngineEndpoint {
    pub host: String,
    pub http_port: u16,
}

impl SearchEngineEndpoint {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.http_port)
    }
}

impl std::fmt::Display for SearchEngineEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.http_port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEngineSettings {
    cluster_name: String,
    host: String,
    transport_port: u16,
    http_port: u16,
    values: BTreeMap<String, String>,
}

impl SearchEngineSettings {
    /// Derive the standalone node settings.
    ///
    /// A port configured as `0` is replaced by a free port of the bind host.
    pub fn build(settings: &Settings, layout: &SearchEngineLayout) -> Result<Self> {
        let cluster_name = settings.mandatory_value(CLUSTER_NAME)?.to_string();
        let node_name = settings
            .non_blank_value(CLUSTER_NODE_NAME)
            .unwrap_or(cluster_name.as_str())
            .to_string();
        let host = settings.mandatory_value(SEARCH_HOST)?.to_string();
        let transport_port = resolve_port(settings, SEARCH_PORT, &host)?;
        let http_port = resolve_port(settings, SEARCH_HTTP_PORT, &host)?;

        let mut values = BTreeMap::new();
        values.insert("cluster.name".to_string(), cluster_name.clone());
        values.insert("node.name".to_string(), node_name);
        values.insert("node.master".to_string(), "true".to_string());
        values.insert("node.data".to_string(), "true".to_string());
        values.insert(
            "discovery.zen.minimum_master_nodes".to_string(),
            "1".to_string(),
        );
        values.insert("network.host".to_string(), host.clone());
        values.insert("transport.tcp.port".to_string(), transport_port.to_string());
        values.insert("http.enabled".to_string(), "true".to_string());
        values.insert("http.host".to_string(), host.clone());
        values.insert("http.port".to_string(), http_port.to_string());
        values.insert(
            "path.data".to_string(),
            layout.data_directory().display().to_string(),
        );
        values.insert(
            "path.logs".to_string(),
            layout.log_directory().display().to_string(),
        );
        values.insert("action.auto_create_index".to_string(), "false".to_string());

        Ok(Self {
            cluster_name,
            host,
            transport_port,
            http_port,
            values,
        })
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn transport_port(&self) -> u16 {
        self.transport_port
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn endpoint(&self) -> SearchEngineEndpoint {
        SearchEngineEndpoint::new(self.host.clone(), self.http_port)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Write the settings in the engine's YAML format.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let context = || {
            format!(
                "Cannot write search engine settings file '{}'",
                path.display()
            )
        };
        let yaml = serde_yaml::to_string(&self.values).map_err(|e| {
            DomainError::Configuration(format!("Cannot serialize search engine settings: {e}"))
        })?;

        let file = File::create(path).map_err(|e| DomainError::io(context(), e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(SETTINGS_FILE_HEADER.as_bytes())
            .and_then(|_| writer.write_all(yaml.as_bytes()))
            .and_then(|_| writer.flush())
            .map_err(|e| DomainError::io(context(), e))?;

        debug!(path = %path.display(), "Wrote search engine settings file");
        Ok(())
    }
}

fn resolve_port(settings: &Settings, key: &str, host: &str) -> Result<u16> {
    let port = settings.value_as_port(key)?.ok_or_else(|| {
        DomainError::Configuration(format!("Missing mandatory property '{key}'"))
    })?;
    if port != 0 {
        return Ok(port);
    }

    let listener = TcpListener::bind((host, 0)).map_err(|e| {
        DomainError::io(format!("Cannot find a free port on '{host}' for {key}"), e)
    })?;
    let port = listener
        .local_addr()
        .map_err(|e| DomainError::io(format!("Cannot read local address for {key}"), e))?
        .port();
    info!(property = key, port, "Picked free port");
    Ok(port)
}
