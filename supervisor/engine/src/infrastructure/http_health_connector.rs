//! HTTP health connector
//! Queries the search engine's cluster health API with ureq

use crate::constants::health_check::{CLIENT_TIMEOUT_MARGIN_SECS, REMOTE_TIMEOUT_SECS};
use crate::domain::ports::HealthConnector;
use crate::domain::{DomainError, HealthLevel, SearchEngineEndpoint};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Body of `GET /_cluster/health`, reduced to what the supervisor reads.
#[derive(Debug, Deserialize)]
struct ClusterHealthResponse {
    status: HealthLevel,
}

pub struct HttpHealthConnector {
    agent: ureq::Agent,
    remote_timeout: Duration,
}

impl HttpHealthConnector {
    pub fn new() -> Self {
        Self::with_remote_timeout(Duration::from_secs(REMOTE_TIMEOUT_SECS))
    }

    /// The engine waits up to `remote_timeout` for the cluster to reach yellow;
    /// the client gives up a fixed margin later.
    pub fn with_remote_timeout(remote_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(remote_timeout + Duration::from_secs(CLIENT_TIMEOUT_MARGIN_SECS))
            .build();
        Self {
            agent,
            remote_timeout,
        }
    }

    fn url(endpoint: &SearchEngineEndpoint) -> String {
        format!("{}/_cluster/health", endpoint.base_url())
    }

    fn parse(body: &str) -> Result<HealthLevel, DomainError> {
        serde_json::from_str::<ClusterHealthResponse>(body)
            .map(|health| health.status)
            .map_err(|e| DomainError::HealthCheck(format!("Invalid cluster health response: {e}")))
    }
}

impl Default for HttpHealthConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthConnector for HttpHealthConnector {
    fn cluster_health(&self, endpoint: &SearchEngineEndpoint) -> Result<HealthLevel, DomainError> {
        let url = Self::url(endpoint);
        debug!(url = %url, "Querying search engine cluster health");

        let response = self
            .agent
            .get(&url)
            .query("wait_for_status", HealthLevel::MIN_OPERATIONAL.to_string().as_str())
            .query("timeout", &format!("{}s", self.remote_timeout.as_secs()))
            .call();

        let response = match response {
            Ok(response) => response,
            // the engine answers 408 with a regular body when the wait times out
            Err(ureq::Error::Status(408, response)) => response,
            Err(ureq::Error::Status(503, _)) => {
                return Err(DomainError::Connectivity(format!(
                    "Search engine at {endpoint} is not ready (HTTP 503)"
                )));
            }
            Err(ureq::Error::Status(code, _)) => {
                return Err(DomainError::HealthCheck(format!(
                    "Unexpected HTTP {code} from search engine at {endpoint}"
                )));
            }
            Err(ureq::Error::Transport(e)) => {
                return Err(DomainError::Connectivity(format!(
                    "Cannot reach search engine at {endpoint}: {e}"
                )));
            }
        };

        let body = response.into_string().map_err(|e| {
            DomainError::HealthCheck(format!("Cannot read cluster health response: {e}"))
        })?;
        let level = Self::parse(&body)?;
        debug!(endpoint = %endpoint, level = %level, "Cluster health");
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let endpoint = SearchEngineEndpoint::new("10.0.0.5", 9600);
        assert_eq!(
            HttpHealthConnector::url(&endpoint),
            "http://10.0.0.5:9600/_cluster/health"
        );
    }

    #[test]
    fn test_parse_levels() {
        let body = r#"{"cluster_name":"sonarqube","status":"yellow","timed_out":false}"#;
        assert_eq!(HttpHealthConnector::parse(body).unwrap(), HealthLevel::Yellow);
        assert_eq!(
            HttpHealthConnector::parse(r#"{"status":"green"}"#).unwrap(),
            HealthLevel::Green
        );
        assert_eq!(
            HttpHealthConnector::parse(r#"{"status":"red"}"#).unwrap(),
            HealthLevel::Red
        );
    }

    #[test]
    fn test_parse_unknown_status_is_a_health_check_error() {
        let err = HttpHealthConnector::parse(r#"{"status":"purple"}"#).unwrap_err();
        assert!(matches!(err, DomainError::HealthCheck(_)));
    }

    #[test]
    fn test_parse_garbage_is_a_health_check_error() {
        for body in ["", "not json", r#"{"cluster_name":"x"}"#] {
            let err = HttpHealthConnector::parse(body).unwrap_err();
            assert!(!err.is_connectivity());
        }
    }

    #[test]
    fn test_refused_connection_is_a_connectivity_error() {
        // bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let connector = HttpHealthConnector::with_remote_timeout(Duration::from_secs(1));
        let err = connector
            .cluster_health(&SearchEngineEndpoint::new("127.0.0.1", port))
            .unwrap_err();

        assert!(err.is_connectivity());
    }
}
