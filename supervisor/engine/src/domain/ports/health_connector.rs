//! Port for search engine health queries

use crate::domain::{DomainError, HealthLevel, SearchEngineEndpoint};

/// One bounded-duration health query against a running search engine.
///
/// Implementations return [`DomainError::Connectivity`] when the engine cannot
/// be reached (it may still be starting) and [`DomainError::HealthCheck`] for
/// any other failure. Only the former is retried by the monitor.
pub trait HealthConnector: Send + Sync {
    fn cluster_health(&self, endpoint: &SearchEngineEndpoint) -> Result<HealthLevel, DomainError>;
}
