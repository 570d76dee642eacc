//! Application-wide constants and default values

/// Search engine health check defaults
pub mod health_check {
    /// Server-side wait for the cluster to reach at least yellow (seconds)
    pub const REMOTE_TIMEOUT_SECS: u64 = 30;

    /// Extra client-side slack on top of the server-side wait (seconds)
    pub const CLIENT_TIMEOUT_MARGIN_SECS: u64 = 5;

    /// Delay between attempts while the endpoint is unreachable (milliseconds)
    pub const RETRY_DELAY_MILLIS: u64 = 100;

    /// Attempts per poll while the endpoint is unreachable (one minute in total)
    pub const RETRY_MAX_ATTEMPTS: u32 = 600;
}

/// Supervisor run loop defaults
pub mod supervisor {
    /// Interval between two operational polls of the search engine (seconds)
    pub const POLL_INTERVAL_SECS: u64 = 1;

    /// Grace period for children to exit after SIGTERM (seconds)
    pub const STOP_TIMEOUT_SECS: u64 = 30;

    /// Environment variable naming the configuration file
    pub const CONFIG_FILE_ENV: &str = "SONAR_CONFIG_FILE";

    /// Prefix of environment variables overriding configuration keys
    pub const ENV_OVERRIDE_PREFIX: &str = "SONAR_";
}
