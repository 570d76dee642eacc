//! Process health monitor
//! Answers "is the search engine operational yet?" with a one-way latch
//!
//! The monitor starts not operational. The first poll that sees a level of at
//! least [`HealthLevel::MIN_OPERATIONAL`] latches it, and every later poll
//! returns `true` without querying the engine again.

use crate::constants::health_check::{RETRY_DELAY_MILLIS, RETRY_MAX_ATTEMPTS};
use crate::domain::ports::HealthConnector;
use crate::domain::{DomainError, HealthLevel, SearchEngineCommand, SearchEngineEndpoint};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Bound on connectivity retries within a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Longest time a poll can spend waiting between attempts.
    pub fn budget(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            RETRY_MAX_ATTEMPTS,
            Duration::from_millis(RETRY_DELAY_MILLIS),
        )
    }
}

pub struct ProcessHealthMonitor {
    endpoint: SearchEngineEndpoint,
    connector: Arc<dyn HealthConnector>,
    retry_policy: RetryPolicy,
    operational: AtomicBool,
    // 0 until the first successful query
    last_level: AtomicU8,
}

impl ProcessHealthMonitor {
    pub fn new(endpoint: SearchEngineEndpoint, connector: Arc<dyn HealthConnector>) -> Self {
        Self {
            endpoint,
            connector,
            retry_policy: RetryPolicy::default(),
            operational: AtomicBool::new(false),
            last_level: AtomicU8::new(0),
        }
    }

    pub fn for_search_engine(
        command: &SearchEngineCommand,
        connector: Arc<dyn HealthConnector>,
    ) -> Self {
        Self::new(command.endpoint(), connector)
    }

    /// Builder method to override the connectivity retry bound
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn endpoint(&self) -> &SearchEngineEndpoint {
        &self.endpoint
    }

    pub fn is_latched(&self) -> bool {
        self.operational.load(Ordering::Acquire)
    }

    /// Level returned by the most recent successful query.
    pub fn last_level(&self) -> Option<HealthLevel> {
        HealthLevel::from_u8(self.last_level.load(Ordering::Acquire))
    }

    /// Poll the engine once. Never fails: every error reads as not operational.
    ///
    /// Blocks the calling thread for up to the connector timeout per attempt,
    /// plus the retry delays while the engine is unreachable.
    pub fn is_operational(&self) -> bool {
        if self.is_latched() {
            return true;
        }

        let level = match self.query_with_retry() {
            Ok(level) => level,
            Err(e) if e.is_connectivity() => {
                warn!(
                    endpoint = %self.endpoint,
                    attempts = self.retry_policy.max_attempts,
                    waited_ms = self.retry_policy.budget().as_millis() as u64,
                    error = %e,
                    "Search engine still unreachable"
                );
                return false;
            }
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "Search engine health check failed");
                return false;
            }
        };
        self.last_level.store(level.to_u8(), Ordering::Release);

        if !level.is_operational() {
            debug!(endpoint = %self.endpoint, level = %level, "Search engine not operational yet");
            return false;
        }

        if self
            .operational
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            info!(endpoint = %self.endpoint, level = %level, "Search engine is operational");
        }
        true
    }

    fn query_with_retry(&self) -> Result<HealthLevel, DomainError> {
        let mut attempt = 1;
        loop {
            match self.connector.cluster_health(&self.endpoint) {
                Err(e) if e.is_connectivity() && attempt < self.retry_policy.max_attempts => {
                    if attempt == 1 {
                        debug!(
                            endpoint = %self.endpoint,
                            error = %e,
                            "Search engine unreachable, retrying"
                        );
                    }
                    attempt += 1;
                    thread::sleep(self.retry_policy.delay);
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    type Reply = Result<HealthLevel, DomainError>;

    /// Connector replaying a script; the last reply repeats once the script runs out.
    struct ScriptedConnector {
        replies: Mutex<VecDeque<fn() -> Reply>>,
        last: Mutex<Option<fn() -> Reply>>,
        calls: AtomicUsize,
    }

    impl ScriptedConnector {
        fn new(replies: Vec<fn() -> Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                last: Mutex::new(None),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HealthConnector for ScriptedConnector {
        fn cluster_health(&self, _endpoint: &SearchEngineEndpoint) -> Reply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut last = self.last.lock().unwrap();
            if let Some(reply) = self.replies.lock().unwrap().pop_front() {
                *last = Some(reply);
            }
            last.expect("connector script is empty")()
        }
    }

    fn red() -> Reply {
        Ok(HealthLevel::Red)
    }
    fn yellow() -> Reply {
        Ok(HealthLevel::Yellow)
    }
    fn green() -> Reply {
        Ok(HealthLevel::Green)
    }
    fn unreachable() -> Reply {
        Err(DomainError::Connectivity("connection refused".to_string()))
    }
    fn garbage() -> Reply {
        Err(DomainError::HealthCheck("unexpected response".to_string()))
    }

    fn monitor(connector: Arc<ScriptedConnector>) -> ProcessHealthMonitor {
        ProcessHealthMonitor::new(SearchEngineEndpoint::new("127.0.0.1", 9002), connector)
            .with_retry_policy(RetryPolicy::new(5, Duration::from_millis(1)))
    }

    #[test]
    fn test_red_is_not_operational() {
        let connector = ScriptedConnector::new(vec![red]);
        let monitor = monitor(connector.clone());

        assert!(!monitor.is_operational());
        assert!(!monitor.is_operational());
        assert_eq!(connector.calls(), 2);
        assert_eq!(monitor.last_level(), Some(HealthLevel::Red));
        assert!(!monitor.is_latched());
    }

    #[test]
    fn test_yellow_and_green_are_operational() {
        for reply in [yellow as fn() -> Reply, green] {
            let monitor = monitor(ScriptedConnector::new(vec![reply]));
            assert!(monitor.is_operational());
            assert!(monitor.is_latched());
        }
    }

    #[test]
    fn test_latch_is_sticky() {
        let connector = ScriptedConnector::new(vec![red, green, red]);
        let monitor = monitor(connector.clone());

        assert!(!monitor.is_operational());
        assert!(monitor.is_operational());
        assert!(monitor.is_operational());
        assert!(monitor.is_operational());

        // latched polls do not reach the engine
        assert_eq!(connector.calls(), 2);
        assert_eq!(monitor.last_level(), Some(HealthLevel::Green));
    }

    #[test]
    fn test_connectivity_failure_is_retried_within_the_poll() {
        let connector = ScriptedConnector::new(vec![unreachable, unreachable, green]);
        let monitor = monitor(connector.clone());

        assert!(monitor.is_operational());
        assert_eq!(connector.calls(), 3);
    }

    #[test]
    fn test_other_failure_is_not_retried() {
        let connector = ScriptedConnector::new(vec![garbage, green]);
        let monitor = monitor(connector.clone());

        assert!(!monitor.is_operational());
        assert_eq!(connector.calls(), 1);
        assert_eq!(monitor.last_level(), None);

        assert!(monitor.is_operational());
    }

    #[test]
    fn test_exhausted_retries_report_not_operational() {
        let connector = ScriptedConnector::new(vec![unreachable]);
        let monitor = monitor(connector.clone());

        assert!(!monitor.is_operational());
        assert_eq!(connector.calls(), 5);
        assert!(!monitor.is_latched());
    }

    #[test]
    fn test_retry_then_non_connectivity_failure_stops() {
        let connector = ScriptedConnector::new(vec![unreachable, garbage, green]);
        let monitor = monitor(connector.clone());

        assert!(!monitor.is_operational());
        assert_eq!(connector.calls(), 2);
    }

    #[test]
    fn test_concurrent_polls_latch_once() {
        let connector = ScriptedConnector::new(vec![green]);
        let monitor = Arc::new(monitor(connector));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let monitor = monitor.clone();
                thread::spawn(move || monitor.is_operational())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert!(monitor.is_latched());
    }

    #[test]
    fn test_default_retry_policy_spans_one_minute() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 600);
        assert_eq!(policy.delay, Duration::from_millis(100));
        assert_eq!(policy.budget(), Duration::from_millis(59_900));
    }

    #[test]
    fn test_retry_policy_makes_at_least_one_attempt() {
        let connector = ScriptedConnector::new(vec![unreachable]);
        let monitor = monitor(connector.clone())
            .with_retry_policy(RetryPolicy::new(0, Duration::from_millis(1)));

        assert!(!monitor.is_operational());
        assert_eq!(connector.calls(), 1);
    }
}
