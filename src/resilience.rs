//! Resilience patterns for the external catalog adapter.
//!
//! Timeout configuration plus re-exports of the production-grade circuit
//! breaker (`failsafe`) and retry (`backon`) crates for wiring into external
//! calls.

pub mod timeout {
    //! Timeout configuration for external service calls.

    use std::time::Duration;

    /// Per-call catalog timeout — fixed at 10s per call.
    pub const CATALOG_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default timeout for database operations (profile/history/weight stores).
    pub const DB_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

    #[derive(Debug, Clone, Copy)]
    pub struct TimeoutConfig {
        pub catalog: Duration,
        pub db_query: Duration,
    }

    impl Default for TimeoutConfig {
        fn default() -> Self {
            Self {
                catalog: CATALOG_REQUEST_TIMEOUT,
                db_query: DB_QUERY_TIMEOUT,
            }
        }
    }

    impl TimeoutConfig {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub const fn with_catalog_timeout(mut self, timeout: Duration) -> Self {
            self.catalog = timeout;
            self
        }

        #[must_use]
        pub const fn with_db_query_timeout(mut self, timeout: Duration) -> Self {
            self.db_query = timeout;
            self
        }
    }
}

pub mod retry {
    //! Retry utilities.
    //!
    //! The catalog adapter's single 429/503 retry is built on `backon`;
    //! this module retains the `should_retry_error` classifier for
    //! lower-level transport failures (connection resets, timeouts).

    use std::time::Duration;

    /// Fixed ≥1s backoff used for the catalog adapter's single 429/503 retry.
    pub const CATALOG_RETRY_DELAY: Duration = Duration::from_secs(1);

    /// Check whether a transport-level error is transient and worth retrying.
    pub fn should_retry_error(err: &(dyn std::error::Error + 'static)) -> bool {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return is_transient_io_error(io_err);
        }

        let err_msg = err.to_string().to_lowercase();
        err_msg.contains("timed out")
            || err_msg.contains("timeout")
            || err_msg.contains("connection reset")
            || err_msg.contains("connection refused")
            || err_msg.contains("connection aborted")
            || err_msg.contains("broken pipe")
    }

    fn is_transient_io_error(err: &std::io::Error) -> bool {
        matches!(
            err.kind(),
            std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof
        )
    }
}

pub mod circuit_breaker {
    //! Circuit breaker pattern for the external catalog.
    //!
    //! Not wired into every call by default, but exposed as ambient
    //! infrastructure — a caller embedding this crate in a larger service can
    //! trip one on repeated catalog-adapter failures.

    use std::time::Duration;

    pub use failsafe::CircuitBreaker;

    /// Create a circuit breaker with sensible defaults for external service calls.
    ///
    /// Opens after `failure_threshold` consecutive failures, then backs off
    /// exponentially from `min_backoff` to `max_backoff`.
    pub fn create(
        failure_threshold: u32,
        min_backoff: Duration,
        max_backoff: Duration,
    ) -> failsafe::StateMachine<
        failsafe::failure_policy::ConsecutiveFailures<failsafe::backoff::Exponential>,
        (),
    > {
        let backoff = failsafe::backoff::exponential(min_backoff, max_backoff);
        let policy = failsafe::failure_policy::consecutive_failures(failure_threshold, backoff);
        failsafe::Config::new().failure_policy(policy).build()
    }

    /// Default settings: 5 consecutive failures, 10–60s backoff.
    pub fn create_default() -> failsafe::StateMachine<
        failsafe::failure_policy::ConsecutiveFailures<failsafe::backoff::Exponential>,
        (),
    > {
        create(5, Duration::from_secs(10), Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use failsafe::CircuitBreaker;
    use std::time::Duration;
    use timeout::TimeoutConfig;

    #[test]
    fn test_timeout_config() {
        let config = TimeoutConfig::new().with_catalog_timeout(Duration::from_secs(5));
        assert_eq!(config.catalog.as_secs(), 5);
    }

    #[test]
    fn test_circuit_breaker_failsafe() {
        let cb = circuit_breaker::create(3, Duration::from_secs(2), Duration::from_secs(10));
        assert!(cb.is_call_permitted());
        for _ in 0..3 {
            cb.on_error();
        }
        assert!(!cb.is_call_permitted());
    }

    #[test]
    fn test_should_retry_error() {
        let timeout_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout");
        assert!(retry::should_retry_error(&timeout_err));

        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        assert!(!retry::should_retry_error(&not_found));
    }
}
