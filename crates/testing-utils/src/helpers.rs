//! Test helper utilities and common testing patterns

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// Test environment setup utilities
pub struct TestEnv;

impl TestEnv {
    /// Wait for a condition to be true with timeout
    ///
    /// Notifications are delivered by background workers, so assertions on
    /// them have to poll.
    pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let start = std::time::Instant::now();

        while start.elapsed() < timeout {
            if condition().await {
                return true;
            }
            sleep(Duration::from_millis(20)).await;
        }

        condition().await
    }

    /// Generate unique test names based on timestamp
    pub fn unique_name(prefix: &str) -> String {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or(0);
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{}", prefix, timestamp, seq)
    }

    /// Generate test timestamps with offsets
    pub fn timestamp_with_offset(offset_seconds: i64) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(offset_seconds)
    }
}

/// Integration test setup helpers
pub struct IntegrationTestSetup;

impl IntegrationTestSetup {
    /// Set up logging for tests (call once per test binary)
    pub fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_for_success() {
        let mut counter = 0;
        let condition = || {
            counter += 1;
            let done = counter >= 3;
            async move { done }
        };

        let result = TestEnv::wait_for(condition, Duration::from_millis(500)).await;
        assert!(result);
    }

    #[tokio::test]
    async fn test_wait_for_timeout() {
        let condition = || async { false };
        let result = TestEnv::wait_for(condition, Duration::from_millis(100)).await;
        assert!(!result);
    }

    #[test]
    fn test_unique_name() {
        let name1 = TestEnv::unique_name("reg");
        let name2 = TestEnv::unique_name("reg");

        assert!(name1.starts_with("reg-"));
        assert_ne!(name1, name2);
    }
}
