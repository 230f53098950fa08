//! Retrying actions that fail only because they ran too early

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts in total, the first one included
    pub max_attempts: u32,
    /// Wait between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

/// Run `op` until it succeeds, fails with an error `is_retryable` rejects,
/// or `policy.max_attempts` is reached
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded after {} attempts", attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt, policy.max_attempts, e, policy.backoff
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Early,
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn early(e: &TestError) -> bool {
        matches!(e, TestError::Early)
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(5, Duration::from_secs(10));
        let started = tokio::time::Instant::now();

        let result = retry(&policy, early, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TestError::Early)
            } else {
                Ok("paid")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "paid");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(3, Duration::from_secs(1));

        let result: Result<(), _> = retry(&policy, early, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Early)
        })
        .await;

        assert!(matches!(result, Err(TestError::Early)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = retry(&RetryPolicy::default(), early, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Fatal)
        })
        .await;

        assert!(matches!(result, Err(TestError::Fatal)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
