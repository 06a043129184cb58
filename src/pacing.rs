//! Delays and bounded retries.
//!
//! All waiting in the crate goes through a [`Pacer`], so tests can swap
//! real sleeps for [`NoPause`].

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Strategy for waiting between requests.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits for (up to) the given duration.
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPause;

#[async_trait]
impl Pacer for NoPause {
    async fn pause(&self, _duration: Duration) {}
}

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Base delay between attempts.
    pub delay: Duration,
    /// Multiply the delay by the attempt number.
    pub linear: bool,
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(retries: u32, delay: Duration) -> Self {
        Self {
            retries,
            delay,
            linear: false,
        }
    }

    /// Delay grows with every failed attempt.
    pub fn linear(retries: u32, delay: Duration) -> Self {
        Self {
            retries,
            delay,
            linear: true,
        }
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay to wait after `attempt` (1-based) failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if self.linear {
            self.delay.saturating_mul(attempt)
        } else {
            self.delay
        }
    }
}

/// Outcome of [`retry_async`] after the last attempt.
#[derive(Debug)]
pub struct Retried<T, E> {
    /// Final result.
    pub result: Result<T, E>,
    /// Attempts made, including the first.
    pub attempts: u32,
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// policy's attempts are used up.
///
/// `op` receives the 1-based attempt number. The pacer is only consulted
/// between attempts, never after the last one.
pub async fn retry_async<T, E, F, Fut>(
    policy: RetryPolicy,
    pacer: &dyn Pacer,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Retried<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => {
                return Retried {
                    result: Ok(value),
                    attempts: attempt,
                };
            }
            Err(e) if attempt < max_attempts && is_transient(&e) => {
                pacer.pause(policy.delay_after(attempt)).await;
            }
            Err(e) => {
                return Retried {
                    result: Err(e),
                    attempts: attempt,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records pauses instead of sleeping.
    #[derive(Default)]
    struct RecordingPacer {
        pauses: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Pacer for RecordingPacer {
        async fn pause(&self, duration: Duration) {
            self.pauses.lock().unwrap().push(duration);
        }
    }

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
    }

    #[test]
    fn test_policy_delays() {
        let fixed = RetryPolicy::fixed(3, Duration::from_secs(2));
        assert_eq!(fixed.max_attempts(), 4);
        assert_eq!(fixed.delay_after(3), Duration::from_secs(2));

        let linear = RetryPolicy::linear(3, Duration::from_secs(2));
        assert_eq!(linear.delay_after(1), Duration::from_secs(2));
        assert_eq!(linear.delay_after(3), Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let pacer = RecordingPacer::default();
        let policy = RetryPolicy::linear(3, Duration::from_secs(1));

        let retried = retry_async(
            policy,
            &pacer,
            |e: &TestError| *e == TestError::Transient,
            |attempt| async move {
                if attempt < 3 {
                    Err(TestError::Transient)
                } else {
                    Ok(attempt)
                }
            },
        )
        .await;

        assert_eq!(retried.result, Ok(3));
        assert_eq!(retried.attempts, 3);
        assert_eq!(
            *pacer.pauses.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_exhausts_budget() {
        let pacer = RecordingPacer::default();
        let policy = RetryPolicy::fixed(2, Duration::from_secs(1));

        let retried: Retried<(), TestError> = retry_async(
            policy,
            &pacer,
            |e: &TestError| *e == TestError::Transient,
            |_| async { Err(TestError::Transient) },
        )
        .await;

        assert_eq!(retried.result, Err(TestError::Transient));
        assert_eq!(retried.attempts, 3);
        // no pause after the final attempt
        assert_eq!(pacer.pauses.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_immediately() {
        let retried: Retried<(), TestError> = retry_async(
            RetryPolicy::fixed(5, Duration::ZERO),
            &NoPause,
            |e: &TestError| *e == TestError::Transient,
            |_| async { Err(TestError::Fatal) },
        )
        .await;

        assert_eq!(retried.result, Err(TestError::Fatal));
        assert_eq!(retried.attempts, 1);
    }

    #[tokio::test]
    async fn test_zero_retries_means_one_attempt() {
        let retried: Retried<(), TestError> = retry_async(
            RetryPolicy::fixed(0, Duration::ZERO),
            &NoPause,
            |_: &TestError| true,
            |_| async { Err(TestError::Transient) },
        )
        .await;

        assert_eq!(retried.attempts, 1);
    }
}
