//! Retry policy with a fixed backoff schedule.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

/// Something that can wait. Production code sleeps on tokio; tests record.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How many times to try and how long to wait in between.
///
/// The number of attempts is always one more than the number of waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    /// Six attempts with waits of 1s, 2s, 4s, 8s and 16s.
    fn default() -> Self {
        Self::exponential(Duration::from_secs(1), 5)
    }
}

impl RetryPolicy {
    /// Doubling waits starting at `base`, no jitter.
    pub fn exponential(base: Duration, retries: u32) -> Self {
        let backoff = (0..retries).map(|i| base * 2u32.pow(i)).collect();
        Self { backoff }
    }

    pub fn from_schedule(backoff: Vec<Duration>) -> Self {
        Self { backoff }
    }

    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self { backoff: Vec::new() }
    }

    pub fn max_attempts(&self) -> usize {
        self.backoff.len() + 1
    }

    pub fn schedule(&self) -> &[Duration] {
        &self.backoff
    }

    /// Wait after the zero-based `attempt` failed, or `None` if it was the last.
    pub fn delay_after(&self, attempt: usize) -> Option<Duration> {
        self.backoff.get(attempt).copied()
    }

    /// Runs `op` until it succeeds or attempts run out, returning the last error.
    pub async fn run<T, E, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => match self.delay_after(attempt) {
                    Some(delay) => {
                        warn!(
                            attempt = attempt + 1,
                            max = self.max_attempts(),
                            delay_ms = delay.as_millis() as u64,
                            "attempt failed, retrying: {}",
                            err
                        );
                        sleeper.sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records requested waits without sleeping.
    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        pub(crate) waits: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub(crate) fn waits_ms(&self) -> Vec<u128> {
            self.waits
                .lock()
                .unwrap()
                .iter()
                .map(|d| d.as_millis())
                .collect()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        let ms: Vec<u128> = policy.schedule().iter().map(|d| d.as_millis()).collect();
        assert_eq!(ms, vec![1000, 2000, 4000, 8000, 16000]);
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.delay_after(4), Some(Duration::from_secs(16)));
        assert_eq!(policy.delay_after(5), None);
    }

    #[test]
    fn test_none_is_single_attempt() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay_after(0), None);
    }

    #[tokio::test]
    async fn test_run_exhausts_with_full_schedule() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::default();
        let mut calls = 0;

        let result: Result<(), String> = policy
            .run(&sleeper, |attempt| {
                calls += 1;
                async move { Err(format!("boom {}", attempt)) }
            })
            .await;

        assert_eq!(result, Err("boom 5".to_string()));
        assert_eq!(calls, 6);
        assert_eq!(sleeper.waits_ms(), vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[tokio::test]
    async fn test_run_stops_on_first_success() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::default();

        let result: Result<&str, String> = policy
            .run(&sleeper, |attempt| async move {
                if attempt < 2 {
                    Err("not yet".to_string())
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(sleeper.waits_ms(), vec![1000, 2000]);
    }
}
