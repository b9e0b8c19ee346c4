//! Explicit retry policy for pipeline operations.
//!
//! The ingestion pipeline retries per persistence batch; the embedding phase
//! runs with [`RetryPolicy::none`]. Keeping the policy a value makes the two
//! phases tunable and testable independently.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// A bounded retry loop with a fixed pause between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (must be at least 1)
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with the given attempt count and pause.
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy that runs the operation exactly once.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Run `op` until it succeeds or `max_attempts` is exhausted.
    ///
    /// The last error is returned unchanged when all attempts fail.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max => {
                    warn!(
                        "attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, max, err, self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
