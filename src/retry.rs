use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::error::Error;

/// Fixed count retry with a fixed delay between attempts.
///
/// Shared by every collaborator that talks to the network so that cover
/// lookups, downloads and posts all behave the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Runs `op` until it succeeds, fails with an error `is_retryable` rejects,
    /// or the attempts are used up.
    ///
    /// # Arguments
    ///
    /// * `op` - Builds a fresh attempt each time it is called
    /// * `is_retryable` - Decides whether an error is worth another attempt
    ///
    /// # Errors
    ///
    /// The error of the last attempt, either because it was not retryable or
    /// because no attempts were left. [`RetryPolicy::delay`] is waited between
    /// attempts, never after the last one.
    ///
    /// # Example
    ///
    /// ```
    /// let policy = RetryPolicy::new(3, Duration::from_secs(5));
    /// let body = policy
    ///     .run(|| fetch(&client, &url), |e| !e.is_auth())
    ///     .await?;
    /// ```
    pub async fn run<T, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
        P: Fn(&Error) -> bool,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && is_retryable(&err) => {
                    attempt += 1;
                    sleep(self.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// [`RetryPolicy::run`] with [`Error::is_transient`] as predicate.
    pub async fn run_transient<T, F, Fut>(&self, op: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        self.run(op, Error::is_transient).await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(5))
    }
}
