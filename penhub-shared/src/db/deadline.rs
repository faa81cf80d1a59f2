/// Per-request deadlines
///
/// Every store call made on behalf of a request runs under a [`Deadline`]:
/// an absolute instant plus an optional cancellation token tied to the
/// request. Whichever fires first aborts the work by dropping its future,
/// which also abandons any in-flight query.
///
/// # Example
///
/// ```
/// use penhub_shared::db::deadline::Deadline;
/// use std::time::Duration;
///
/// # async fn example() {
/// let deadline = Deadline::after(Duration::from_secs(30));
/// let answer = deadline.run(async { 42 }).await;
/// assert_eq!(answer.ok(), Some(42));
/// # }
/// ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeadlineError {
    #[error("Deadline exceeded")]
    Elapsed,

    #[error("Request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    cancel: Option<CancellationToken>,
}

impl Deadline {
    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            cancel: None,
        }
    }

    /// Also abort when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Drives `fut` to completion unless the deadline or cancellation wins
    ///
    /// # Errors
    ///
    /// `DeadlineError::Elapsed` when the instant passes first,
    /// `DeadlineError::Cancelled` when the token fires first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, DeadlineError>
    where
        F: Future,
    {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(DeadlineError::Cancelled),
                    res = tokio::time::timeout_at(self.at, fut) => {
                        res.map_err(|_| DeadlineError::Elapsed)
                    }
                }
            }
            None => tokio::time::timeout_at(self.at, fut)
                .await
                .map_err(|_| DeadlineError::Elapsed),
        }
    }
}
