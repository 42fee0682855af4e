/*!

The `wait` module provides the bounded wait used whenever bootstrap depends on something that
another actor creates asynchronously: the credentials secret issued by the cloud credential
operator, or the cluster VPC becoming visible through freshly issued AWS credentials.

!*/

use log::debug;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// `tokio::time::interval` panics on a zero period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How long to keep trying and how long to pause between attempts.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// The reasons a bounded wait can end without a result.
#[derive(Debug)]
pub enum WaitError<E> {
    /// The timeout elapsed before an attempt succeeded.
    Timeout {
        elapsed: Duration,
        attempts: u32,
        /// The most recent retryable failure, if there was one.
        last_error: Option<String>,
    },
    /// The cancellation token fired before an attempt succeeded.
    Cancelled { elapsed: Duration, attempts: u32 },
    /// An attempt failed with an error that is not worth retrying.
    Aborted { attempts: u32, source: E },
}

impl<E> WaitError<E> {
    /// Cancellation is reported to callers the same way as running out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. } | WaitError::Cancelled { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            WaitError::Timeout { attempts, .. }
            | WaitError::Cancelled { attempts, .. }
            | WaitError::Aborted { attempts, .. } => *attempts,
        }
    }
}

impl<E> Display for WaitError<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitError::Timeout {
                elapsed,
                attempts,
                last_error: None,
            } => write!(f, "timed out after {:?} ({} attempts)", elapsed, attempts),
            WaitError::Timeout {
                elapsed,
                attempts,
                last_error: Some(last_error),
            } => write!(
                f,
                "timed out after {:?} ({} attempts), last error: {}",
                elapsed, attempts, last_error
            ),
            WaitError::Cancelled { elapsed, attempts } => {
                write!(f, "cancelled after {:?} ({} attempts)", elapsed, attempts)
            }
            WaitError::Aborted { attempts, source } => {
                write!(f, "attempt {} failed: {}", attempts, source)
            }
        }
    }
}

impl<E> std::error::Error for WaitError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WaitError::Aborted { source, .. } => Some(source),
            WaitError::Timeout { .. } | WaitError::Cancelled { .. } => None,
        }
    }
}

/// Call `operation` once per `policy.poll_interval` until it succeeds, fails with an error that
/// `is_retryable` rejects, `policy.timeout` elapses, or `cancel` fires. The first attempt is made
/// one poll interval after the wait starts. An attempt in flight when the timeout elapses or the
/// token is cancelled is dropped.
pub async fn wait_until<T, E, F, Fut, R>(
    what: &str,
    policy: WaitPolicy,
    cancel: &CancellationToken,
    is_retryable: R,
    mut operation: F,
) -> Result<T, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let start = Instant::now();
    let poll_interval = policy.poll_interval.max(MIN_POLL_INTERVAL);
    let deadline = tokio::time::sleep(policy.timeout);
    tokio::pin!(deadline);
    let mut ticker = tokio::time::interval_at(start + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempts = 0;
    let mut last_error = None;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(WaitError::Cancelled { elapsed: start.elapsed(), attempts });
            }
            _ = &mut deadline => {
                return Err(WaitError::Timeout { elapsed: start.elapsed(), attempts, last_error });
            }
            _ = ticker.tick() => {}
        }

        attempts += 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(WaitError::Cancelled { elapsed: start.elapsed(), attempts });
            }
            _ = &mut deadline => {
                return Err(WaitError::Timeout { elapsed: start.elapsed(), attempts, last_error });
            }
            outcome = operation() => outcome,
        };

        match outcome {
            Ok(value) => {
                debug!("{} ready after {} attempts", what, attempts);
                return Ok(value);
            }
            Err(e) if is_retryable(&e) => {
                debug!("{} not ready (attempt {}): {}", what, attempts, e);
                last_error = Some(e.to_string());
            }
            Err(e) => return Err(WaitError::Aborted { attempts, source: e }),
        }
    }
}
