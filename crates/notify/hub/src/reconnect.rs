//! Reconnect supervision for dropped connections.
//!
//! Walks a fixed backoff schedule, attempting to connect once per step
//! with a per-attempt timeout. The caller supplies the connect future
//! and a cancellation signal; success, cancellation, and exhaustion are
//! explicit outcomes, never a hang.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Default backoff schedule: immediate retry, then progressively delayed.
pub const DEFAULT_RECONNECT_DELAYS: [Duration; 4] = [
    Duration::ZERO,
    Duration::from_secs(2),
    Duration::from_secs(10),
    Duration::from_secs(30),
];

/// Reconnect schedule and per-attempt timeout.
#[derive(Clone, Debug)]
pub struct ReconnectPolicy {
    /// Wait before each attempt; one attempt per entry
    pub delays: Vec<Duration>,
    /// Cap on each individual connect attempt
    pub connect_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delays: DEFAULT_RECONNECT_DELAYS.to_vec(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// How a reconnect run ended.
#[derive(Debug)]
pub enum ReconnectOutcome<T> {
    /// An attempt succeeded; `attempts` includes the successful one.
    Connected { value: T, attempts: usize },
    /// The cancel signal fired before any attempt succeeded.
    Cancelled,
    /// Every scheduled attempt failed or timed out.
    Exhausted { attempts: usize },
}

impl<T> ReconnectOutcome<T> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Drives one reconnect schedule for one dropped connection.
pub struct ReconnectSupervisor {
    policy: ReconnectPolicy,
}

impl Default for ReconnectSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectSupervisor {
    pub fn new() -> Self {
        Self::with_policy(ReconnectPolicy::default())
    }

    pub fn with_policy(policy: ReconnectPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Walk the schedule until `connect` succeeds, `cancel` flips to
    /// true, or the schedule runs out. A dropped cancel handle counts
    /// as cancellation. The run stops at the first success; run it
    /// again on the next drop.
    pub async fn run<T, E, F, Fut>(
        &self,
        mut connect: F,
        mut cancel: watch::Receiver<bool>,
    ) -> ReconnectOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempts = 0;
        for delay in &self.policy.delays {
            if *cancel.borrow() {
                return ReconnectOutcome::Cancelled;
            }
            if !delay.is_zero() && !wait_or_cancel(*delay, &mut cancel).await {
                return ReconnectOutcome::Cancelled;
            }

            attempts += 1;
            match tokio::time::timeout(self.policy.connect_timeout, connect()).await {
                Ok(Ok(value)) => {
                    debug!(attempts, "reconnected");
                    return ReconnectOutcome::Connected { value, attempts };
                }
                Ok(Err(error)) => {
                    warn!(attempt = attempts, error = %error, "reconnect attempt failed");
                }
                Err(_) => {
                    warn!(attempt = attempts, "reconnect attempt timed out");
                }
            }
        }
        ReconnectOutcome::Exhausted { attempts }
    }
}

/// Sleep for `delay` unless cancellation arrives first. True when the
/// full delay elapsed.
async fn wait_or_cancel(delay: Duration, cancel: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    return false;
                }
            }
        }
    }
}
