//! Wait primitive
//!
//! Suspends the calling test step until a key's entry is complete, then
//! yields the latest call. Completion wakes waiters through a `Notify`;
//! a bounded poll interval re-checks the store between wake-ups so a
//! missed or coalesced notification only costs one tick.

use crate::classifier::Category;
use crate::context::EngineShared;
use crate::result::{NetwaitError, NetwaitResult};
use crate::store::Call;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject zero or inverted settings
    pub fn validate(&self) -> NetwaitResult<()> {
        if self.timeout_ms == 0 || self.poll_interval_ms == 0 {
            return Err(NetwaitError::Config {
                message: "wait timeout and poll interval must be non-zero".to_string(),
            });
        }
        if self.poll_interval_ms > self.timeout_ms {
            return Err(NetwaitError::Config {
                message: format!(
                    "poll interval {}ms exceeds timeout {}ms",
                    self.poll_interval_ms, self.timeout_ms
                ),
            });
        }
        Ok(())
    }
}

/// Block until `key` in `category` is complete and return its latest call
///
/// `target` is the alias-annotated label used in the timeout message.
/// Fails with `WaitAbandoned` if the engine is reset while waiting.
pub(crate) async fn wait_for_call(
    shared: &EngineShared,
    category: Category,
    key: &str,
    target: &str,
    options: &WaitOptions,
) -> NetwaitResult<Call> {
    let start = Instant::now();
    let deadline = start + options.timeout();
    let generation = shared.generation();

    loop {
        let notified = shared.changed().notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        let found = shared.with_state(|state| {
            if state.generation != generation {
                return Err(NetwaitError::WaitAbandoned {
                    target: target.to_string(),
                });
            }
            Ok(state.store.latest_complete(category, key).cloned())
        })?;
        if let Some(call) = found {
            tracing::debug!(
                key,
                request_id = %call.id,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "wait satisfied"
            );
            return Ok(call);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(NetwaitError::Timeout {
                target: target.to_string(),
                ms: options.timeout_ms,
            });
        }
        let tick = options.poll_interval().min(deadline - now);
        tokio::select! {
            () = &mut notified => {}
            () = tokio::time::sleep(tick) => {}
        }
    }
}
