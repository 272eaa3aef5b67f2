//! Time sources for expiry arithmetic.
//!
//! The store never calls `SystemTime::now()` directly. It asks a [`Clock`],
//! which lets tests (and the demo) move time forward by five minutes in a
//! single call instead of sleeping for five minutes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of "now".
pub trait Clock: Send + Sync + 'static {
    /// The current time.
    fn now(&self) -> SystemTime;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
///
/// Stores milliseconds since the Unix epoch in an atomic, so it can be
/// shared between a store and a test through an `Arc` and advanced from
/// any thread without a lock.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    /// An arbitrary fixed starting point: 2023-11-14T22:13:20Z.
    pub const DEFAULT_START_SECS: u64 = 1_700_000_000;

    /// Creates a clock frozen at `start`.
    ///
    /// Times before the epoch are clamped to the epoch.
    pub fn new(start: SystemTime) -> Self {
        Self {
            millis: AtomicU64::new(to_millis(start)),
        }
    }

    /// Creates a clock frozen `secs` seconds after the Unix epoch.
    pub fn at_epoch_secs(secs: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Moves the clock forward by `by`. Saturates instead of wrapping, so
    /// the clock never runs backwards.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let _ = self
            .millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by))
            });
    }

    /// Jumps the clock to `to`. May move backwards.
    pub fn set(&self, to: SystemTime) {
        self.millis.store(to_millis(to), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_epoch_secs(Self::DEFAULT_START_SECS)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Sharing a clock between the store and whoever drives it.
impl<C: Clock> Clock for Arc<C> {
    fn now(&self) -> SystemTime {
        (**self).now()
    }
}

fn to_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
