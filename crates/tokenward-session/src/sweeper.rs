//! Optional background sweeping.
//!
//! Expiry never depends on this task: [`SessionStore::lookup`] checks the
//! deadline itself. The sweeper only bounds how long dead records occupy
//! memory when nobody is calling [`SessionStore::sweep`] per request.
//!
//! The task sits in a `tokio::select!` loop between its timer and a
//! shutdown signal:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = ticker.tick() => { store.sweep(); }
//!         _ = shutdown_rx.changed() => break,
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokenward_token::TokenGenerator;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::{Clock, SessionStore};

/// Shortest allowed sweep period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Longest allowed sweep period. Keeps the first deadline representable.
const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Controls a running sweeper task.
///
/// Call [`shutdown`](Self::shutdown) to stop it and wait for it to finish.
/// Dropping the handle without shutting down aborts the task instead.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signals the task to stop and waits until it has.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "session sweeper ended abnormally");
            }
        }
    }

    /// Returns `true` once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Starts a task that calls `store.sweep()` every `interval`.
///
/// The first sweep happens one full `interval` after spawning. If the
/// runtime falls behind, missed ticks are skipped rather than replayed
/// back to back: one sweep catches up on everything anyway.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_sweeper<G, C>(store: Arc<SessionStore<G, C>>, interval: Duration) -> SweeperHandle
where
    G: TokenGenerator,
    C: Clock,
{
    let interval = if interval < MIN_INTERVAL {
        warn!(?interval, "sweep interval too short; using 1ms");
        MIN_INTERVAL
    } else if interval > MAX_INTERVAL {
        warn!(?interval, "sweep interval too long; using one year");
        MAX_INTERVAL
    } else {
        interval
    };

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        debug!(interval_ms, "session sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    if removed > 0 {
                        debug!(removed, "background sweep");
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }

        debug!("session sweeper stopped");
    });

    SweeperHandle {
        shutdown_tx,
        task: Some(task),
    }
}
