//! The session store: the authoritative map from token to session.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Issuing sessions after the web layer has checked credentials
//! - Resolving a cookie's token back to an identity on every request
//! - Revoking sessions on logout
//! - Sweeping expired records so memory doesn't grow without bound
//! - Producing a consistent listing of live sessions for diagnostics
//!
//! # Concurrency note
//!
//! Unlike a single-owner manager, `SessionStore` IS meant to be shared:
//! wrap it in an `Arc` once at startup and hand a clone to every request
//! handler. Internally a single `RwLock` guards the map:
//!
//! ```text
//!   create / revoke / sweep  → write lock (one at a time, nobody reading)
//!   lookup / list_live / len → read lock  (many at once)
//! ```
//!
//! Every operation is exactly one critical section, so a reader never sees
//! a half-inserted or half-removed record. The lock is `std::sync::RwLock`
//! rather than Tokio's: nothing here awaits while holding it, and each
//! section is a couple of hash map operations plus a clock read.
//!
//! If a thread panics while holding the lock, the lock is "poisoned". We
//! recover the guard anyway: every critical section leaves the map in a
//! consistent state (a single insert, remove, or `retain`), so there is no
//! half-finished update to be afraid of.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokenward_token::{OsTokenGenerator, SessionToken, TokenGenerator};

use crate::session::SessionRecord;
use crate::{
    ActiveSession, Clock, Identity, LiveSession, MAX_TTL, SessionConfig, SessionError,
    SessionSnapshot, SystemClock,
};

/// How many token characters go into log lines.
const LOG_TOKEN_CHARS: usize = 6;

/// Authoritative, thread-safe map from token to session.
///
/// ## Lifecycle of one token
///
/// ```text
///                 create()
///   [Unissued] ────────────→ [Active] ──(time passes expires_at)──→ [Expired]
///                               │                                       │
///                               └──(revoke)──→ [Revoked]                │
///                                                 │                     │
///                                                 ▼                     ▼
///                                      lookup() → None        lookup() → None
///                                                              sweep() removes
/// ```
///
/// Expired and Revoked look the same from outside. Both `revoke` and
/// `sweep` only ever remove records, so neither can bring a dead token
/// back.
///
/// ## Type parameters
///
/// The generator `G` and the clock `C` are generic with production
/// defaults, so `SessionStore` on its own means "OS randomness, wall
/// clock". Tests swap in a [`ManualClock`](crate::ManualClock) to move
/// time without sleeping.
pub struct SessionStore<G = OsTokenGenerator, C = SystemClock> {
    /// Every session not yet revoked or swept, keyed by token.
    ///
    /// May contain expired records between sweeps. Reads filter them.
    sessions: RwLock<HashMap<SessionToken, SessionRecord>>,

    /// Where fresh tokens come from.
    generator: G,

    /// Where "now" comes from.
    clock: C,

    config: SessionConfig,
}

impl SessionStore {
    /// Creates an empty store with OS randomness and the wall clock.
    ///
    /// The config is validated first (see [`SessionConfig::validated`]).
    pub fn new(config: SessionConfig) -> Self {
        let config = config.validated();
        let generator = OsTokenGenerator::new(config.token_byte_length);
        Self::with_parts(config, generator, SystemClock)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<G: TokenGenerator, C: Clock> SessionStore<G, C> {
    /// Creates an empty store from explicit parts.
    ///
    /// `config.token_byte_length` is NOT applied to `generator`; whoever
    /// built the generator already chose its length.
    pub fn with_parts(config: SessionConfig, generator: G, clock: C) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            generator,
            clock,
            config: config.validated(),
        }
    }

    /// The (validated) configuration this store runs with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The store's clock. Handy for callers that want "now" on the same
    /// timeline the store uses for expiry.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Issues a new session for `identity`, valid for `ttl`.
    ///
    /// The returned token is immediately valid for [`lookup`](Self::lookup)
    /// until `ttl` elapses. A zero `ttl` issues a session that is already
    /// expired. A `ttl` longer than [`MAX_TTL`] is capped.
    ///
    /// # Errors
    /// - [`SessionError::TokenGenerationFailed`]: the generator failed.
    ///   Nothing is inserted and nothing is retried.
    /// - [`SessionError::DuplicateToken`]: the generator returned a token
    ///   that is already in the map. The existing session is untouched.
    pub fn create(
        &self,
        identity: impl Into<Identity>,
        ttl: Duration,
    ) -> Result<SessionToken, SessionError> {
        let identity = identity.into();

        // Entropy first, outside the lock. If the OS source is slow or
        // broken, only this login pays for it.
        let token = self.generator.generate()?;

        let ttl = ttl.min(MAX_TTL);
        let created_at = self.clock.now();
        let record = SessionRecord {
            token: token.clone(),
            identity,
            created_at,
            expires_at: created_at + ttl,
        };

        let mut sessions = self.write();
        match sessions.entry(token.clone()) {
            Entry::Occupied(_) => {
                tracing::error!(
                    token = %token.truncated(LOG_TOKEN_CHARS),
                    "generated token already bound to a session"
                );
                Err(SessionError::DuplicateToken)
            }
            Entry::Vacant(slot) => {
                let record = slot.insert(record);
                tracing::info!(
                    identity = %record.identity,
                    token = %token.truncated(LOG_TOKEN_CHARS),
                    ttl_secs = ttl.as_secs(),
                    "session created"
                );
                Ok(token)
            }
        }
    }

    /// Issues a new session with the configured default TTL.
    pub fn create_default(
        &self,
        identity: impl Into<Identity>,
    ) -> Result<SessionToken, SessionError> {
        self.create(identity, self.config.default_ttl())
    }

    /// Resolves a token to its identity and remaining lifetime.
    ///
    /// Returns `None` if the token is unknown, revoked, or expired (its
    /// deadline is not strictly after now). This is a pure read: an
    /// expired record found here is left for [`sweep`](Self::sweep) to
    /// remove, so the cost of a lookup never depends on how much garbage
    /// is lying around.
    pub fn lookup(&self, token: impl AsRef<str>) -> Option<ActiveSession> {
        let sessions = self.read();
        let record = sessions.get(token.as_ref())?;
        let remaining = record.remaining_at(self.clock.now())?;
        Some(ActiveSession {
            identity: record.identity.clone(),
            remaining,
        })
    }

    /// Removes the session for `token`, if there is one.
    ///
    /// Idempotent: revoking an unknown, expired, or already revoked token
    /// is a no-op, not an error. Returns `true` if a record was physically
    /// removed, which callers are free to ignore.
    pub fn revoke(&self, token: impl AsRef<str>) -> bool {
        let removed = self.write().remove(token.as_ref());
        match &removed {
            Some(record) => tracing::info!(
                identity = %record.identity,
                token = %record.token.truncated(LOG_TOKEN_CHARS),
                "session revoked"
            ),
            None => tracing::debug!("revoke for unknown token ignored"),
        }
        removed.is_some()
    }

    /// Removes every record whose deadline is not strictly after now.
    ///
    /// Returns how many were removed. Live records are never touched.
    /// Safe to call at any time from any thread; the web layer calls it
    /// once per request, and [`spawn_sweeper`](crate::spawn_sweeper) can
    /// call it on a timer.
    pub fn sweep(&self) -> usize {
        let mut sessions = self.write();
        let now = self.clock.now();
        let before = sessions.len();

        // `retain` keeps only entries where the closure returns `true`.
        sessions.retain(|_, record| record.is_live_at(now));

        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = sessions.len(), "swept expired sessions");
        }
        removed
    }

    /// A point-in-time listing of every live session.
    ///
    /// Taken under one read lock against one `now`, so the rows are
    /// mutually consistent. Expired-but-unswept records are left out.
    pub fn list_live(&self) -> SessionSnapshot {
        let sessions = self.read();
        let now = self.clock.now();

        let live = sessions
            .values()
            .filter_map(|record| {
                record.remaining_at(now).map(|remaining| LiveSession {
                    token: record.token.clone(),
                    identity: record.identity.clone(),
                    created_at: record.created_at,
                    expires_at: record.expires_at,
                    remaining,
                })
            })
            .collect();

        SessionSnapshot::new(now, live)
    }

    /// Number of records physically held, including expired ones that
    /// haven't been swept yet.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no records are held at all.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionToken, SessionRecord>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionToken, SessionRecord>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// =========================================================================
// Tests
// =========================================================================
