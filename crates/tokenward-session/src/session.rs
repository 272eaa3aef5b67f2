//! Session types: what the store keeps, and what it hands back.
//!
//! - `SessionRecord`: the server's private record of one login.
//! - [`ActiveSession`]: what a per-request lookup returns.
//! - [`LiveSession`] / [`SessionSnapshot`]: the diagnostic listing.

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tokenward_token::SessionToken;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The authenticated principal's display name.
///
/// Another newtype: a session is bound to an `Identity`, keyed by a
/// `SessionToken`, and both are strings underneath. Keeping them as
/// distinct types means the compiler catches a swapped argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Uses `pad`, so width and alignment flags (`{:<10}`) work in tables.
impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for Identity {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identity {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// One authenticated session, as the store keeps it.
///
/// Every field is fixed at creation. There is no renewal: a session lives
/// exactly `expires_at - created_at` and then it's gone. Records never
/// leave the crate; callers see [`ActiveSession`] and [`LiveSession`].
#[derive(Debug, Clone)]
pub(crate) struct SessionRecord {
    pub(crate) token: SessionToken,
    pub(crate) identity: Identity,
    pub(crate) created_at: SystemTime,
    pub(crate) expires_at: SystemTime,
}

impl SessionRecord {
    /// Returns `true` if the deadline is strictly after `now`.
    ///
    /// "Strictly" matters: a session queried at exactly its deadline is
    /// already expired. A TTL of 300 seconds means usable at t+299.999,
    /// not at t+300.
    pub(crate) fn is_live_at(&self, now: SystemTime) -> bool {
        self.expires_at > now
    }

    /// Time left at `now`, or `None` if the record is no longer live.
    pub(crate) fn remaining_at(&self, now: SystemTime) -> Option<Duration> {
        match self.expires_at.duration_since(now) {
            Ok(left) if !left.is_zero() => Some(left),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ActiveSession
// ---------------------------------------------------------------------------

/// A successful [`lookup`](crate::SessionStore::lookup): who the token
/// belongs to and how long it has left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSession {
    pub identity: Identity,
    pub remaining: Duration,
}

impl ActiveSession {
    /// Whole seconds remaining, rounded down.
    pub fn expires_in_secs(&self) -> u64 {
        self.remaining.as_secs()
    }
}

// ---------------------------------------------------------------------------
// LiveSession / SessionSnapshot
// ---------------------------------------------------------------------------

/// One row of a [`SessionSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveSession {
    pub token: SessionToken,
    pub identity: Identity,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
    /// Time left as of the snapshot's `taken_at`, not as of "now".
    pub remaining: Duration,
}

impl LiveSession {
    /// Whole seconds remaining at snapshot time, rounded down.
    pub fn expires_in_secs(&self) -> u64 {
        self.remaining.as_secs()
    }
}

/// Every live session at one instant.
///
/// The snapshot is owned data, copied out under a single read lock. That
/// gives it three useful properties:
/// - **Consistent**: every row was evaluated against the same `taken_at`,
///   so nothing can show up both "listed" and "expired".
/// - **Finite**: it doesn't track later logins or logouts.
/// - **Restartable**: [`iter`](Self::iter) can be called as often as you
///   like; rendering a table twice gives the same table.
///
/// Rows are ordered oldest login first (ties broken by token), so repeated
/// listings come out in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    taken_at: SystemTime,
    sessions: Vec<LiveSession>,
}

impl SessionSnapshot {
    pub(crate) fn new(taken_at: SystemTime, mut sessions: Vec<LiveSession>) -> Self {
        sessions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.token.cmp(&b.token))
        });
        Self { taken_at, sessions }
    }

    /// The instant every `remaining` in this snapshot was computed against.
    pub fn taken_at(&self) -> SystemTime {
        self.taken_at
    }

    /// Iterates the rows. Can be called any number of times.
    pub fn iter(&self) -> std::slice::Iter<'_, LiveSession> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl IntoIterator for SessionSnapshot {
    type Item = LiveSession;
    type IntoIter = std::vec::IntoIter<LiveSession>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.into_iter()
    }
}

impl<'a> IntoIterator for &'a SessionSnapshot {
    type Item = &'a LiveSession;
    type IntoIter = std::slice::Iter<'a, LiveSession>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn record(ttl_secs: u64) -> SessionRecord {
        let created_at = UNIX_EPOCH + Duration::from_secs(1_000);
        SessionRecord {
            token: SessionToken::new("tok"),
            identity: Identity::new("alice"),
            created_at,
            expires_at: created_at + Duration::from_secs(ttl_secs),
        }
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_is_live_at_before_deadline_true() {
        assert!(record(300).is_live_at(at(1_299)));
    }

    #[test]
    fn test_is_live_at_exact_deadline_false() {
        assert!(!record(300).is_live_at(at(1_300)));
    }

    #[test]
    fn test_remaining_at_creation_is_full_ttl() {
        assert_eq!(
            record(300).remaining_at(at(1_000)),
            Some(Duration::from_secs(300))
        );
    }

    #[test]
    fn test_remaining_at_deadline_is_none() {
        assert_eq!(record(300).remaining_at(at(1_300)), None);
        assert_eq!(record(300).remaining_at(at(5_000)), None);
    }

    #[test]
    fn test_zero_ttl_record_is_never_live() {
        let r = record(0);
        assert!(!r.is_live_at(r.created_at));
        assert_eq!(r.remaining_at(r.created_at), None);
    }

    #[test]
    fn test_expires_in_secs_rounds_down() {
        let active = ActiveSession {
            identity: Identity::new("alice"),
            remaining: Duration::from_millis(299_999),
        };
        assert_eq!(active.expires_in_secs(), 299);
    }

    #[test]
    fn test_identity_compares_with_str() {
        let identity = Identity::from("bob");
        assert_eq!(identity, "bob");
        assert_eq!(identity.to_string(), "bob");
        assert_eq!(format!("[{identity:<5}]"), "[bob  ]");
    }

    #[test]
    fn test_snapshot_orders_by_creation_then_token() {
        let row = |token: &str, created: u64| LiveSession {
            token: SessionToken::new(token),
            identity: Identity::new(token),
            created_at: at(created),
            expires_at: at(created + 300),
            remaining: Duration::from_secs(300),
        };

        let snapshot = SessionSnapshot::new(
            at(0),
            vec![row("c", 20), row("b", 10), row("a", 20)],
        );

        let order: Vec<&str> = snapshot.iter().map(|s| s.token.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_snapshot_iter_is_restartable() {
        let snapshot = SessionSnapshot::new(at(0), Vec::new());
        assert_eq!(snapshot.iter().count(), 0);
        assert_eq!(snapshot.iter().count(), 0);
        assert!(snapshot.is_empty());
    }
}
