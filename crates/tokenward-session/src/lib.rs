//! Server-side session management for Tokenward.
//!
//! This crate is the session lifecycle engine:
//!
//! 1. **Issuing**: binding a fresh token to an identity and an expiry
//!    deadline ([`SessionStore::create`])
//! 2. **Validating**: resolving a token from a cookie back to who it
//!    belongs to, if it's still live ([`SessionStore::lookup`])
//! 3. **Revoking**: logout ([`SessionStore::revoke`])
//! 4. **Reclaiming**: dropping expired records so memory doesn't grow
//!    forever ([`SessionStore::sweep`], optionally on a timer via
//!    [`spawn_sweeper`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Web layer (not part of Tokenward)  ← reads the cookie, renders the page
//!     ↕
//! Session Layer (this crate)  ← token → identity, with expiry
//!     ↕
//! Token Layer (below)  ← provides SessionToken, TokenGenerator
//! ```
//!
//! # Expiry is lazy
//!
//! Nothing actively expires a session at the moment its deadline passes.
//! Every read compares the deadline against the clock *at query time*, so
//! an expired record is invisible to [`SessionStore::lookup`] and
//! [`SessionStore::list_live`] even while it still physically sits in the
//! map. Sweeping only frees the memory.

mod clock;
mod config;
mod error;
mod session;
mod store;
mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MAX_TTL, SessionConfig};
pub use error::SessionError;
pub use session::{ActiveSession, Identity, LiveSession, SessionSnapshot};
pub use store::SessionStore;
pub use sweeper::{SweeperHandle, spawn_sweeper};

pub use tokenward_token::{OsTokenGenerator, SessionToken, TokenError, TokenGenerator};
