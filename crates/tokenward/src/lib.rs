//! # Tokenward
//!
//! Server-side session management behind an opaque cookie token.
//!
//! A web layer checks credentials however it likes, then hands the
//! identity to Tokenward. Tokenward issues an unguessable token, remembers
//! who it belongs to and when it dies, answers "who is this?" on every
//! later request, and forgets the session on logout or expiry.
//!
//! ## Quick Start
//!
//! ```rust
//! use tokenward::prelude::*;
//!
//! let service = SessionService::builder().default_ttl_secs(300).build();
//!
//! // POST /login, after the password check:
//! let token = service.login("alice")?;
//! // ...set `token.as_str()` as the cookie value with max-age = 300.
//!
//! // GET /, with the cookie:
//! let view = service.handle_request(Some(token.as_str()));
//! assert_eq!(view.session.unwrap().identity, "alice");
//!
//! // POST /logout:
//! service.logout(Some(token.as_str()));
//! assert!(service.handle_request(Some(token.as_str())).session.is_none());
//! # Ok::<(), tokenward::TokenwardError>(())
//! ```

mod error;
mod service;
pub mod telemetry;

pub use error::TokenwardError;
pub use service::{RequestView, SessionService, SessionServiceBuilder};

pub use tokenward_session as session;
pub use tokenward_token as token;

pub mod prelude {
    pub use crate::{RequestView, SessionService, TokenwardError};
    pub use tokenward_session::{
        ActiveSession, Clock, Identity, LiveSession, ManualClock, SessionConfig, SessionSnapshot,
        SessionStore, SystemClock,
    };
    pub use tokenward_token::{OsTokenGenerator, SessionToken, TokenGenerator};
}
