//! Bearer token generation for Tokenward.
//!
//! This is the leaf of the stack. It knows nothing about sessions, clocks,
//! or cookies; it only answers one question: "give me a string nobody can
//! guess".
//!
//! 1. **The token type** ([`SessionToken`]): a newtype over the encoded
//!    string, so a token can't be confused with an identity or any other
//!    `String` floating around a request handler.
//! 2. **The generator hook** ([`TokenGenerator`]): a trait, so the session
//!    store can be driven by a deterministic or deliberately failing
//!    generator in tests.
//! 3. **The real generator** ([`OsTokenGenerator`]): operating system
//!    randomness, URL-safe base64.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← asks for a fresh token on every login
//!     ↕
//! Token Layer (this crate)  ← turns OS entropy into an opaque string
//! ```

mod error;
mod generator;
mod token;

pub use error::TokenError;
pub use generator::{
    DEFAULT_TOKEN_BYTES, MIN_TOKEN_BYTES, OsTokenGenerator, TokenGenerator,
};
pub use token::SessionToken;
