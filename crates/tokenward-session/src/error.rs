//! Error types for the session layer.

use tokenward_token::TokenError;

/// Errors that can occur during session management.
///
/// Only issuing a session can fail. An unknown, expired, or revoked token
/// is NOT an error: unauthenticated requests are the common case, so
/// [`lookup`](crate::SessionStore::lookup) reports absence as `None`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token generator couldn't produce a token.
    ///
    /// The login attempt must be rejected. The store never retries: an
    /// exhausted or broken entropy source won't fix itself on the second
    /// call, and a retry loop would only hide the fault.
    #[error("token generation failed: {0}")]
    TokenGenerationFailed(#[from] TokenError),

    /// The freshly generated token is already bound to a session.
    ///
    /// With 128+ bits of entropy this never happens unless the generator
    /// is broken. The existing session is left untouched.
    #[error("generated token collides with an existing session")]
    DuplicateToken,
}
