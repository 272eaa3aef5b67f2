//! Unified error type for Tokenward.

use tokenward_session::SessionError;
use tokenward_token::TokenError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tokenward` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TokenwardError {
    /// A token-level error (entropy source unavailable).
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A session-level error (token generation failed, duplicate token).
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token_error() {
        let err = TokenError::EntropyUnavailable("gone".into());
        let tokenward_err: TokenwardError = err.into();
        assert!(matches!(tokenward_err, TokenwardError::Token(_)));
        assert!(tokenward_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::TokenGenerationFailed(TokenError::EntropyUnavailable(
            "drained".into(),
        ));
        let tokenward_err: TokenwardError = err.into();
        assert!(matches!(tokenward_err, TokenwardError::Session(_)));
        assert!(tokenward_err.to_string().contains("token generation failed"));
    }
}
