//! Error types for the token layer.

/// Errors that can occur while producing a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The secure random source could not produce bytes.
    ///
    /// There is deliberately no fallback: a token built from a weaker
    /// source would look exactly like a good one, so the caller must
    /// abort whatever it was about to issue the token for.
    #[error("secure entropy source unavailable: {0}")]
    EntropyUnavailable(String),
}
