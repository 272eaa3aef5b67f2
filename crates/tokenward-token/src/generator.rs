//! Token generators: where fresh session tokens come from.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::{SessionToken, TokenError};

/// Default number of random bytes per token (128 bits).
pub const DEFAULT_TOKEN_BYTES: usize = 16;

/// Floor on random bytes per token. Anything shorter is raised to this.
pub const MIN_TOKEN_BYTES: usize = 16;

/// Produces fresh, unguessable session tokens.
///
/// # Trait bounds
///
/// - `Send + Sync` → one generator is shared by every request handler,
///   possibly on different threads at once.
/// - `'static` → it lives as long as the session store that owns it.
///
/// Implementations must draw from a cryptographically secure source and
/// must fail with [`TokenError::EntropyUnavailable`] rather than fall back
/// to anything weaker.
pub trait TokenGenerator: Send + Sync + 'static {
    /// Returns a new token.
    fn generate(&self) -> Result<SessionToken, TokenError>;
}

/// The production generator: operating system randomness, URL-safe base64.
///
/// `OsRng` reads straight from the OS (`getrandom(2)` on Linux), so there
/// is no userspace PRNG state to seed, fork, or leak. The bytes are then
/// encoded with the URL-safe base64 alphabet and no padding, which makes
/// the token safe to drop into a cookie or a URL as-is. 16 bytes encode to
/// 22 characters.
#[derive(Debug, Clone)]
pub struct OsTokenGenerator {
    byte_length: usize,
}

impl OsTokenGenerator {
    /// Creates a generator producing `byte_length` random bytes per token.
    ///
    /// Requests below [`MIN_TOKEN_BYTES`] are raised to the minimum.
    pub fn new(byte_length: usize) -> Self {
        let byte_length = if byte_length < MIN_TOKEN_BYTES {
            tracing::warn!(
                requested = byte_length,
                min = MIN_TOKEN_BYTES,
                "token byte length below minimum; raising"
            );
            MIN_TOKEN_BYTES
        } else {
            byte_length
        };
        Self { byte_length }
    }

    /// Random bytes consumed per token.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }
}

impl Default for OsTokenGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BYTES)
    }
}

impl TokenGenerator for OsTokenGenerator {
    fn generate(&self) -> Result<SessionToken, TokenError> {
        let mut bytes = vec![0u8; self.byte_length];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::warn!(error = %e, "OS entropy source failed");
            TokenError::EntropyUnavailable(e.to_string())
        })?;
        Ok(SessionToken::new(URL_SAFE_NO_PAD.encode(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_length_is_22_chars() {
        let generator = OsTokenGenerator::default();

        let token = generator.generate().expect("OS entropy should be available");

        // ceil(16 * 4 / 3) with no padding.
        assert_eq!(token.len(), 22);
    }

    #[test]
    fn test_generate_uses_url_safe_alphabet() {
        let generator = OsTokenGenerator::default();

        for _ in 0..100 {
            let token = generator.generate().unwrap();
            assert!(
                token
                    .as_str()
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "token contains a non URL-safe character"
            );
        }
    }

    #[test]
    fn test_generate_decodes_back_to_requested_byte_count() {
        let generator = OsTokenGenerator::new(32);

        let token = generator.generate().unwrap();
        let raw = URL_SAFE_NO_PAD.decode(token.as_str()).unwrap();

        assert_eq!(raw.len(), 32);
    }

    #[test]
    fn test_new_below_minimum_is_raised() {
        let generator = OsTokenGenerator::new(4);

        assert_eq!(generator.byte_length(), MIN_TOKEN_BYTES);
    }

    #[test]
    fn test_generate_two_tokens_differ() {
        let generator = OsTokenGenerator::default();

        let a = generator.generate().unwrap();
        let b = generator.generate().unwrap();

        assert_ne!(a, b);
    }
}
