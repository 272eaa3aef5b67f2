//! The token type handed to clients as a cookie value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How many characters of a token are shown in `Debug` output.
const DEBUG_PREFIX_CHARS: usize = 6;

/// An opaque bearer token.
///
/// This is the same "newtype wrapper" trick used for IDs elsewhere: the
/// value is just a `String`, but wrapping it means a function signature
/// like `fn revoke(token: &SessionToken)` can't be handed an identity by
/// mistake.
///
/// The token IS the secret. Anyone holding it is logged in as whoever it
/// was issued to, so:
/// - `Debug` only shows a short prefix, which keeps full tokens out of
///   `tracing` output and panic messages.
/// - `Display` is not implemented. Getting the full value takes an
///   explicit [`as_str`](Self::as_str), which is easy to spot in review.
///
/// `#[serde(transparent)]` serializes it as the bare string, which is what
/// a cookie value or a JSON field wants.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps an already-encoded token string.
    ///
    /// Used by generators, and by request handlers turning a cookie value
    /// back into something the store can look up.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The full token value. Handle with care: this is the secret.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length of the encoded token in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Returns `true` if the token is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A display-safe prefix: the first `chars` characters followed by
    /// `...`, or the whole token if it's already that short.
    ///
    /// Meant for diagnostic tables ("which sessions are live?") where
    /// showing the full secret would defeat the point of having one.
    pub fn truncated(&self, chars: usize) -> String {
        match self.0.char_indices().nth(chars) {
            Some((cut, _)) => format!("{}...", &self.0[..cut]),
            None => self.0.clone(),
        }
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self.truncated(DEBUG_PREFIX_CHARS))
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lets a `HashMap<SessionToken, _>` be queried with a plain `&str`
/// straight from a cookie, without allocating a `SessionToken` first.
impl std::borrow::Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}
