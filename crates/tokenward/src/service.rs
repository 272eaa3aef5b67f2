//! `SessionService` builder and the request-shaped entry points.
//!
//! This is what a web layer holds on to. It ties together the store, the
//! configuration, and the optional background sweeper, and offers the
//! three calls a login page actually makes: log in, render a request,
//! log out.

use std::sync::Arc;

use serde::Serialize;
use tokenward_session::{
    ActiveSession, Clock, Identity, SessionConfig, SessionSnapshot, SessionStore, SweeperHandle,
    SystemClock, spawn_sweeper,
};
use tokenward_token::{OsTokenGenerator, SessionToken, TokenGenerator};

use crate::TokenwardError;

/// Everything a page needs to render one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestView {
    /// The caller's session, or `None` for an anonymous visitor.
    pub session: Option<ActiveSession>,

    /// Every live session, for a diagnostic table.
    pub live: SessionSnapshot,
}

impl RequestView {
    /// Returns `true` if the request carried a live session token.
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }
}

/// Builder for configuring and starting a [`SessionService`].
///
/// # Example
///
/// ```rust
/// use tokenward::SessionService;
///
/// let service = SessionService::builder()
///     .default_ttl_secs(600)
///     .token_byte_length(32)
///     .build();
/// assert_eq!(service.cookie_max_age_secs(), 600);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionServiceBuilder {
    config: SessionConfig,
}

impl SessionServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration, e.g. one deserialized from a file.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how long new sessions stay valid.
    pub fn default_ttl_secs(mut self, secs: u64) -> Self {
        self.config.default_ttl_secs = secs;
        self
    }

    /// Sets how many random bytes go into each token.
    pub fn token_byte_length(mut self, bytes: usize) -> Self {
        self.config.token_byte_length = bytes;
        self
    }

    /// Enables a background sweep every `secs` seconds.
    pub fn sweep_interval_secs(mut self, secs: u64) -> Self {
        self.config.sweep_interval_secs = Some(secs);
        self
    }

    /// Builds the service with OS randomness and the wall clock.
    ///
    /// If a sweep interval is configured and this is called inside a
    /// Tokio runtime, the background sweeper starts immediately.
    /// Outside a runtime the sweeper is skipped with a warning; lookups
    /// still enforce expiry on their own.
    pub fn build(self) -> SessionService {
        let store = SessionStore::new(self.config);
        SessionService::start(store)
    }

    /// Builds the service around a custom generator and clock.
    ///
    /// `make_generator` receives the validated token byte length, so the
    /// configured length and the issued tokens cannot disagree:
    ///
    /// ```rust
    /// use tokenward::prelude::*;
    ///
    /// let service = SessionService::builder()
    ///     .token_byte_length(32)
    ///     .build_with(OsTokenGenerator::new, SystemClock);
    /// assert_eq!(service.login("alice").unwrap().len(), 43);
    /// ```
    pub fn build_with<G, C, F>(self, make_generator: F, clock: C) -> SessionService<G, C>
    where
        G: TokenGenerator,
        C: Clock,
        F: FnOnce(usize) -> G,
    {
        let config = self.config.validated();
        let generator = make_generator(config.token_byte_length);
        let store = SessionStore::with_parts(config, generator, clock);
        SessionService::start(store)
    }
}

/// A running session service.
///
/// Cheap to share: request handlers take [`store`](Self::store) clones,
/// or share the service itself behind an `Arc`.
pub struct SessionService<G = OsTokenGenerator, C = SystemClock> {
    store: Arc<SessionStore<G, C>>,
    sweeper: Option<SweeperHandle>,
}

impl SessionService {
    /// Creates a new builder.
    pub fn builder() -> SessionServiceBuilder {
        SessionServiceBuilder::new()
    }
}

impl<G, C> SessionService<G, C>
where
    G: TokenGenerator,
    C: Clock,
{
    fn start(store: SessionStore<G, C>) -> Self {
        let store = Arc::new(store);

        let sweeper = store.config().sweep_interval().and_then(|interval| {
            match tokio::runtime::Handle::try_current() {
                Ok(_) => Some(spawn_sweeper(Arc::clone(&store), interval)),
                Err(_) => {
                    tracing::warn!(
                        "sweep interval configured outside a Tokio runtime; background sweeper not started"
                    );
                    None
                }
            }
        });

        tracing::info!(
            default_ttl_secs = store.config().default_ttl_secs,
            token_byte_length = store.config().token_byte_length,
            background_sweep = sweeper.is_some(),
            "session service ready"
        );

        Self { store, sweeper }
    }

    /// A shared handle to the underlying store.
    pub fn store(&self) -> Arc<SessionStore<G, C>> {
        Arc::clone(&self.store)
    }

    /// The `max-age` to put on the session cookie.
    pub fn cookie_max_age_secs(&self) -> u64 {
        self.store.config().default_ttl_secs
    }

    /// Returns `true` if a background sweeper is running.
    pub fn has_background_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }

    /// Issues a session for an identity whose credentials the caller has
    /// already verified. Uses the configured default TTL.
    ///
    /// # Errors
    /// Fails only if a token couldn't be generated. The login attempt must
    /// then be rejected; no degraded token is ever issued.
    pub fn login(&self, identity: impl Into<Identity>) -> Result<SessionToken, TokenwardError> {
        Ok(self.store.create_default(identity)?)
    }

    /// Resolves one incoming request.
    ///
    /// `cookie` is the session cookie's value, or `None` if the request
    /// had none. In order:
    /// 1. sweep expired records, so the listing and memory stay tidy;
    /// 2. look up the caller's token;
    /// 3. snapshot every live session.
    pub fn handle_request(&self, cookie: Option<&str>) -> RequestView {
        self.store.sweep();
        let session = cookie.and_then(|token| self.store.lookup(token));
        let live = self.store.list_live();
        RequestView { session, live }
    }

    /// Ends the caller's session, if the request carried one.
    ///
    /// Returns `true` if a session was actually removed. Whether or not it
    /// was, the caller should tell the client to delete its cookie.
    pub fn logout(&self, cookie: Option<&str>) -> bool {
        cookie.is_some_and(|token| self.store.revoke(token))
    }

    /// Stops the background sweeper, if any, and waits for it.
    pub async fn shutdown(mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.shutdown().await;
        }
        tracing::info!("session service stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokenward_session::ManualClock;
    use tokenward_token::TokenError;

    use super::*;

    struct NoEntropy;

    impl TokenGenerator for NoEntropy {
        fn generate(&self) -> Result<SessionToken, TokenError> {
            Err(TokenError::EntropyUnavailable("unplugged".into()))
        }
    }

    fn service_on(clock: Arc<ManualClock>) -> SessionService<OsTokenGenerator, Arc<ManualClock>> {
        SessionService::builder().build_with(OsTokenGenerator::new, clock)
    }

    #[test]
    fn test_builder_applies_settings() {
        let service = SessionService::builder()
            .default_ttl_secs(42)
            .token_byte_length(24)
            .build();

        let config = service.store().config().clone();
        assert_eq!(config.default_ttl_secs, 42);
        assert_eq!(config.token_byte_length, 24);
        assert_eq!(service.cookie_max_age_secs(), 42);
    }

    #[test]
    fn test_build_with_applies_token_byte_length_to_generator() {
        use base64::Engine as _;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let service = SessionService::builder()
            .token_byte_length(32)
            .build_with(OsTokenGenerator::new, Arc::new(ManualClock::default()));

        let token = service.login("alice").unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(token.as_str()).unwrap();

        assert_eq!(service.store().config().token_byte_length, 32);
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn test_build_with_passes_validated_length_to_factory() {
        let seen = std::sync::Mutex::new(None);

        let _service = SessionService::builder()
            .token_byte_length(4)
            .build_with(
                |bytes| {
                    *seen.lock().unwrap() = Some(bytes);
                    OsTokenGenerator::new(bytes)
                },
                Arc::new(ManualClock::default()),
            );

        assert_eq!(*seen.lock().unwrap(), Some(16));
    }

    #[test]
    fn test_build_outside_runtime_skips_sweeper() {
        let service = SessionService::builder().sweep_interval_secs(1).build();

        assert!(!service.has_background_sweeper());
    }

    #[test]
    fn test_handle_request_without_cookie_is_anonymous() {
        let service = service_on(Arc::new(ManualClock::default()));
        service.login("alice").unwrap();

        let view = service.handle_request(None);

        assert!(!view.is_logged_in());
        assert_eq!(view.live.len(), 1);
    }

    #[test]
    fn test_handle_request_with_cookie_resolves_identity() {
        let service = service_on(Arc::new(ManualClock::default()));
        let token = service.login("alice").unwrap();

        let view = service.handle_request(Some(token.as_str()));

        let session = view.session.expect("logged in");
        assert_eq!(session.identity, "alice");
        assert_eq!(session.expires_in_secs(), 300);
    }

    #[test]
    fn test_handle_request_sweeps_expired() {
        let clock = Arc::new(ManualClock::default());
        let service = service_on(Arc::clone(&clock));
        let token = service.login("alice").unwrap();
        clock.advance(Duration::from_secs(300));

        let view = service.handle_request(Some(token.as_str()));

        assert!(!view.is_logged_in());
        assert!(view.live.is_empty());
        assert!(service.store().is_empty(), "expired record should be swept");
    }

    #[test]
    fn test_logout_without_cookie_is_noop() {
        let service = service_on(Arc::new(ManualClock::default()));
        service.login("alice").unwrap();

        assert!(!service.logout(None));
        assert_eq!(service.store().len(), 1);
    }

    #[test]
    fn test_logout_with_cookie_revokes() {
        let service = service_on(Arc::new(ManualClock::default()));
        let token = service.login("alice").unwrap();

        assert!(service.logout(Some(token.as_str())));
        assert!(!service.logout(Some(token.as_str())));
        assert!(!service.handle_request(Some(token.as_str())).is_logged_in());
    }

    #[test]
    fn test_login_entropy_failure_is_rejected() {
        let service =
            SessionService::builder().build_with(|_| NoEntropy, Arc::new(ManualClock::default()));

        let err = service.login("alice").unwrap_err();

        assert!(matches!(err, TokenwardError::Session(_)));
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_request_view_serializes_for_templates() {
        let service = service_on(Arc::new(ManualClock::default()));
        let token = service.login("alice").unwrap();

        let view = service.handle_request(Some(token.as_str()));
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["session"]["identity"], "alice");
        assert_eq!(json["live"]["sessions"][0]["token"], token.as_str());
    }
}
