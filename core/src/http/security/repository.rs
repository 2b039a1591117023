//! Durable storage of security contexts between requests.
//!
//! The repository is the single source of truth for cross-request
//! continuity: the in-memory context has no life outside one request. The
//! default implementation stores the context in the actix session, keyed by
//! the session id the session middleware manages.
//!
//! Repositories work against the [`Session`] handle rather than the
//! request: the handle outlives the request head, which the pipeline gives
//! up when it calls the protected service, so the persistence epilogue can
//! still run when no head comes back.

use actix_session::Session;

use crate::http::security::authentication::Authentication;
use crate::http::security::context::SecurityContext;
use crate::http::security::exchange::{Epilogue, Exchange};

/// Loads and saves a [`SecurityContext`] keyed by session identity.
pub trait SecurityContextRepository {
    /// Loads the context for this session, or an empty one.
    fn load_context(&self, session: &Session) -> SecurityContext;

    /// Persists the context. Anonymous and empty contexts are removed from
    /// the store rather than written.
    fn save_context(&self, context: &SecurityContext, session: &Session);

    /// Whether a context is currently persisted for this session.
    fn contains_context(&self, session: &Session) -> bool;
}

/// Session-backed repository.
///
/// Stores the authentication under a configurable session key. Requires the
/// actix session middleware to be mounted outside the security chain.
#[derive(Clone)]
pub struct SessionContextRepository {
    session_key: String,
}

impl SessionContextRepository {
    pub const DEFAULT_SESSION_KEY: &'static str = "sentinel.security.context";

    pub fn new() -> Self {
        SessionContextRepository {
            session_key: Self::DEFAULT_SESSION_KEY.to_string(),
        }
    }

    /// Overrides the session key the context is stored under.
    pub fn session_key(mut self, key: &str) -> Self {
        self.session_key = key.to_string();
        self
    }
}

impl Default for SessionContextRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityContextRepository for SessionContextRepository {
    fn load_context(&self, session: &Session) -> SecurityContext {
        match session.get::<Authentication>(&self.session_key) {
            Ok(Some(authentication)) => {
                log::debug!(
                    "loaded security context for '{}' from session",
                    authentication.principal()
                );
                SecurityContext::with_authentication(authentication)
            }
            Ok(None) => SecurityContext::empty(),
            Err(err) => {
                log::warn!("stored security context is unreadable, dropping it: {}", err);
                session.remove(&self.session_key);
                SecurityContext::empty()
            }
        }
    }

    fn save_context(&self, context: &SecurityContext, session: &Session) {
        if context.is_worth_saving() {
            // is_worth_saving guarantees the authentication is present
            if let Some(authentication) = context.authentication() {
                if let Err(err) = session.insert(&self.session_key, authentication) {
                    log::warn!("failed to persist security context: {}", err);
                }
            }
        } else {
            // Removing an absent key would still mark the session changed
            // and force a cookie onto anonymous responses.
            let present = session.entries().contains_key(&self.session_key);
            if present {
                session.remove(&self.session_key);
            }
        }
    }

    fn contains_context(&self, session: &Session) -> bool {
        matches!(session.get::<Authentication>(&self.session_key), Ok(Some(_)))
    }
}

/// Entry/exit bracket around the rest of the chain.
///
/// Loads the context once per request on entry and, on every exit path,
/// persists whatever context is current and clears it. Saving runs in the
/// chain's guaranteed epilogue and never swallows a downstream failure.
pub struct ContextPersistence {
    repository: std::rc::Rc<dyn SecurityContextRepository>,
    force_eager_session_creation: bool,
}

impl ContextPersistence {
    const EAGER_SESSION_KEY: &'static str = "sentinel.session.created";

    pub fn new(
        repository: std::rc::Rc<dyn SecurityContextRepository>,
        force_eager_session_creation: bool,
    ) -> Self {
        ContextPersistence {
            repository,
            force_eager_session_creation,
        }
    }

    pub fn repository(&self) -> &std::rc::Rc<dyn SecurityContextRepository> {
        &self.repository
    }

    /// Loads the context into the exchange. Guarded so nested dispatch does
    /// not reload and wipe out mutations made earlier in the same request.
    pub fn load(&self, exchange: &mut Exchange) {
        if exchange.applied_mut().mark_context_persistence() {
            return;
        }

        if self.force_eager_session_creation {
            let session = exchange.session();
            if !matches!(session.get::<bool>(Self::EAGER_SESSION_KEY), Ok(Some(true))) {
                if let Err(err) = session.insert(Self::EAGER_SESSION_KEY, true) {
                    log::warn!("eager session creation failed: {}", err);
                }
            }
        }

        let context = self.repository.load_context(exchange.session());
        *exchange.context_mut() = context;
    }

    /// Persists the current context and clears the in-memory copy.
    pub(crate) fn save_and_clear(&self, epilogue: &mut Epilogue) {
        let context = epilogue.take_context();
        self.repository.save_context(&context, epilogue.session());
        log::debug!("security context cleared, request processing completed");
    }
}
