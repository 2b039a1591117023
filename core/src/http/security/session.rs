//! Session management stage and session authentication strategies.
//!
//! # Overview
//! Runs once per request, after the authenticators, and reacts to an
//! authentication that happened during the current request: it applies the
//! configured [`SessionAuthenticationStrategy`] (session fixation
//! protection by default) and then persists the fresh context eagerly, so
//! the session cookie is issued even when the response is written before
//! the epilogue.
//!
//! When no authentication happened, the stage can detect a stale session
//! cookie (a cookie was presented but decoded to an empty session) and
//! hand the request to an [`InvalidSessionStrategy`].

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use actix_session::SessionExt;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};

use crate::http::error::AuthenticationError;
use crate::http::security::authentication::Authentication;
use crate::http::security::exchange::{Exchange, Outcome, SecurityStage};
use crate::http::security::repository::SecurityContextRepository;

/// Hook invoked when an authentication happens during the current request.
pub trait SessionAuthenticationStrategy {
    fn on_authentication(
        &self,
        authentication: &Authentication,
        req: &HttpRequest,
    ) -> Result<(), AuthenticationError>;
}

/// Cycles the session identifier while keeping its contents.
pub struct SessionFixationProtectionStrategy;

impl SessionAuthenticationStrategy for SessionFixationProtectionStrategy {
    fn on_authentication(
        &self,
        _authentication: &Authentication,
        req: &HttpRequest,
    ) -> Result<(), AuthenticationError> {
        req.get_session().renew();
        Ok(())
    }
}

pub struct NullAuthenticatedSessionStrategy;

impl SessionAuthenticationStrategy for NullAuthenticatedSessionStrategy {
    fn on_authentication(
        &self,
        _authentication: &Authentication,
        _req: &HttpRequest,
    ) -> Result<(), AuthenticationError> {
        Ok(())
    }
}

/// Delegates to each strategy in order and stops at the first failure.
pub struct CompositeSessionAuthenticationStrategy {
    delegates: Vec<Rc<dyn SessionAuthenticationStrategy>>,
}

impl CompositeSessionAuthenticationStrategy {
    pub fn new(delegates: Vec<Rc<dyn SessionAuthenticationStrategy>>) -> Self {
        CompositeSessionAuthenticationStrategy { delegates }
    }
}

impl SessionAuthenticationStrategy for CompositeSessionAuthenticationStrategy {
    fn on_authentication(
        &self,
        authentication: &Authentication,
        req: &HttpRequest,
    ) -> Result<(), AuthenticationError> {
        for delegate in &self.delegates {
            delegate.on_authentication(authentication, req)?;
        }
        Ok(())
    }
}

/// Shared count of live sessions per principal.
///
/// The registry is process wide; each worker thread sees the same counts.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, usize>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    pub fn session_count(&self, principal: &str) -> usize {
        let sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.get(principal).copied().unwrap_or(0)
    }

    pub fn register(&self, principal: &str) {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *sessions.entry(principal.to_string()).or_insert(0) += 1;
    }

    pub fn remove(&self, principal: &str) {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(count) = sessions.get_mut(principal) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                sessions.remove(principal);
            }
        }
    }
}

/// Rejects an authentication once a principal holds `max_sessions` live
/// sessions.
pub struct ConcurrentSessionControlStrategy {
    registry: SessionRegistry,
    max_sessions: usize,
}

impl ConcurrentSessionControlStrategy {
    pub fn new(registry: SessionRegistry, max_sessions: usize) -> Self {
        ConcurrentSessionControlStrategy {
            registry,
            max_sessions,
        }
    }
}

impl SessionAuthenticationStrategy for ConcurrentSessionControlStrategy {
    fn on_authentication(
        &self,
        authentication: &Authentication,
        _req: &HttpRequest,
    ) -> Result<(), AuthenticationError> {
        let principal = authentication.principal();
        if self.registry.session_count(principal) >= self.max_sessions {
            return Err(AuthenticationError::session_rejected(format!(
                "maximum sessions of {} exceeded for '{}'",
                self.max_sessions, principal
            )));
        }
        self.registry.register(principal);
        Ok(())
    }
}

/// Decides the response for a request carrying a stale session cookie.
pub trait InvalidSessionStrategy {
    fn on_invalid_session(&self, req: &HttpRequest) -> HttpResponse;
}

/// Redirects stale sessions to a fixed destination.
pub struct SimpleRedirectInvalidSessionStrategy {
    destination: String,
}

impl SimpleRedirectInvalidSessionStrategy {
    pub fn new(destination: impl Into<String>) -> Self {
        SimpleRedirectInvalidSessionStrategy {
            destination: destination.into(),
        }
    }
}

impl InvalidSessionStrategy for SimpleRedirectInvalidSessionStrategy {
    fn on_invalid_session(&self, req: &HttpRequest) -> HttpResponse {
        // The presented cookie no longer maps to anything usable; a fresh
        // session starts on the redirect.
        req.get_session().purge();
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.destination.clone()))
            .finish()
    }
}

/// Builds the response for an authentication rejected by a strategy.
pub trait AuthenticationFailureHandler {
    fn on_authentication_failure(
        &self,
        req: &HttpRequest,
        failure: &AuthenticationError,
    ) -> HttpResponse;
}

/// Answers strategy failures with a plain `401 Unauthorized`.
pub struct SimpleStatusFailureHandler;

impl AuthenticationFailureHandler for SimpleStatusFailureHandler {
    fn on_authentication_failure(
        &self,
        _req: &HttpRequest,
        failure: &AuthenticationError,
    ) -> HttpResponse {
        HttpResponse::Unauthorized().body(failure.to_string())
    }
}

pub struct RedirectFailureHandler {
    destination: String,
}

impl RedirectFailureHandler {
    pub fn new(destination: impl Into<String>) -> Self {
        RedirectFailureHandler {
            destination: destination.into(),
        }
    }
}

impl AuthenticationFailureHandler for RedirectFailureHandler {
    fn on_authentication_failure(
        &self,
        _req: &HttpRequest,
        _failure: &AuthenticationError,
    ) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.destination.clone()))
            .finish()
    }
}

pub struct SessionManagementStage {
    repository: Rc<dyn SecurityContextRepository>,
    strategy: Rc<dyn SessionAuthenticationStrategy>,
    invalid_session_strategy: Option<Rc<dyn InvalidSessionStrategy>>,
    failure_handler: Rc<dyn AuthenticationFailureHandler>,
    session_cookie_name: String,
}

impl SessionManagementStage {
    pub fn new(
        repository: Rc<dyn SecurityContextRepository>,
        strategy: Rc<dyn SessionAuthenticationStrategy>,
        failure_handler: Rc<dyn AuthenticationFailureHandler>,
    ) -> Self {
        SessionManagementStage {
            repository,
            strategy,
            invalid_session_strategy: None,
            failure_handler,
            session_cookie_name: "id".to_string(),
        }
    }

    /// Enables stale session detection.
    pub fn invalid_session_strategy(mut self, strategy: Rc<dyn InvalidSessionStrategy>) -> Self {
        self.invalid_session_strategy = Some(strategy);
        self
    }

    /// Name of the session cookie used for stale session detection.
    pub fn session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    /// A session cookie came in but decoded to nothing: no store entry of
    /// any kind survived. A live session that merely lacks a security
    /// context (eager creation, a saved request) is not stale.
    fn stale_session_presented(&self, exchange: &Exchange) -> bool {
        exchange
            .http_request()
            .cookie(&self.session_cookie_name)
            .is_some()
            && exchange.session().entries().is_empty()
    }
}

impl SecurityStage for SessionManagementStage {
    fn name(&self) -> &'static str {
        "session-management"
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<Outcome, actix_web::Error> {
        if exchange.applied_mut().mark_session_management() {
            return Ok(Outcome::Continue);
        }

        let req = exchange.http_request().clone();

        if !self.repository.contains_context(exchange.session()) {
            let fresh = exchange
                .context()
                .authentication()
                .filter(|auth| !auth.is_anonymous())
                .cloned();

            if let Some(authentication) = fresh {
                if let Err(failure) = self.strategy.on_authentication(&authentication, &req) {
                    log::debug!("session strategy rejected authentication: {}", failure);
                    exchange.context_mut().clear();
                    let response = self.failure_handler.on_authentication_failure(&req, &failure);
                    return Ok(Outcome::Terminate(exchange.commit(response)));
                }

                // Eager save so the session cookie survives responses
                // written before the persistence epilogue.
                self.repository
                    .save_context(exchange.context(), exchange.session());
            } else if self.stale_session_presented(exchange) {
                if let Some(strategy) = &self.invalid_session_strategy {
                    log::debug!("request carries an unusable session cookie");
                    let response = strategy.on_invalid_session(&req);
                    return Ok(Outcome::Terminate(exchange.commit(response)));
                }
            }
        }

        Ok(Outcome::Continue)
    }
}
