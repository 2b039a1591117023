//! Logout detection and handling.
//!
//! # Overview
//! The [`LogoutStage`] runs first in the chain. When the request matches
//! the logout endpoint it runs every configured [`LogoutHandler`] in order,
//! builds the final response through the [`LogoutSuccessHandler`] and
//! terminates the chain; the protected service is never reached. A logout
//! without an established authentication is still answered normally.

use std::rc::Rc;

use actix_session::SessionExt;
use actix_web::cookie::time::Duration;
use actix_web::cookie::Cookie;
use actix_web::http::{header, Method};
use actix_web::{HttpRequest, HttpResponse};
use regex::Regex;

use crate::http::security::authentication::Authentication;
use crate::http::security::exchange::{Exchange, Outcome, SecurityStage};

enum MatchRule {
    Exact(String),
    Pattern(Regex),
}

/// Matches the request that triggers a logout.
pub struct LogoutMatcher {
    rule: MatchRule,
    method: Option<Method>,
}

impl LogoutMatcher {
    /// Matches `path` literally, for any method.
    pub fn exact(path: impl Into<String>) -> Self {
        LogoutMatcher {
            rule: MatchRule::Exact(path.into()),
            method: None,
        }
    }

    /// Matches every path covered by `pattern`, anchored to span the whole
    /// path. Fails on an invalid pattern.
    pub fn path(pattern: &str) -> Result<Self, regex::Error> {
        Ok(LogoutMatcher {
            rule: MatchRule::Pattern(Regex::new(&format!("^{}$", pattern))?),
            method: None,
        })
    }

    /// Restricts the matcher to a single method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn matches(&self, req: &HttpRequest) -> bool {
        if let Some(method) = &self.method {
            if req.method() != method {
                return false;
            }
        }
        match &self.rule {
            MatchRule::Exact(path) => req.path() == path,
            MatchRule::Pattern(pattern) => pattern.is_match(req.path()),
        }
    }
}

/// A single piece of logout work.
///
/// Handlers run in configuration order and must tolerate a request that is
/// not logged in.
pub trait LogoutHandler {
    fn logout(&self, exchange: &mut Exchange);
}

/// Purges the session and clears the established context.
pub struct SecurityContextLogoutHandler;

impl LogoutHandler for SecurityContextLogoutHandler {
    fn logout(&self, exchange: &mut Exchange) {
        exchange.http_request().get_session().purge();
        exchange.context_mut().clear();
    }
}

/// Expires every cookie the request presented.
///
/// Each cookie comes back with an empty value, path `/` and a max age of
/// zero, which makes the client drop it.
pub struct CookieClearingLogoutHandler;

impl LogoutHandler for CookieClearingLogoutHandler {
    fn logout(&self, exchange: &mut Exchange) {
        let names: Vec<String> = exchange
            .http_request()
            .cookies()
            .map(|cookies| cookies.iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        for name in names {
            log::debug!("expiring cookie '{}'", name);
            let expired = Cookie::build(name, "")
                .path("/")
                .max_age(Duration::ZERO)
                .finish();
            exchange.add_cookie(expired);
        }
    }
}

/// Builds the response that ends a logout.
pub trait LogoutSuccessHandler {
    fn on_logout_success(
        &self,
        req: &HttpRequest,
        authentication: Option<&Authentication>,
    ) -> HttpResponse;
}

/// Redirects to a fixed destination after logout.
pub struct SimpleUrlLogoutSuccessHandler {
    destination: String,
}

impl SimpleUrlLogoutSuccessHandler {
    pub fn new(destination: impl Into<String>) -> Self {
        SimpleUrlLogoutSuccessHandler {
            destination: destination.into(),
        }
    }
}

impl LogoutSuccessHandler for SimpleUrlLogoutSuccessHandler {
    fn on_logout_success(
        &self,
        _req: &HttpRequest,
        authentication: Option<&Authentication>,
    ) -> HttpResponse {
        match authentication {
            Some(auth) => log::debug!("logout of '{}'", auth.principal()),
            None => log::debug!("logout without an established authentication"),
        }
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.destination.clone()))
            .finish()
    }
}

pub struct LogoutStage {
    matcher: LogoutMatcher,
    handlers: Vec<Rc<dyn LogoutHandler>>,
    success_handler: Rc<dyn LogoutSuccessHandler>,
}

impl LogoutStage {
    pub fn new(
        matcher: LogoutMatcher,
        handlers: Vec<Rc<dyn LogoutHandler>>,
        success_handler: Rc<dyn LogoutSuccessHandler>,
    ) -> Self {
        LogoutStage {
            matcher,
            handlers,
            success_handler,
        }
    }
}

impl SecurityStage for LogoutStage {
    fn name(&self) -> &'static str {
        "logout"
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<Outcome, actix_web::Error> {
        let req = exchange.http_request().clone();
        if !self.matcher.matches(&req) {
            return Ok(Outcome::Continue);
        }

        // Snapshot the identity before the handlers erase it.
        let authentication = exchange.context().authentication().cloned();

        for handler in &self.handlers {
            handler.logout(exchange);
        }

        let response = self
            .success_handler
            .on_logout_success(&req, authentication.as_ref());
        Ok(Outcome::Terminate(exchange.commit(response)))
    }
}
