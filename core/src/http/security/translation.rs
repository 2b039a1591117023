//! Translation of security failures into HTTP responses.
//!
//! # Overview
//! A single boundary turns every [`SecurityFailure`] raised by the chain or
//! by the protected service into a response. Authentication failures start
//! the configured challenge through an [`AuthenticationEntryPoint`], saving
//! the current request for a later replay. Access denials are answered by
//! an [`AccessDeniedHandler`], unless the caller is only anonymous or
//! remember-me authenticated, in which case a full authentication is asked
//! for instead.

use std::rc::Rc;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};

use crate::http::error::{AccessDeniedError, AuthenticationError, SecurityFailure};
use crate::http::security::exchange::Exchange;
use crate::http::security::request_cache::RequestCache;

/// Commences an authentication scheme for a request that needs one.
pub trait AuthenticationEntryPoint {
    fn commence(&self, req: &HttpRequest, failure: &AuthenticationError) -> HttpResponse;
}

/// Challenges with `401` and a `WWW-Authenticate: Basic` header.
pub struct BasicAuthenticationEntryPoint {
    realm: String,
}

impl BasicAuthenticationEntryPoint {
    pub fn new(realm: impl Into<String>) -> Self {
        BasicAuthenticationEntryPoint { realm: realm.into() }
    }
}

impl Default for BasicAuthenticationEntryPoint {
    fn default() -> Self {
        BasicAuthenticationEntryPoint::new("Restricted")
    }
}

impl AuthenticationEntryPoint for BasicAuthenticationEntryPoint {
    fn commence(&self, _req: &HttpRequest, failure: &AuthenticationError) -> HttpResponse {
        HttpResponse::Unauthorized()
            .insert_header((
                header::WWW_AUTHENTICATE,
                format!("Basic realm=\"{}\"", self.realm),
            ))
            .body(failure.to_string())
    }
}

/// Redirects unauthenticated callers to a login page.
pub struct LoginUrlAuthenticationEntryPoint {
    login_url: String,
}

impl LoginUrlAuthenticationEntryPoint {
    pub fn new(login_url: impl Into<String>) -> Self {
        LoginUrlAuthenticationEntryPoint {
            login_url: login_url.into(),
        }
    }
}

impl AuthenticationEntryPoint for LoginUrlAuthenticationEntryPoint {
    fn commence(&self, _req: &HttpRequest, _failure: &AuthenticationError) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.login_url.clone()))
            .finish()
    }
}

/// Builds the response for an authenticated caller lacking authority.
pub trait AccessDeniedHandler {
    fn handle(&self, req: &HttpRequest, denial: &AccessDeniedError) -> HttpResponse;
}

/// Answers with a plain `403 Forbidden`.
pub struct DefaultAccessDeniedHandler;

impl AccessDeniedHandler for DefaultAccessDeniedHandler {
    fn handle(&self, _req: &HttpRequest, denial: &AccessDeniedError) -> HttpResponse {
        HttpResponse::Forbidden().body(denial.to_string())
    }
}

pub struct ExceptionTranslator {
    entry_point: Rc<dyn AuthenticationEntryPoint>,
    access_denied_handler: Rc<dyn AccessDeniedHandler>,
    request_cache: Rc<dyn RequestCache>,
}

impl ExceptionTranslator {
    pub fn new(
        entry_point: Rc<dyn AuthenticationEntryPoint>,
        access_denied_handler: Rc<dyn AccessDeniedHandler>,
        request_cache: Rc<dyn RequestCache>,
    ) -> Self {
        ExceptionTranslator {
            entry_point,
            access_denied_handler,
            request_cache,
        }
    }

    /// Maps a security failure onto a response for the current exchange.
    ///
    /// Fails when the response has already been committed; at that point a
    /// challenge can no longer reach the client intact.
    pub fn translate(
        &self,
        exchange: &mut Exchange,
        failure: SecurityFailure,
    ) -> Result<HttpResponse, actix_web::Error> {
        if exchange.is_committed() {
            log::error!(
                "security failure after the response was committed: {}",
                failure
            );
            return Err(failure.into());
        }

        match failure {
            SecurityFailure::Authentication(reason) => {
                Ok(self.send_start_authentication(exchange, reason))
            }
            SecurityFailure::AccessDenied(denial) => {
                let fully_authenticated = exchange
                    .context()
                    .authentication()
                    .map(|auth| auth.is_fully_authenticated())
                    .unwrap_or(false);

                if fully_authenticated {
                    log::debug!("access denied for authenticated caller: {}", denial);
                    let req = exchange.http_request().clone();
                    let response = self.access_denied_handler.handle(&req, &denial);
                    Ok(exchange.commit(response))
                } else {
                    // Anonymous and remember-me callers get a chance to
                    // authenticate properly instead of a flat denial.
                    let reason = AuthenticationError::insufficient(
                        "full authentication is required to access this resource",
                    );
                    Ok(self.send_start_authentication(exchange, reason))
                }
            }
        }
    }

    fn send_start_authentication(
        &self,
        exchange: &mut Exchange,
        reason: AuthenticationError,
    ) -> HttpResponse {
        log::debug!("commencing authentication: {}", reason);
        // A partial authentication must not survive into the challenge
        // response; the entry point starts from a clean slate.
        exchange.context_mut().set_authentication(None);

        let req = exchange.http_request().clone();
        self.request_cache.save_request(&req);
        let response = self.entry_point.commence(&req, &reason);
        exchange.commit(response)
    }
}
