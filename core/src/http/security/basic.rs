//! HTTP Basic credential authenticator stage.
//!
//! # Overview
//! Inspects the `Authorization` header for a case-insensitive `Basic `
//! prefix. Requests without one pass through untouched. A present header is
//! decoded (base64, then a configurable charset) into an
//! `identifier:secret` pair and authenticated through the external
//! [`AuthenticationManager`], unless the context already holds a fully
//! authenticated, non-anonymous identity with the same principal.
//!
//! On failure the context is cleared and, depending on
//! `ignore_authentication_failure`, the chain either continues (optional
//! challenge schemes) or the entry point commences immediately.

use std::rc::Rc;

use actix_web::http::header;
use base64::prelude::*;

use crate::http::error::AuthenticationError;
use crate::http::security::authentication::AuthenticationDetails;
use crate::http::security::exchange::{Exchange, Outcome, SecurityStage};
use crate::http::security::manager::{AuthenticationManager, UsernamePasswordCredentials};
use crate::http::security::remember_me::RememberMeServices;

/// Text encoding applied to the decoded base64 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsCharset {
    Utf8,
    Latin1,
}

impl CredentialsCharset {
    fn decode(self, bytes: Vec<u8>) -> Result<String, AuthenticationError> {
        match self {
            CredentialsCharset::Utf8 => String::from_utf8(bytes).map_err(|_| {
                AuthenticationError::bad_credentials("credentials are not valid UTF-8")
            }),
            CredentialsCharset::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl Default for CredentialsCharset {
    fn default() -> Self {
        CredentialsCharset::Utf8
    }
}

/// Splits a Basic authorization header value into `(identifier, secret)`.
///
/// Fails on a malformed base64 payload and on a payload missing the `:`
/// delimiter.
pub fn decode_basic_token(
    header_value: &str,
    charset: CredentialsCharset,
) -> Result<(String, String), AuthenticationError> {
    let payload = header_value[BASIC_PREFIX.len()..].trim();
    let decoded = BASE64_STANDARD
        .decode(payload)
        .map_err(|_| AuthenticationError::bad_credentials("failed to decode basic token"))?;
    let token = charset.decode(decoded)?;

    match token.split_once(':') {
        Some((username, password)) => Ok((username.to_string(), password.to_string())),
        None => Err(AuthenticationError::bad_credentials(
            "invalid basic token: missing delimiter",
        )),
    }
}

const BASIC_PREFIX: &str = "Basic ";

pub struct BasicAuthenticationStage {
    manager: Rc<dyn AuthenticationManager>,
    remember_me: Rc<dyn RememberMeServices>,
    charset: CredentialsCharset,
    ignore_failure: bool,
}

impl BasicAuthenticationStage {
    pub fn new(
        manager: Rc<dyn AuthenticationManager>,
        remember_me: Rc<dyn RememberMeServices>,
    ) -> Self {
        BasicAuthenticationStage {
            manager,
            remember_me,
            charset: CredentialsCharset::default(),
            ignore_failure: false,
        }
    }

    /// Charset of the decoded credential pair.
    pub fn credentials_charset(mut self, charset: CredentialsCharset) -> Self {
        self.charset = charset;
        self
    }

    /// When set, a failed authentication clears the context but lets the
    /// chain continue instead of commencing the entry point.
    pub fn ignore_failure(mut self, ignore: bool) -> Self {
        self.ignore_failure = ignore;
        self
    }

    fn authentication_is_required(&self, exchange: &Exchange, username: &str) -> bool {
        match exchange.context().authentication() {
            Some(existing) => {
                !existing.is_fully_authenticated() || existing.principal() != username
            }
            None => true,
        }
    }
}

impl SecurityStage for BasicAuthenticationStage {
    fn name(&self) -> &'static str {
        "http-basic"
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<Outcome, actix_web::Error> {
        let header_value = match exchange
            .http_request()
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        {
            Some(value) if value.len() >= BASIC_PREFIX.len()
                && value[..BASIC_PREFIX.len()].eq_ignore_ascii_case(BASIC_PREFIX) =>
            {
                value.to_string()
            }
            // Not a basic authentication request.
            _ => return Ok(Outcome::Continue),
        };

        let req = exchange.http_request().clone();
        let attempt = decode_basic_token(&header_value, self.charset).and_then(|(username, password)| {
            if !self.authentication_is_required(exchange, &username) {
                return Ok(None);
            }

            log::debug!("basic authorization header found for user '{}'", username);
            let details = AuthenticationDetails {
                remote_addr: req.peer_addr().map(|addr| addr.to_string()),
            };
            let credentials =
                UsernamePasswordCredentials::new(username, password).with_details(details);
            self.manager.authenticate(credentials).map(Some)
        });

        match attempt {
            Ok(Some(authentication)) => {
                log::debug!("authentication success for '{}'", authentication.principal());
                self.remember_me.login_success(&req, &authentication);
                exchange
                    .context_mut()
                    .set_authentication(Some(authentication));
                Ok(Outcome::Continue)
            }
            Ok(None) => Ok(Outcome::Continue),
            Err(failure) => {
                log::debug!("basic authentication failed: {}", failure);
                exchange.context_mut().clear();
                self.remember_me.login_fail(&req);

                if self.ignore_failure {
                    Ok(Outcome::Continue)
                } else {
                    Ok(Outcome::Challenge(failure))
                }
            }
        }
    }
}
