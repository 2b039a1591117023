//! Security failure taxonomy.
//!
//! Two recoverable failure families exist: authentication failures (the
//! caller could not be identified) and access-denied failures (the caller is
//! identified but lacks the required authority). Both are translated into
//! HTTP responses at the exception translation boundary and never surface
//! past the pipeline as raw errors unless the response is already committed.

use std::error::Error as StdError;

use actix_web::{error, http::StatusCode, HttpResponse, HttpResponseBuilder};
use derive_more::{Display, Error};

/// Failure to establish who the caller is.
#[derive(Debug, Clone, Display, Error)]
pub enum AuthenticationError {
    /// Credentials were presented but could not be validated: bad password,
    /// malformed header, undecodable payload.
    #[display("bad credentials: {message}")]
    BadCredentials { message: String },

    /// An authentication exists but is too weak for the requested resource
    /// (anonymous or remember-me only).
    #[display("insufficient authentication: {message}")]
    InsufficientAuthentication { message: String },

    /// The session authentication strategy rejected the login, e.g. a
    /// concurrent session limit was reached.
    #[display("session rejected: {message}")]
    SessionRejected { message: String },
}

impl AuthenticationError {
    pub fn bad_credentials(message: impl Into<String>) -> Self {
        AuthenticationError::BadCredentials {
            message: message.into(),
        }
    }

    pub fn insufficient(message: impl Into<String>) -> Self {
        AuthenticationError::InsufficientAuthentication {
            message: message.into(),
        }
    }

    pub fn session_rejected(message: impl Into<String>) -> Self {
        AuthenticationError::SessionRejected {
            message: message.into(),
        }
    }
}

impl error::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponseBuilder::new(self.status_code()).body(self.to_string())
    }
}

/// An authenticated caller lacks the authority required by the access rules.
#[derive(Debug, Clone, Display, Error)]
#[display("access denied: {message}")]
pub struct AccessDeniedError {
    pub message: String,
}

impl AccessDeniedError {
    pub fn new(message: impl Into<String>) -> Self {
        AccessDeniedError {
            message: message.into(),
        }
    }
}

impl error::ResponseError for AccessDeniedError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponseBuilder::new(self.status_code()).body(self.to_string())
    }
}

/// Umbrella over the two recoverable security failures.
///
/// Protected handlers may return this type (it implements `ResponseError`)
/// so a failure raised downstream is still recognized and translated by the
/// pipeline boundary instead of being served verbatim.
#[derive(Debug, Clone, Display, Error)]
pub enum SecurityFailure {
    #[display("{_0}")]
    Authentication(AuthenticationError),
    #[display("{_0}")]
    AccessDenied(AccessDeniedError),
}

impl From<AuthenticationError> for SecurityFailure {
    fn from(err: AuthenticationError) -> Self {
        SecurityFailure::Authentication(err)
    }
}

impl From<AccessDeniedError> for SecurityFailure {
    fn from(err: AccessDeniedError) -> Self {
        SecurityFailure::AccessDenied(err)
    }
}

impl error::ResponseError for SecurityFailure {
    fn status_code(&self) -> StatusCode {
        match self {
            SecurityFailure::Authentication(e) => e.status_code(),
            SecurityFailure::AccessDenied(e) => e.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            SecurityFailure::Authentication(e) => e.error_response(),
            SecurityFailure::AccessDenied(e) => e.error_response(),
        }
    }
}

/// Walks a cause chain looking for a recoverable security failure.
///
/// Authentication failures win over access-denied failures wherever they sit
/// in the chain; unrelated errors are skipped. Returns `None` when the chain
/// carries no security failure at all.
pub fn find_security_failure(err: &(dyn StdError + 'static)) -> Option<SecurityFailure> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(auth) = e.downcast_ref::<AuthenticationError>() {
            return Some(SecurityFailure::Authentication(auth.clone()));
        }
        if let Some(SecurityFailure::Authentication(auth)) = e.downcast_ref::<SecurityFailure>() {
            return Some(SecurityFailure::Authentication(auth.clone()));
        }
        current = e.source();
    }

    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(denied) = e.downcast_ref::<AccessDeniedError>() {
            return Some(SecurityFailure::AccessDenied(denied.clone()));
        }
        if let Some(SecurityFailure::AccessDenied(denied)) = e.downcast_ref::<SecurityFailure>() {
            return Some(SecurityFailure::AccessDenied(denied.clone()));
        }
        current = e.source();
    }

    None
}
