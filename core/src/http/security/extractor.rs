//! Extractors for reading the established authentication in handlers.

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::http::error::{AuthenticationError, SecurityFailure};
use crate::http::security::authentication::Authentication;

/// Extractor for a fully authenticated caller.
///
/// # Usage
/// ```ignore
/// async fn handler(user: AuthenticatedUser) -> impl Responder {
///     format!("Hello, {}!", user.principal())
/// }
/// ```
///
/// # Errors
/// Fails with `401 Unauthorized` when no authentication is established or
/// the caller is only anonymous.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(Authentication);

impl AuthenticatedUser {
    pub fn into_inner(self) -> Authentication {
        self.0
    }
}

impl Deref for AuthenticatedUser {
    type Target = Authentication;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = SecurityFailure;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let authentication = req
            .extensions()
            .get::<Authentication>()
            .filter(|auth| !auth.is_anonymous())
            .cloned();

        match authentication {
            Some(auth) => ready(Ok(AuthenticatedUser(auth))),
            None => ready(Err(SecurityFailure::from(
                AuthenticationError::insufficient("no authenticated caller"),
            ))),
        }
    }
}

/// Optional variant of [`AuthenticatedUser`].
///
/// Yields `None` for unauthenticated and anonymous callers instead of an
/// error.
#[derive(Debug, Clone)]
pub struct OptionalUser(Option<Authentication>);

impl OptionalUser {
    pub fn into_inner(self) -> Option<Authentication> {
        self.0
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl Deref for OptionalUser {
    type Target = Option<Authentication>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for OptionalUser {
    type Error = SecurityFailure;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let authentication = req
            .extensions()
            .get::<Authentication>()
            .filter(|auth| !auth.is_anonymous())
            .cloned();
        ready(Ok(OptionalUser(authentication)))
    }
}
