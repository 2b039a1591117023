//! Remember-me collaborator seam.
//!
//! The basic authenticator notifies this collaborator about authentication
//! outcomes so a remember-me implementation can issue or cancel its
//! persistent token. Token issuance itself is outside the pipeline; the
//! null implementation is the default.

use actix_web::HttpRequest;

use crate::http::security::authentication::Authentication;

pub trait RememberMeServices {
    /// Called after a credential authenticator validated the request.
    fn login_success(&self, req: &HttpRequest, authentication: &Authentication);

    /// Called when credential validation failed.
    fn login_fail(&self, req: &HttpRequest);
}

/// Does nothing. Used when remember-me is not configured.
#[derive(Debug, Clone, Default)]
pub struct NullRememberMeServices;

impl RememberMeServices for NullRememberMeServices {
    fn login_success(&self, _req: &HttpRequest, _authentication: &Authentication) {}

    fn login_fail(&self, _req: &HttpRequest) {}
}
