//! Per-request execution state threaded through the stage chain.
//!
//! # Overview
//! The [`Exchange`] replaces two pieces of out-of-band state found in
//! classic filter pipelines: the global "current context holder" and the
//! per-request attribute flags guarding re-entrant-unsafe filters. Both are
//! explicit here: the security context is a field, and the applied markers
//! are a small record of booleans. Stages receive `&mut Exchange` and
//! nothing else carries security state.
//!
//! The exchange also owns response commitment. Every terminal response a
//! stage produces goes through [`Exchange::commit`], which applies the
//! deferred header writers exactly once, attaches pending cookies and flips
//! the committed flag the translation boundary checks.
//!
//! The exchange owns the [`ServiceRequest`] outright and never clones its
//! head: actix panics in `match_info_mut` when another handle to the
//! request exists while it routes, so the sole handle must travel into the
//! protected service. [`Exchange::into_parts`] splits the exchange right
//! before that hand-off into the request and an [`Epilogue`] carrying the
//! session, the context and the header-write state for the work that runs
//! after the call returns.

use std::rc::Rc;

use actix_session::{Session, SessionExt};
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceRequest;
use actix_web::http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use actix_web::{HttpMessage, HttpRequest, HttpResponse};

use crate::http::error::{AccessDeniedError, AuthenticationError};
use crate::http::security::context::SecurityContext;
use crate::http::security::headers::HeaderWriter;

/// Result of one stage handling one request.
///
/// Failures are values, not exceptions: stages report a challenge or a
/// denial and the single translation boundary turns it into a response.
pub enum Outcome {
    /// Pass control to the next stage.
    Continue,
    /// Authentication is required or failed; the entry point must commence.
    Challenge(AuthenticationError),
    /// The caller is authenticated but not authorized.
    Deny(AccessDeniedError),
    /// The stage produced the final response itself (redirect, logout).
    Terminate(HttpResponse),
}

/// A single security stage. Chain order is data: the pipeline executes an
/// ordered list of these.
pub trait SecurityStage {
    fn name(&self) -> &'static str;

    fn handle(&self, exchange: &mut Exchange) -> Result<Outcome, actix_web::Error>;
}

/// At-most-once execution flags for re-entrant-unsafe stages.
#[derive(Debug, Default, Clone)]
pub struct AppliedMarkers {
    context_persistence: bool,
    session_management: bool,
    authorization: bool,
}

impl AppliedMarkers {
    /// Marks the stage applied; returns true when it already was.
    pub fn mark_context_persistence(&mut self) -> bool {
        std::mem::replace(&mut self.context_persistence, true)
    }

    pub fn mark_session_management(&mut self) -> bool {
        std::mem::replace(&mut self.session_management, true)
    }

    pub fn mark_authorization(&mut self) -> bool {
        std::mem::replace(&mut self.authorization, true)
    }

    pub fn authorization_applied(&self) -> bool {
        self.authorization
    }
}

/// Request-scoped state for one traversal of the security chain.
pub struct Exchange {
    request: ServiceRequest,
    session: Session,
    context: SecurityContext,
    applied: AppliedMarkers,
    header_writers: Rc<Vec<Rc<dyn HeaderWriter>>>,
    headers_written: bool,
    pending_cookies: Vec<Cookie<'static>>,
    committed: bool,
}

impl Exchange {
    pub fn new(request: ServiceRequest, header_writers: Rc<Vec<Rc<dyn HeaderWriter>>>) -> Self {
        let session = request.get_session();
        Exchange {
            request,
            session,
            context: SecurityContext::empty(),
            applied: AppliedMarkers::default(),
            header_writers,
            headers_written: false,
            pending_cookies: Vec::new(),
            committed: false,
        }
    }

    /// The request head. Borrowed from the owned service request, so no
    /// second handle exists.
    pub fn http_request(&self) -> &HttpRequest {
        self.request.request()
    }

    /// The request's session. The handle is independent of the request
    /// head, so it stays usable after [`Exchange::into_parts`].
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn context(&self) -> &SecurityContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SecurityContext {
        &mut self.context
    }

    pub fn applied(&self) -> &AppliedMarkers {
        &self.applied
    }

    pub fn applied_mut(&mut self) -> &mut AppliedMarkers {
        &mut self.applied
    }

    /// Queues a cookie for the terminal response.
    pub fn add_cookie(&mut self, cookie: Cookie<'static>) {
        self.pending_cookies.push(cookie);
    }

    /// Whether a terminal response has already been produced. Once true,
    /// failures can no longer be translated.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Finalizes a terminal response: header writers run now (first-commit
    /// trigger), pending cookies are attached, the commit flag is set.
    pub fn commit(&mut self, mut response: HttpResponse) -> HttpResponse {
        if !self.headers_written {
            self.headers_written = true;
            for writer in self.header_writers.iter() {
                writer.write_headers(self.request.request(), response.headers_mut());
            }
        }
        for cookie in self.pending_cookies.drain(..) {
            if let Err(err) = response.add_cookie(&cookie) {
                log::warn!("failed to attach cookie to response: {}", err);
            }
        }
        self.committed = true;
        response
    }

    /// Makes the current authentication visible to handlers and extractors
    /// through the request's extensions.
    pub fn expose_authentication(&self) {
        if let Some(authentication) = self.context.authentication() {
            self.request
                .request()
                .extensions_mut()
                .insert(authentication.clone());
        }
    }

    /// Splits the exchange into the service request and the epilogue state.
    /// After this the request is the only handle to its own head.
    pub(crate) fn into_parts(self) -> (ServiceRequest, Epilogue) {
        let epilogue = Epilogue {
            session: self.session,
            context: self.context,
            header_writers: self.header_writers,
            headers_written: self.headers_written,
            pending_cookies: self.pending_cookies,
        };
        (self.request, epilogue)
    }
}

/// What remains of an exchange once the request has been handed over:
/// enough to persist the context and flush the deferred headers, even when
/// the protected service fails and no request head comes back.
pub(crate) struct Epilogue {
    session: Session,
    context: SecurityContext,
    header_writers: Rc<Vec<Rc<dyn HeaderWriter>>>,
    headers_written: bool,
    pending_cookies: Vec<Cookie<'static>>,
}

impl Epilogue {
    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn context(&self) -> &SecurityContext {
        &self.context
    }

    pub(crate) fn take_context(&mut self) -> SecurityContext {
        std::mem::take(&mut self.context)
    }

    /// Runs the header writers against the response head, unless an early
    /// commit already did, and attaches any cookies still pending.
    pub(crate) fn finish(&mut self, req: &HttpRequest, headers: &mut HeaderMap) {
        if !self.headers_written {
            self.headers_written = true;
            for writer in self.header_writers.iter() {
                writer.write_headers(req, headers);
            }
        }
        for cookie in self.pending_cookies.drain(..) {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(err) => log::warn!("failed to attach cookie to response: {}", err),
            }
        }
    }
}
