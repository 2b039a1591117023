//! The security middleware.
//!
//! # Overview
//! [`SecurityChain`] wraps an application and drives every request through
//! a fixed pipeline: the established context is loaded from the session,
//! the configured stages run in order, the authorization interceptor
//! brackets the call into the protected service and a single translation
//! boundary turns every security failure into a response. Whatever happens
//! inside, the context is persisted and cleared before the response leaves.
//!
//! The exchange is split just before the protected service runs: the
//! service request travels into the call as the only handle to its head
//! (actix routing requires exclusive access to it) and the epilogue keeps
//! the session and context for the work afterwards. When the service fails
//! there is no request head to build a response with, so a recognized
//! security failure is mapped onto the matching error and rendered by the
//! framework.
//!
//! # Example
//! ```ignore
//! App::new()
//!     .wrap(
//!         SecurityChain::builder()
//!             .authentication_manager(manager)
//!             .protect("/admin(/.*)?", Access::roles(&["ADMIN"]))
//!             .build(),
//!     )
//!     // Session handling must wrap the chain, so register it last.
//!     .wrap(SessionMiddleware::new(store, key))
//! ```

use std::error::Error as StdError;
use std::rc::Rc;

use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpResponse};
use futures_util::future::{ok, LocalBoxFuture, Ready};

use crate::http::error::{
    find_security_failure, AccessDeniedError, AuthenticationError, SecurityFailure,
};
use crate::http::security::config::SecurityChainBuilder;
use crate::http::security::context::SecurityContext;
use crate::http::security::exchange::{Exchange, Outcome, SecurityStage};
use crate::http::security::headers::HeaderWriter;
use crate::http::security::interceptor::{
    AuthorizationGuard, AuthorizationInterceptor, InterceptorStatusToken,
};
use crate::http::security::repository::ContextPersistence;
use crate::http::security::translation::ExceptionTranslator;

/// Security middleware factory.
pub struct SecurityChain {
    inner: Rc<ChainInner>,
}

impl SecurityChain {
    pub fn builder() -> SecurityChainBuilder {
        SecurityChainBuilder::new()
    }

    pub(crate) fn from_inner(inner: ChainInner) -> Self {
        SecurityChain {
            inner: Rc::new(inner),
        }
    }
}

/// Everything one request needs, assembled once at startup.
pub(crate) struct ChainInner {
    pub(crate) persistence: ContextPersistence,
    pub(crate) stages: Vec<Rc<dyn SecurityStage>>,
    pub(crate) interceptor: Rc<AuthorizationInterceptor>,
    pub(crate) translator: ExceptionTranslator,
    pub(crate) header_writers: Rc<Vec<Rc<dyn HeaderWriter>>>,
}

impl<S, B> Transform<S, ServiceRequest> for SecurityChain
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SecurityChainService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SecurityChainService {
            chain: Rc::clone(&self.inner),
            service: Rc::new(service),
        })
    }
}

/// Security middleware service.
pub struct SecurityChainService<S> {
    chain: Rc<ChainInner>,
    service: Rc<S>,
}

/// What the stage chain decided before the protected service runs.
enum Preflight {
    /// All stages passed and the access rules allow the call.
    Forward(InterceptorStatusToken),
    /// A stage or the interceptor produced the final response.
    Terminal(HttpResponse),
}

impl<S, B> Service<ServiceRequest> for SecurityChainService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let chain = Rc::clone(&self.chain);
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let mut exchange = Exchange::new(req, Rc::clone(&chain.header_writers));
            chain.persistence.load(&mut exchange);

            match chain.preflight(&mut exchange)? {
                Preflight::Terminal(response) => {
                    let (request, mut epilogue) = exchange.into_parts();
                    let response = request.into_response(response).map_into_right_body();
                    chain.persistence.save_and_clear(&mut epilogue);
                    Ok(response)
                }
                Preflight::Forward(token) => {
                    let (request, mut epilogue) = exchange.into_parts();
                    let guard = AuthorizationGuard::new(Rc::clone(&chain.interceptor), token);

                    let result = match service.call(request).await {
                        Ok(response) => {
                            guard.complete();
                            let (req, mut res) = response.map_into_left_body().into_parts();
                            epilogue.finish(&req, res.headers_mut());
                            Ok(ServiceResponse::new(req, res))
                        }
                        Err(error) => {
                            drop(guard);
                            match security_failure_of(&error) {
                                Some(failure) => {
                                    Err(failure_to_error(epilogue.context(), failure))
                                }
                                None => Err(error),
                            }
                        }
                    };

                    // The epilogue runs on every exit path.
                    chain.persistence.save_and_clear(&mut epilogue);
                    result
                }
            }
        })
    }
}

impl ChainInner {
    /// Runs the stages and the authorization check for one exchange.
    fn preflight(&self, exchange: &mut Exchange) -> Result<Preflight, Error> {
        for stage in &self.stages {
            log::trace!("running stage '{}'", stage.name());
            match stage.handle(exchange)? {
                Outcome::Continue => {}
                Outcome::Challenge(reason) => {
                    let response = self
                        .translator
                        .translate(exchange, SecurityFailure::from(reason))?;
                    return Ok(Preflight::Terminal(response));
                }
                Outcome::Deny(denial) => {
                    let response = self
                        .translator
                        .translate(exchange, SecurityFailure::from(denial))?;
                    return Ok(Preflight::Terminal(response));
                }
                Outcome::Terminate(response) => {
                    return Ok(Preflight::Terminal(response));
                }
            }
        }

        match self.interceptor.before(exchange) {
            Ok(token) => {
                exchange.expose_authentication();
                Ok(Preflight::Forward(token))
            }
            Err(failure) => {
                let response = self.translator.translate(exchange, failure)?;
                Ok(Preflight::Terminal(response))
            }
        }
    }
}

/// Extracts a security failure from an error raised by the protected
/// service, so a handler can deny access by returning one. Boxed error
/// chains are walked for a failure buried behind unrelated wrappers.
fn security_failure_of(error: &Error) -> Option<SecurityFailure> {
    if let Some(failure) = error.as_error::<SecurityFailure>() {
        return Some(failure.clone());
    }
    if let Some(reason) = error.as_error::<AuthenticationError>() {
        return Some(SecurityFailure::from(reason.clone()));
    }
    if let Some(denial) = error.as_error::<AccessDeniedError>() {
        return Some(SecurityFailure::from(denial.clone()));
    }
    error
        .as_error::<Box<dyn StdError + 'static>>()
        .and_then(|cause| find_security_failure(cause.as_ref()))
}

/// Maps a failure raised behind the protected service onto the error that
/// renders the matching status. No request head exists anymore at this
/// point, so the entry point and denied handler cannot build a response;
/// the policy they implement is applied to the error instead.
fn failure_to_error(context: &SecurityContext, failure: SecurityFailure) -> Error {
    match failure {
        SecurityFailure::Authentication(reason) => reason.into(),
        SecurityFailure::AccessDenied(denial) => {
            let fully_authenticated = context
                .authentication()
                .map(|auth| auth.is_fully_authenticated())
                .unwrap_or(false);

            if fully_authenticated {
                denial.into()
            } else {
                AuthenticationError::insufficient(
                    "full authentication is required to access this resource",
                )
                .into()
            }
        }
    }
}
