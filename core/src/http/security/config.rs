//! Assembly of a [`SecurityChain`] from its parts.
//!
//! # Overview
//! [`SecurityChainBuilder`] collects the configurable pieces of the
//! pipeline, fills in defaults for everything left unset and wires the
//! stages in their fixed order: logout, HTTP basic, request cache replay,
//! anonymous, session management, then the authorization interceptor
//! around the protected service.
//!
//! Without an [`AuthenticationManager`] the basic stage is omitted and
//! every caller is anonymous.
//!
//! # Example
//! ```ignore
//! let chain = SecurityChain::builder()
//!     .authentication_manager(
//!         InMemoryAuthenticationManager::new()
//!             .with_user(User::new("admin".into(), "secret".into()).roles(&["ADMIN".into()])),
//!     )
//!     .protect("/admin(/.*)?", Access::roles(&["ADMIN"]))
//!     .logout_path("/logout")
//!     .build();
//! ```

use std::rc::Rc;

use crate::http::security::anonymous::AnonymousAuthenticationStage;
use crate::http::security::basic::{BasicAuthenticationStage, CredentialsCharset};
use crate::http::security::exchange::SecurityStage;
use crate::http::security::headers::{default_header_writers, HeaderWriter};
use crate::http::security::interceptor::{
    Access, AuthorizationInterceptor, RequestMatcherMetadataSource,
};
use crate::http::security::logout::{
    CookieClearingLogoutHandler, LogoutHandler, LogoutMatcher, LogoutStage, LogoutSuccessHandler,
    SecurityContextLogoutHandler, SimpleUrlLogoutSuccessHandler,
};
use crate::http::security::manager::AuthenticationManager;
use crate::http::security::middleware::{ChainInner, SecurityChain};
use crate::http::security::remember_me::{NullRememberMeServices, RememberMeServices};
use crate::http::security::repository::{
    ContextPersistence, SecurityContextRepository, SessionContextRepository,
};
use crate::http::security::request_cache::{RequestCache, RequestCacheStage, SessionRequestCache};
use crate::http::security::session::{
    AuthenticationFailureHandler, InvalidSessionStrategy, SessionAuthenticationStrategy,
    SessionFixationProtectionStrategy, SessionManagementStage, SimpleStatusFailureHandler,
};
use crate::http::security::translation::{
    AccessDeniedHandler, AuthenticationEntryPoint, BasicAuthenticationEntryPoint,
    DefaultAccessDeniedHandler, ExceptionTranslator,
};

pub struct SecurityChainBuilder {
    authentication_manager: Option<Rc<dyn AuthenticationManager>>,
    repository: Rc<dyn SecurityContextRepository>,
    entry_point: Rc<dyn AuthenticationEntryPoint>,
    access_denied_handler: Rc<dyn AccessDeniedHandler>,
    request_cache: Rc<dyn RequestCache>,
    remember_me: Rc<dyn RememberMeServices>,
    session_strategy: Rc<dyn SessionAuthenticationStrategy>,
    invalid_session_strategy: Option<Rc<dyn InvalidSessionStrategy>>,
    failure_handler: Rc<dyn AuthenticationFailureHandler>,
    logout_matcher: LogoutMatcher,
    logout_handlers: Vec<Rc<dyn LogoutHandler>>,
    logout_success_handler: Rc<dyn LogoutSuccessHandler>,
    anonymous: AnonymousAuthenticationStage,
    metadata_source: RequestMatcherMetadataSource,
    header_writers: Vec<Rc<dyn HeaderWriter>>,
    role_prefix: String,
    observe_once_per_request: bool,
    ignore_authentication_failure: bool,
    force_eager_session_creation: bool,
    session_cookie_name: String,
    credentials_charset: CredentialsCharset,
}

impl SecurityChainBuilder {
    pub(crate) fn new() -> Self {
        SecurityChainBuilder {
            authentication_manager: None,
            repository: Rc::new(SessionContextRepository::new()),
            entry_point: Rc::new(BasicAuthenticationEntryPoint::default()),
            access_denied_handler: Rc::new(DefaultAccessDeniedHandler),
            request_cache: Rc::new(SessionRequestCache::new()),
            remember_me: Rc::new(NullRememberMeServices),
            session_strategy: Rc::new(SessionFixationProtectionStrategy),
            invalid_session_strategy: None,
            failure_handler: Rc::new(SimpleStatusFailureHandler),
            logout_matcher: LogoutMatcher::exact("/logout"),
            logout_handlers: vec![
                Rc::new(SecurityContextLogoutHandler),
                Rc::new(CookieClearingLogoutHandler),
            ],
            logout_success_handler: Rc::new(SimpleUrlLogoutSuccessHandler::new("/")),
            anonymous: AnonymousAuthenticationStage::new(),
            metadata_source: RequestMatcherMetadataSource::new(),
            header_writers: default_header_writers(),
            role_prefix: "ROLE_".to_string(),
            observe_once_per_request: true,
            ignore_authentication_failure: false,
            force_eager_session_creation: false,
            session_cookie_name: "id".to_string(),
            credentials_charset: CredentialsCharset::default(),
        }
    }

    /// Enables HTTP basic authentication against the given manager.
    pub fn authentication_manager(mut self, manager: impl AuthenticationManager + 'static) -> Self {
        self.authentication_manager = Some(Rc::new(manager));
        self
    }

    /// Protects every path matching `pattern` with `access`. Rules are
    /// consulted in the order given; the first match wins.
    pub fn protect(mut self, pattern: &str, access: Access) -> Self {
        self.metadata_source = self.metadata_source.protect(pattern, access);
        self
    }

    pub fn context_repository(mut self, repository: impl SecurityContextRepository + 'static) -> Self {
        self.repository = Rc::new(repository);
        self
    }

    pub fn entry_point(mut self, entry_point: impl AuthenticationEntryPoint + 'static) -> Self {
        self.entry_point = Rc::new(entry_point);
        self
    }

    pub fn access_denied_handler(mut self, handler: impl AccessDeniedHandler + 'static) -> Self {
        self.access_denied_handler = Rc::new(handler);
        self
    }

    pub fn request_cache(mut self, cache: impl RequestCache + 'static) -> Self {
        self.request_cache = Rc::new(cache);
        self
    }

    pub fn remember_me_services(mut self, services: impl RememberMeServices + 'static) -> Self {
        self.remember_me = Rc::new(services);
        self
    }

    pub fn session_authentication_strategy(
        mut self,
        strategy: impl SessionAuthenticationStrategy + 'static,
    ) -> Self {
        self.session_strategy = Rc::new(strategy);
        self
    }

    /// Enables stale session detection.
    pub fn invalid_session_strategy(
        mut self,
        strategy: impl InvalidSessionStrategy + 'static,
    ) -> Self {
        self.invalid_session_strategy = Some(Rc::new(strategy));
        self
    }

    pub fn authentication_failure_handler(
        mut self,
        handler: impl AuthenticationFailureHandler + 'static,
    ) -> Self {
        self.failure_handler = Rc::new(handler);
        self
    }

    /// Path of the logout endpoint, matched literally. Defaults to
    /// `/logout`.
    pub fn logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_matcher = LogoutMatcher::exact(path);
        self
    }

    /// Replaces the logout matcher entirely, for pattern or method bound
    /// matching.
    pub fn logout_matcher(mut self, matcher: LogoutMatcher) -> Self {
        self.logout_matcher = matcher;
        self
    }

    /// Replaces the default logout handlers.
    pub fn logout_handlers(mut self, handlers: Vec<Rc<dyn LogoutHandler>>) -> Self {
        self.logout_handlers = handlers;
        self
    }

    /// Appends to the configured logout handlers.
    pub fn add_logout_handler(mut self, handler: impl LogoutHandler + 'static) -> Self {
        self.logout_handlers.push(Rc::new(handler));
        self
    }

    pub fn logout_success_handler(mut self, handler: impl LogoutSuccessHandler + 'static) -> Self {
        self.logout_success_handler = Rc::new(handler);
        self
    }

    /// Replaces the anonymous stage, for a custom key, principal or
    /// authority set.
    pub fn anonymous(mut self, stage: AnonymousAuthenticationStage) -> Self {
        self.anonymous = stage;
        self
    }

    /// Replaces the default response header writers.
    pub fn header_writers(mut self, writers: Vec<Rc<dyn HeaderWriter>>) -> Self {
        self.header_writers = writers;
        self
    }

    /// Appends to the configured header writers.
    pub fn add_header_writer(mut self, writer: impl HeaderWriter + 'static) -> Self {
        self.header_writers.push(Rc::new(writer));
        self
    }

    /// Prefix prepended to role names before comparison. Defaults to
    /// `ROLE_`.
    pub fn role_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.role_prefix = prefix.into();
        self
    }

    pub fn observe_once_per_request(mut self, once: bool) -> Self {
        self.observe_once_per_request = once;
        self
    }

    /// When set, failed basic credentials clear the context but do not end
    /// the request.
    pub fn ignore_authentication_failure(mut self, ignore: bool) -> Self {
        self.ignore_authentication_failure = ignore;
        self
    }

    /// When set, a session is created for every request, authenticated or
    /// not.
    pub fn force_eager_session_creation(mut self, force: bool) -> Self {
        self.force_eager_session_creation = force;
        self
    }

    /// Name of the session cookie, used for stale session detection.
    /// Defaults to `id`.
    pub fn session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    pub fn credentials_charset(mut self, charset: CredentialsCharset) -> Self {
        self.credentials_charset = charset;
        self
    }

    pub fn build(self) -> SecurityChain {
        let persistence =
            ContextPersistence::new(Rc::clone(&self.repository), self.force_eager_session_creation);

        let mut stages: Vec<Rc<dyn SecurityStage>> = Vec::new();

        stages.push(Rc::new(LogoutStage::new(
            self.logout_matcher,
            self.logout_handlers,
            self.logout_success_handler,
        )));

        if let Some(manager) = self.authentication_manager {
            stages.push(Rc::new(
                BasicAuthenticationStage::new(manager, Rc::clone(&self.remember_me))
                    .credentials_charset(self.credentials_charset)
                    .ignore_failure(self.ignore_authentication_failure),
            ));
        } else {
            log::debug!("no authentication manager configured, basic authentication is off");
        }

        stages.push(Rc::new(RequestCacheStage::new(Rc::clone(
            &self.request_cache,
        ))));
        stages.push(Rc::new(self.anonymous));

        let mut session_stage = SessionManagementStage::new(
            Rc::clone(&self.repository),
            self.session_strategy,
            self.failure_handler,
        )
        .session_cookie_name(self.session_cookie_name);
        if let Some(strategy) = self.invalid_session_strategy {
            session_stage = session_stage.invalid_session_strategy(strategy);
        }
        stages.push(Rc::new(session_stage));

        let interceptor = Rc::new(
            AuthorizationInterceptor::new(Box::new(self.metadata_source))
                .role_prefix(self.role_prefix)
                .observe_once_per_request(self.observe_once_per_request),
        );

        let translator = ExceptionTranslator::new(
            self.entry_point,
            self.access_denied_handler,
            Rc::clone(&self.request_cache),
        );

        SecurityChain::from_inner(ChainInner {
            persistence,
            stages,
            interceptor,
            translator,
            header_writers: Rc::new(self.header_writers),
        })
    }
}

impl Default for SecurityChainBuilder {
    fn default() -> Self {
        SecurityChainBuilder::new()
    }
}
