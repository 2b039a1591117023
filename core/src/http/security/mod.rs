//! Security module providing the request pipeline, authentication and
//! authorization.
//!
//! # Module Structure
//!
//! - `anonymous` - Anonymous authentication for unauthenticated callers
//! - `authentication` - The authentication model (principal, authorities)
//! - `basic` - HTTP Basic Authentication stage
//! - `config` - Chain assembly (SecurityChainBuilder)
//! - `context` - Security context holding the established authentication
//! - `crypto` - Password encoding
//! - `exchange` - Per-request execution state and the stage contract
//! - `extractor` - Actix Web extractors (AuthenticatedUser, OptionalUser)
//! - `headers` - Response security header writers
//! - `interceptor` - Authorization of the protected invocation
//! - `logout` - Logout detection and handling
//! - `manager` - Credential validation (InMemoryAuthenticationManager)
//! - `middleware` - The security middleware (SecurityChain)
//! - `remember_me` - Remember-me notification hooks
//! - `repository` - Context persistence between requests
//! - `request_cache` - Saving the request that triggered a challenge
//! - `session` - Session management and authentication strategies
//! - `translation` - Mapping security failures to responses
//! - `user` - User model

// Re-exports for convenience
pub use anonymous::AnonymousAuthenticationStage;
pub use authentication::{Authentication, AuthenticationDetails, AuthenticationKind};
pub use basic::{BasicAuthenticationStage, CredentialsCharset};
pub use config::SecurityChainBuilder;
pub use context::SecurityContext;
#[cfg(feature = "bcrypt")]
pub use crypto::BCryptPasswordEncoder;
pub use crypto::{NoOpPasswordEncoder, PasswordEncoder};
pub use exchange::{Exchange, Outcome, SecurityStage};
pub use extractor::{AuthenticatedUser, OptionalUser};
pub use headers::{
    default_header_writers, CacheControlHeaderWriter, ContentTypeOptionsHeaderWriter,
    FrameOptions, FrameOptionsHeaderWriter, HeaderWriter, HstsHeaderWriter,
    XssProtectionHeaderWriter,
};
pub use interceptor::{
    Access, AuthorizationGuard, AuthorizationInterceptor, InterceptorStatusToken,
    RequestMatcherMetadataSource, SecurityMetadataSource,
};
pub use logout::{
    CookieClearingLogoutHandler, LogoutHandler, LogoutMatcher, LogoutStage, LogoutSuccessHandler,
    SecurityContextLogoutHandler, SimpleUrlLogoutSuccessHandler,
};
pub use manager::{
    AuthenticationManager, InMemoryAuthenticationManager, UsernamePasswordCredentials,
};
pub use remember_me::{NullRememberMeServices, RememberMeServices};
pub use repository::{ContextPersistence, SecurityContextRepository, SessionContextRepository};
pub use request_cache::{RequestCache, SavedRequest, SessionRequestCache};
pub use session::{
    AuthenticationFailureHandler, CompositeSessionAuthenticationStrategy,
    ConcurrentSessionControlStrategy, InvalidSessionStrategy, NullAuthenticatedSessionStrategy,
    RedirectFailureHandler, SessionAuthenticationStrategy, SessionFixationProtectionStrategy,
    SessionManagementStage, SessionRegistry, SimpleRedirectInvalidSessionStrategy,
    SimpleStatusFailureHandler,
};
pub use translation::{
    AccessDeniedHandler, AuthenticationEntryPoint, BasicAuthenticationEntryPoint,
    DefaultAccessDeniedHandler, ExceptionTranslator, LoginUrlAuthenticationEntryPoint,
};
pub use user::User;

pub use middleware::SecurityChain;

pub mod anonymous;
pub mod authentication;
pub mod basic;
pub mod config;
pub mod context;
pub mod crypto;
pub mod exchange;
pub mod extractor;
pub mod headers;
pub mod interceptor;
pub mod logout;
pub mod manager;
pub mod middleware;
pub mod remember_me;
pub mod repository;
pub mod request_cache;
pub mod session;
pub mod translation;
pub mod user;
