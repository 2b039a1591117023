//! Common test utilities and configuration.
//!
//! Provides the shared test application, the test user set and small
//! request helpers.

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{get, test, web, App, Error, HttpResponse, Responder};
use base64::prelude::*;

use actix_sentinel_core::http::security::config::SecurityChainBuilder;
use actix_sentinel_core::http::security::{
    Access, AuthenticatedUser, InMemoryAuthenticationManager, OptionalUser, SecurityChain, User,
};

// =============================================================================
// Test Configuration
// =============================================================================

/// Creates a manager with predefined users.
///
/// Users:
/// - admin/admin: ADMIN, USER roles + users:read, users:write authorities
/// - user/user: USER role + users:read authority
/// - guest/guest: GUEST role, no authorities
pub fn test_manager() -> InMemoryAuthenticationManager {
    InMemoryAuthenticationManager::new()
        .with_user(
            User::new("admin".into(), "admin".into())
                .roles(&["ADMIN".into(), "USER".into()])
                .authorities(&["users:read".into(), "users:write".into()]),
        )
        .with_user(
            User::new("user".into(), "user".into())
                .roles(&["USER".into()])
                .authorities(&["users:read".into()]),
        )
        .with_user(User::new("guest".into(), "guest".into()).roles(&["GUEST".into()]))
}

/// Chain configuration shared by the test application.
///
/// Patterns:
/// - /admin/.* requires the ADMIN role
/// - /user/.* requires the ADMIN or USER role
/// - /api/.* requires the users:read authority
pub fn test_chain() -> SecurityChainBuilder {
    SecurityChain::builder()
        .authentication_manager(test_manager())
        .protect("/admin(/.*)?", Access::roles(&["ADMIN"]))
        .protect("/user(/.*)?", Access::roles(&["ADMIN", "USER"]))
        .protect("/api(/.*)?", Access::authorities(&["users:read"]))
}

/// Helper to build a Basic Auth header value.
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!("Basic {}", BASE64_STANDARD.encode(credentials))
}

/// Pulls the session cookie out of a response.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == "id")
        .map(|cookie| cookie.into_owned())
}

// =============================================================================
// Test Handlers
// =============================================================================

#[get("/")]
pub async fn index(user: OptionalUser) -> impl Responder {
    match user.into_inner() {
        Some(auth) => HttpResponse::Ok().body(format!("Welcome, {}!", auth.principal())),
        None => HttpResponse::Ok().body("Welcome, guest!"),
    }
}

#[get("/admin/dashboard")]
pub async fn admin_dashboard(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(format!("Admin: {}", user.principal()))
}

#[get("/user/settings")]
pub async fn user_settings(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(format!("User: {}", user.principal()))
}

#[get("/api/users")]
pub async fn api_users(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(format!("API User: {}", user.principal()))
}

#[get("/admin/report/{name}")]
pub async fn admin_report(name: web::Path<String>, user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(format!("Report {} for {}", name.into_inner(), user.principal()))
}

// =============================================================================
// Test App
// =============================================================================

/// Builds the test application with the given chain and a cookie session
/// store.
pub async fn create_app_with(
    chain: SecurityChain,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = Error>
{
    test::init_service(
        App::new()
            .wrap(chain)
            // Session handling must wrap the chain, so it is registered
            // last.
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                Key::generate(),
            ))
            .service(index)
            .service(admin_dashboard)
            .service(user_settings)
            .service(api_users)
            .service(admin_report),
    )
    .await
}

/// Builds the default test application.
pub async fn create_test_app(
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = Error>
{
    create_app_with(test_chain().build()).await
}
