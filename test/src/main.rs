//! Demo application for the security chain.
//!
//! Exposes a public home page, role-protected areas and a logout endpoint,
//! backed by in-memory users and cookie sessions.

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{get, App, HttpResponse, HttpServer, Responder};

use actix_sentinel_core::http::security::{
    Access, AuthenticatedUser, InMemoryAuthenticationManager, OptionalUser, SecurityChain, User,
};

fn authentication_manager() -> InMemoryAuthenticationManager {
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
}

#[get("/")]
async fn index(user: OptionalUser) -> impl Responder {
    match user.into_inner() {
        Some(auth) => HttpResponse::Ok().body(format!("Welcome back, {}!", auth.principal())),
        None => HttpResponse::Ok().body("Welcome, guest!"),
    }
}

#[get("/admin/dashboard")]
async fn admin_dashboard(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(format!("Admin: {}", user.principal()))
}

#[get("/user/profile")]
async fn user_profile(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(format!("User: {}", user.principal()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let session_key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .wrap(
                SecurityChain::builder()
                    .authentication_manager(authentication_manager())
                    .protect("/admin(/.*)?", Access::roles(&["ADMIN"]))
                    .protect("/user(/.*)?", Access::roles(&["ADMIN", "USER"]))
                    .build(),
            )
            // Session handling must wrap the chain, so it is registered last.
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .service(index)
            .service(admin_dashboard)
            .service(user_profile)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
