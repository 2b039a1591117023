//! # Actix Sentinel
//!
//! A request-scoped security interceptor pipeline for Actix Web.
//!
//! The crate models request security as an ordered chain of composable
//! stages. Each request traverses the chain in a fixed sequence: the
//! security context is loaded from the session-backed repository, logout
//! requests are intercepted, credentials are extracted and authenticated,
//! an anonymous identity is installed as a fallback, session lifecycle
//! invariants are enforced, and finally access rules are evaluated before
//! the protected handler runs. Security failures are translated into HTTP
//! responses at a single boundary; the context is persisted and cleared on
//! every exit path.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use actix_session::{storage::CookieSessionStore, SessionMiddleware};
//! use actix_web::cookie::Key;
//! use actix_web::{App, HttpServer};
//! use actix_sentinel_core::http::security::{
//!     Access, InMemoryAuthenticationManager, SecurityChain, User,
//! };
//!
//! let key = Key::generate();
//! HttpServer::new(move || {
//!     let manager = InMemoryAuthenticationManager::new()
//!         .with_user(User::new("admin".into(), "admin".into()).roles(&["ADMIN".into()]));
//!
//!     let chain = SecurityChain::builder()
//!         .authentication_manager(manager)
//!         .protect("/admin(/.*)?", Access::roles(&["ADMIN"]))
//!         .logout_path("/logout")
//!         .build();
//!
//!     App::new()
//!         // Session middleware must be registered last so it wraps the chain.
//!         .wrap(chain)
//!         .wrap(SessionMiddleware::new(CookieSessionStore::default(), key.clone()))
//! });
//! ```

pub mod http;
