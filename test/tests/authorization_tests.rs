//! Authorization interceptor tests.
//!
//! Covers the routing of failures: unauthenticated callers are challenged
//! through the entry point, authenticated callers lacking authority get a
//! plain denial.

mod common;

use std::error::Error as StdError;
use std::fmt;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{get, test, App, Error, HttpResponse};

use actix_sentinel_core::http::error::AccessDeniedError;
use actix_sentinel_core::http::security::AuthenticatedUser;

use common::{basic_auth, create_test_app, test_chain};

#[actix_web::test]
async fn the_right_role_opens_the_door() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/user/settings")
        .insert_header(("Authorization", basic_auth("user", "user")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn a_missing_role_is_forbidden_not_challenged() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(("Authorization", basic_auth("user", "user")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(!resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[actix_web::test]
async fn an_anonymous_caller_is_challenged_not_forbidden() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/user/settings").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[actix_web::test]
async fn rules_match_on_plain_authorities_too() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", basic_auth("user", "user")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn a_caller_without_the_authority_is_forbidden() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", basic_auth("guest", "guest")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[derive(Debug)]
struct ExportFailed {
    source: AccessDeniedError,
}

impl fmt::Display for ExportFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export failed")
    }
}

impl StdError for ExportFailed {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}

#[get("/api/export")]
async fn export(_user: AuthenticatedUser) -> Result<HttpResponse, Error> {
    let failure = ExportFailed {
        source: AccessDeniedError::new("export requires users:write"),
    };
    Err(Error::from(Box::new(failure) as Box<dyn StdError + 'static>))
}

#[actix_web::test]
async fn a_denial_buried_in_a_handler_error_chain_is_forbidden() {
    let app = test::init_service(
        App::new()
            .wrap(test_chain().build())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                Key::generate(),
            ))
            .service(export),
    )
    .await;

    // The handler wraps the denial in its own error; the pipeline digs it
    // out of the cause chain and keeps 403 for the authenticated caller.
    let req = test::TestRequest::get()
        .uri("/api/export")
        .insert_header(("Authorization", basic_auth("user", "user")))
        .to_request();

    let resp = test::try_call_service(&app, req).await;
    let err = match resp {
        Err(err) => err,
        Ok(resp) => panic!("expected an error response, got {}", resp.status()),
    };
    assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn any_listed_role_is_enough() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/user/settings")
        .insert_header(("Authorization", basic_auth("admin", "admin")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
