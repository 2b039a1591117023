//! Session persistence and session management tests.

mod common;

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::test;

use actix_sentinel_core::http::security::SimpleRedirectInvalidSessionStrategy;

use common::{basic_auth, create_app_with, create_test_app, session_cookie, test_chain};

#[actix_web::test]
async fn a_login_issues_a_session_cookie() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(("Authorization", basic_auth("admin", "admin")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_some());
}

#[actix_web::test]
async fn the_context_survives_into_the_next_request() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/user/settings")
        .insert_header(("Authorization", basic_auth("user", "user")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp).unwrap();

    // The second request carries the session cookie only.
    let req = test::TestRequest::get()
        .uri("/user/settings")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "User: user");
}

#[actix_web::test]
async fn an_anonymous_request_is_not_persisted() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
}

#[actix_web::test]
async fn a_stale_session_cookie_hits_the_invalid_session_strategy() {
    let app = create_app_with(
        test_chain()
            .invalid_session_strategy(SimpleRedirectInvalidSessionStrategy::new("/expired"))
            .build(),
    )
    .await;

    // The cookie does not decode to any stored session.
    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new("id", "stale-value"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/expired");
}

#[actix_web::test]
async fn a_live_session_without_a_context_is_not_redirected() {
    let app = create_app_with(
        test_chain()
            .invalid_session_strategy(SimpleRedirectInvalidSessionStrategy::new("/expired"))
            .force_eager_session_creation(true)
            .build(),
    )
    .await;

    // The first, anonymous request creates the session eagerly.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp).unwrap();

    // Replaying the perfectly valid cookie is not a stale session, even
    // though no security context is stored under it.
    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn authentication_cycles_the_session_and_strands_the_old_one() {
    let app = create_app_with(test_chain().force_eager_session_creation(true).build()).await;

    // A session exists before the login.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let pre_login = session_cookie(&resp).unwrap();

    // Logging in over the pre-login session issues a different one.
    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(("Authorization", basic_auth("admin", "admin")))
        .cookie(pre_login.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let post_login = session_cookie(&resp).unwrap();
    assert_ne!(pre_login.value(), post_login.value());

    // The pre-login session never learns about the authentication.
    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(pre_login)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The post-login session carries the authenticated context.
    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(post_login)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn without_the_strategy_a_stale_cookie_is_ignored() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new("id", "stale-value"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
