//! Logout stage tests.

mod common;

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::test;

use common::{basic_auth, create_test_app, session_cookie};

#[actix_web::test]
async fn logout_redirects_and_never_reaches_a_handler() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/logout")
        .insert_header(("Authorization", basic_auth("admin", "admin")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
}

#[actix_web::test]
async fn logout_without_a_login_still_redirects() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn logout_is_idempotent() {
    let app = create_test_app().await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/logout").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
}

#[actix_web::test]
async fn presented_cookies_come_back_expired() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(Cookie::new("theme", "dark"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    let expired = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "theme")
        .unwrap();
    assert_eq!(expired.value(), "");
    assert_eq!(expired.path(), Some("/"));
    assert_eq!(
        expired.max_age(),
        Some(actix_web::cookie::time::Duration::ZERO)
    );
}

#[actix_web::test]
async fn logout_tells_the_client_to_drop_the_session_cookie() {
    let app = create_test_app().await;

    // Log in and obtain a session cookie.
    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(("Authorization", basic_auth("admin", "admin")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp).unwrap();

    // Log out using that session; the session cookie comes back expired.
    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let removal = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "id")
        .unwrap();
    assert_eq!(removal.value(), "");
}
