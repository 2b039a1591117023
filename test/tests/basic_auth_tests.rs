//! HTTP Basic Authentication tests.

mod common;

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::test;

use common::{basic_auth, create_app_with, create_test_app, test_chain};

#[actix_web::test]
async fn valid_credentials_reach_the_protected_resource() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(("Authorization", basic_auth("admin", "admin")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "Admin: admin");
}

#[actix_web::test]
async fn path_parameters_survive_the_security_chain() {
    let app = create_test_app().await;

    // Routing mutates the request's path state and requires the service
    // request to be the only handle to it.
    let req = test::TestRequest::get()
        .uri("/admin/report/quarterly")
        .insert_header(("Authorization", basic_auth("admin", "admin")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "Report quarterly for admin");
}

#[actix_web::test]
async fn a_wrong_password_is_challenged() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(("Authorization", basic_auth("admin", "wrong")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[actix_web::test]
async fn an_unknown_user_is_challenged() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(("Authorization", basic_auth("nobody", "password")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_garbled_header_is_challenged() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .insert_header(("Authorization", "Basic not-base64!!!"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn no_credentials_on_a_protected_path_commences_the_entry_point() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/admin/dashboard").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic "));
}

#[actix_web::test]
async fn public_paths_stay_open_without_credentials() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "Welcome, guest!");
}

#[actix_web::test]
async fn ignored_failures_leave_the_request_anonymous() {
    let app = create_app_with(test_chain().ignore_authentication_failure(true).build()).await;

    // The bad credentials are swallowed; the public page answers as if no
    // header had been sent.
    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Authorization", basic_auth("admin", "wrong")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "Welcome, guest!");
}
