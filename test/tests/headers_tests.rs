//! Response security header tests.

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;

use actix_sentinel_core::http::security::HstsHeaderWriter;

use common::{basic_auth, create_app_with, create_test_app, test_chain};

#[actix_web::test]
async fn default_headers_land_on_normal_responses() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(
        headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(headers.get(header::X_XSS_PROTECTION).unwrap(), "0");
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, max-age=0, must-revalidate"
    );
}

#[actix_web::test]
async fn headers_also_land_on_challenges() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/admin/dashboard").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
}

#[actix_web::test]
async fn headers_also_land_on_redirects() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/logout").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
}

#[actix_web::test]
async fn headers_are_written_once_not_twice() {
    let app = create_test_app().await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    let values: Vec<_> = resp
        .headers()
        .get_all(header::X_CONTENT_TYPE_OPTIONS)
        .collect();
    assert_eq!(values.len(), 1);
}

#[actix_web::test]
async fn extra_writers_can_be_added() {
    let app = create_app_with(
        test_chain()
            .add_header_writer(HstsHeaderWriter::new(31536000, true))
            .build(),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/user/settings")
        .insert_header(("Authorization", basic_auth("user", "user")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get(header::STRICT_TRANSPORT_SECURITY).unwrap(),
        "max-age=31536000; includeSubDomains"
    );
}
