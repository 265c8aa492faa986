use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqslite_queue::{Dispatcher, Store};
use sqslite_server::router::build_router;
use sqslite_server::state::AppState;
use tower::ServiceExt;

fn test_router() -> axum::Router {
    // deadpool connections are lazy: building a pool does not dial Redis,
    // so routes that never touch the dispatcher (like /ping) are testable
    // without a live backing store.
    let store = Store::connect("redis://127.0.0.1:6379", 4).expect("valid redis url");
    let dispatcher = Dispatcher::new(store);
    let state = Arc::new(AppState::new(dispatcher));
    build_router(state)
}

#[tokio::test]
async fn ping_returns_pong_as_plain_text() {
    let router = test_router();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/ping")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"pong");
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let router = test_router();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/doesNotExist")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn push_with_missing_body_field_returns_json_error_not_a_raw_4xx() {
    let router = test_router();
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/push")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(axum::body::Body::from("queueName=q1"))
                .unwrap(),
        )
        .await
        .unwrap();

    // A missing required field is a domain validation error, not a
    // framework-level rejection: HTTP 200 with success:false (SPEC_FULL §6).
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("body"));
}
