//! JSONP integration tests.
//!
//! Tests verify:
//! - `callback` wraps success, validation error, server error and forbidden responses
//! - Unsafe callback characters are stripped
//! - JSONP responses are marked as JavaScript with `nosniff`

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};

use share_counts::server::{JSONP_CONTENT_TYPE, JSON_CONTENT_TYPE};
use share_counts::CounterError;

use super::test_utils::{get, router_with, send, MockCounters, Outcome, RecordingLogger};

#[tokio::test]
async fn test_jsonp_success() {
    let router = router_with(&MockCounters::new(), &RecordingLogger::new());

    let response = get(
        router,
        "/?networks=facebook,twitter&url=https://example.com/&callback=shareCounts",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some(JSONP_CONTENT_TYPE));
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("cache-control"), Some("max-age=240"));
    assert_eq!(
        response.body,
        r#"/**/ typeof shareCounts === 'function' && shareCounts({"facebook":10,"twitter":5});"#
    );
}

#[tokio::test]
async fn test_jsonp_validation_error() {
    let router = router_with(&MockCounters::new(), &RecordingLogger::new());

    let response = get(router, "/?networks=myspace&callback=cb").await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body,
        r#"/**/ typeof cb === 'function' && cb({"error":"Unknown network(s) specified: 'myspace'"});"#
    );
}

#[tokio::test]
async fn test_jsonp_server_error() {
    let counters = MockCounters::new().with_outcome(Outcome::Fail(CounterError::Aborted(
        "gone".to_string(),
    )));
    let router = router_with(&counters, &RecordingLogger::new());

    let response = get(
        router,
        "/?networks=facebook&url=https://example.com/&callback=cb",
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        r#"/**/ typeof cb === 'function' && cb({"error":"There was an unknown error."});"#
    );
}

#[tokio::test]
async fn test_jsonp_forbidden() {
    let router = router_with(&MockCounters::new(), &RecordingLogger::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/?callback=cb")
        .body(Body::empty())
        .unwrap();
    let response = send(router, request).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body,
        r#"/**/ typeof cb === 'function' && cb({"error":"Forbidden"});"#
    );
}

#[tokio::test]
async fn test_jsonp_callback_is_sanitized() {
    let router = router_with(&MockCounters::new(), &RecordingLogger::new());

    let response = get(
        router,
        "/?networks=facebook&url=https://example.com/&callback=evil%28%29%3Balert%281%29",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .body
        .starts_with("/**/ typeof evilalert1 === 'function' && evilalert1("));
}

#[tokio::test]
async fn test_jsonp_callback_keeps_namespaced_names() {
    let router = router_with(&MockCounters::new(), &RecordingLogger::new());

    let response = get(
        router,
        "/?networks=facebook&url=https://example.com/&callback=jQuery.cbs%5B0%5D",
    )
    .await;

    assert!(response
        .body
        .starts_with("/**/ typeof jQuery.cbs[0] === 'function' && jQuery.cbs[0]("));
}

#[tokio::test]
async fn test_empty_callback_means_plain_json() {
    let router = router_with(&MockCounters::new(), &RecordingLogger::new());

    let response = get(
        router,
        "/?networks=facebook&url=https://example.com/&callback=",
    )
    .await;

    assert_eq!(response.header("content-type"), Some(JSON_CONTENT_TYPE));
    assert_eq!(response.body, r#"{"facebook":10,"twitter":5}"#);
}
