use super::*;
use axum::body::Body;
use axum::http::Request;
use tower::ServiceExt;

use crate::state::test_helpers::test_app_state;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let resp = app(test_app_state()).oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_requires_session_cookie() {
    for uri in ["/api/auth/me", "/api/transactions", "/api/dashboard", "/api/goals", "/api/settings"] {
        let resp = app(test_app_state()).oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn assistant_requires_session_cookie() {
    let resp = app(test_app_state())
        .oneshot(post_json("/api/ai/chat", r#"{"message":"oi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn request_code_rejects_malformed_email_before_touching_db() {
    let resp = app(test_app_state())
        .oneshot(post_json("/api/auth/email/request-code", r#"{"email":"not-an-email"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_code_rejects_malformed_code() {
    let resp = app(test_app_state())
        .oneshot(post_json("/api/auth/email/verify-code", r#"{"email":"a@b.com","code":"12"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let resp = app(test_app_state()).oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
