// ==============================
// tests/integration/auth_flow_tests.rs
// ==============================
//! Register, login and the protected route through the full router
use crate::test_utils::{ann, test_app, test_issuer};
use accounts_common::{AuthResponse, ErrorBody, MessageResponse};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tower::ServiceExt;

async fn post<B: Serialize>(app: &Router, uri: &str, body: &B) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get_protected(app: &Router, token: &str) -> Response {
    let request = Request::builder()
        .uri("/api/protected")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn read<T: DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn login_body(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({ "email": email, "password": password })
}

#[tokio::test]
async fn test_ann_account_lifecycle() {
    let app = test_app();

    // First registration succeeds
    let response = post(&app, "/api/register", &ann()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered: AuthResponse = read(response).await;
    assert_eq!(registered.user.name, "Ann");
    assert_eq!(registered.user.email, "ann@x.com");
    assert_eq!(registered.user.dob.to_string(), "1990-01-01");

    // Same email again
    let response = post(&app, "/api/register", &ann()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read(response).await;
    assert_eq!(body.message, "User already exists");

    // Wrong password
    let response = post(&app, "/api/login", &login_body("ann@x.com", "wrong")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let wrong_password: ErrorBody = read(response).await;
    assert_eq!(wrong_password.message, "Invalid credentials");

    // Correct password yields a fresh token
    let response = post(&app, "/api/login", &login_body("ann@x.com", "hunter2")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let logged_in: AuthResponse = read(response).await;
    assert_eq!(logged_in.user, registered.user);
    assert_ne!(logged_in.token, registered.token);

    // Both tokens open the protected route
    for token in [&registered.token, &logged_in.token] {
        let response = get_protected(&app, token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: MessageResponse = read(response).await;
        assert_eq!(body.message, "This is a protected route");
    }
}

#[tokio::test]
async fn test_unknown_email_matches_wrong_password() {
    let app = test_app();
    post(&app, "/api/register", &ann()).await;

    let wrong_password = post(&app, "/api/login", &login_body("ann@x.com", "nope")).await;
    let unknown_email = post(&app, "/api/login", &login_body("bob@x.com", "hunter2")).await;
    assert_eq!(wrong_password.status(), unknown_email.status());

    let a: ErrorBody = read(wrong_password).await;
    let b: ErrorBody = read(unknown_email).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_response_never_exposes_password() {
    let app = test_app();
    let response = post(&app, "/api/register", &ann()).await;
    let body: serde_json::Value = read(response).await;

    let text = body.to_string();
    assert!(!text.contains("hunter2"));
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_future_date_of_birth_rejected() {
    let app = test_app();
    let mut req = ann();
    req.dob = (Utc::now().date_naive() + Duration::days(2)).to_string();

    let response = post(&app, "/api/register", &req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was stored
    let response = post(&app, "/api/login", &login_body("ann@x.com", "hunter2")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = test_app();
    let response = post(&app, "/api/register", &ann()).await;
    let registered: AuthResponse = read(response).await;

    let issued_at = Utc::now() - Duration::hours(2);
    let stale = test_issuer().issue(registered.user.id, issued_at).unwrap();

    let response = get_protected(&app, &stale).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = read(response).await;
    assert_eq!(body.message, "Token expired");
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    use accounts_backend_lib::auth::{TokenAlgorithm, TokenIssuer};

    let app = test_app();
    let forged = TokenIssuer::new(b"some-other-secret-some-other-secret", TokenAlgorithm::HS256)
        .issue(accounts_common::AccountId::nil(), Utc::now())
        .unwrap();

    let response = get_protected(&app, &forged).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
