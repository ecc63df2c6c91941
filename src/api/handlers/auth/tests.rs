//! Handler-level tests that exercise validation before any database access.
//! The lazy pool never connects, so every assertion here must be reachable
//! without a round-trip.

use axum::{extract::Extension, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use http_body_util::BodyExt;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use super::{login::login, session::session, signup::signup, AuthConfig, AuthState};
use crate::api::handlers::auth::types::{LoginRequest, SignupRequest};

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/postgres")
        .expect("lazy pool")
}

fn state() -> Arc<AuthState> {
    Arc::new(AuthState::new(AuthConfig::new(SecretString::from(
        "handler-test-secret",
    ))))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn signup_without_payload_is_rejected() {
    let response = signup(Extension(lazy_pool()), Extension(state()), None)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing payload");
}

#[tokio::test]
async fn signup_with_blank_fields_is_rejected() {
    let payload = SignupRequest {
        name: "   ".to_string(),
        email: "asha@vit.edu.in".to_string(),
        password: "pw".to_string(),
    };
    let response = signup(Extension(lazy_pool()), Extension(state()), Some(Json(payload)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing fields");
}

#[tokio::test]
async fn signup_with_bad_email_is_rejected() {
    let payload = SignupRequest {
        name: "Asha".to_string(),
        email: "not-an-email".to_string(),
        password: "pw".to_string(),
    };
    let response = signup(Extension(lazy_pool()), Extension(state()), Some(Json(payload)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid email");
}

#[tokio::test]
async fn signup_normalizes_email_before_validating() {
    // Uppercase plus surrounding whitespace still fails only on the blank
    // password, proving normalization happened before the email check.
    let payload = SignupRequest {
        name: "Asha".to_string(),
        email: "  ASHA@VIT.EDU.IN  ".to_string(),
        password: String::new(),
    };
    let response = signup(Extension(lazy_pool()), Extension(state()), Some(Json(payload)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing fields");
}

#[tokio::test]
async fn login_without_payload_is_rejected() {
    let response = login(Extension(lazy_pool()), Extension(state()), None)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing payload");
}

#[tokio::test]
async fn login_with_unreachable_store_is_a_server_error() {
    // The lookup happens first, so a dead pool surfaces as a generic 500
    // rather than leaking anything about the credentials.
    let payload = LoginRequest {
        email: "asha@vit.edu.in".to_string(),
        password: "pw".to_string(),
    };
    let response = login(Extension(lazy_pool()), Extension(state()), Some(Json(payload)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Server error");
}

#[tokio::test]
async fn session_without_token_is_unauthorized() {
    let response = session(Extension(lazy_pool()), Extension(state()), HeaderMap::new())
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Not authorized, no token");
}
