use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::password::hash_password;
use super::role::Role;
use super::state::AuthState;
use super::storage::{insert_student, SignupOutcome};
use super::token::issue;
use super::types::{AuthResponse, SignupRequest};
use super::utils::{normalize_email, valid_email};

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Student account created", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Missing or invalid fields, or email already registered"),
    ),
    tag = "auth"
)]
pub async fn signup(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let name = request.name.trim().to_string();
    let email = normalize_email(&request.email);

    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing fields".to_string()).into_response();
    }

    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let digest = match hash_password(&request.password) {
        Ok(digest) => digest,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response();
        }
    };

    let id = match insert_student(&pool, &name, &email, &digest).await {
        Ok(SignupOutcome::Created { id }) => id,
        Ok(SignupOutcome::Conflict) => {
            return (
                StatusCode::BAD_REQUEST,
                "Student already exists".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            error!("Failed to create student account: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response();
        }
    };

    let token = match issue(
        state.config().signing_secret(),
        id,
        Role::Student,
        state.config().token_ttl_seconds(),
    ) {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to issue token: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(AuthResponse {
            id: id.to_string(),
            name: Some(name),
            email,
            role: Role::Student,
            token,
        }),
    )
        .into_response()
}
