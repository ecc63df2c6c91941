use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::principal::require_auth;
use super::state::AuthState;
use super::types::SessionResponse;

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Live session for the bearer token", body = SessionResponse, content_type = "application/json"),
        (status = 401, description = "Missing or invalid token, or account gone"),
        (status = 403, description = "Account banned"),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn session(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    match require_auth(&headers, &pool, &state).await {
        Ok(identity) => Json(SessionResponse {
            id: identity.account_id.to_string(),
            email: identity.email,
            role: identity.role,
        })
        .into_response(),
        Err(failure) => failure.into_response(),
    }
}
