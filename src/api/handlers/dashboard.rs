//! Role-gated landing payloads, one per role. Thin by design: the interesting
//! part is that each route exercises the full resolve-then-gate pipeline.

use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::auth::principal::require_role;
use super::auth::role::Role;
use super::auth::AuthState;

fn greeting(identity: &super::auth::principal::Identity, audience: &str) -> Response {
    Json(json!({
        "message": format!("Welcome to the {audience} dashboard"),
        "email": identity.email,
        "role": identity.role,
    }))
    .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/dashboard/admin",
    responses(
        (status = 200, description = "Admin greeting"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn admin_dashboard(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    match require_role(&headers, &pool, &state, &[Role::Admin]).await {
        Ok(identity) => greeting(&identity, "admin"),
        Err(failure) => failure.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/dashboard/staff",
    responses(
        (status = 200, description = "Staff greeting"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not staff"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn staff_dashboard(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    match require_role(&headers, &pool, &state, &[Role::Staff, Role::Admin]).await {
        Ok(identity) => greeting(&identity, "staff"),
        Err(failure) => failure.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/dashboard/student",
    responses(
        (status = 200, description = "Student greeting"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a student, or is banned"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn student_dashboard(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    match require_role(&headers, &pool, &state, &[Role::Student]).await {
        Ok(identity) => greeting(&identity, "student"),
        Err(failure) => failure.into_response(),
    }
}
