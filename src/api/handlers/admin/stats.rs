use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::handlers::auth::principal::require_role;
use crate::api::handlers::auth::role::Role;
use crate::api::handlers::auth::AuthState;

use super::storage::fetch_stats;
use super::types::StatsResponse;

#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    responses(
        (status = 200, description = "Headline counts", body = StatsResponse, content_type = "application/json"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn stats(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    match fetch_stats(&pool).await {
        Ok(counts) => Json(StatsResponse::from(counts)).into_response(),
        Err(err) => {
            error!("Failed to fetch stats: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response()
        }
    }
}
