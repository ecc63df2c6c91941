//! Notice board: admins publish and retract, every authenticated role reads.

use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{error, info_span, Instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::principal::require_role;
use super::auth::role::Role;
use super::auth::AuthState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct NoticeCreateRequest {
    #[schema(example = "Diwali closure")]
    pub title: String,
    pub content: String,
    /// Defaults to today when omitted.
    pub published_on: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub published_on: String,
    pub created_by: String,
}

async fn insert_notice(
    pool: &PgPool,
    title: &str,
    content: &str,
    published_on: NaiveDate,
    created_by: Uuid,
) -> Result<Uuid> {
    let query = "INSERT INTO notices (title, content, published_on, created_by) \
                 VALUES ($1, $2, $3, $4) RETURNING id";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    let row = sqlx::query(query)
        .bind(title)
        .bind(content)
        .bind(published_on)
        .bind(created_by)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("Failed to insert notice")?;

    Ok(row.get("id"))
}

async fn list_notices(pool: &PgPool) -> Result<Vec<NoticeView>> {
    let query = "SELECT id, title, content, published_on, created_by FROM notices \
                 ORDER BY published_on DESC, created_at DESC";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );

    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("Failed to list notices")?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let id: Uuid = row.get("id");
            let published_on: NaiveDate = row.get("published_on");
            let created_by: Uuid = row.get("created_by");
            NoticeView {
                id: id.to_string(),
                title: row.get("title"),
                content: row.get("content"),
                published_on: published_on.to_string(),
                created_by: created_by.to_string(),
            }
        })
        .collect())
}

async fn remove_notice(pool: &PgPool, id: Uuid) -> Result<bool> {
    let query = "DELETE FROM notices WHERE id = $1";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );

    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to delete notice")?;

    Ok(result.rows_affected() > 0)
}

#[utoipa::path(
    post,
    path = "/v1/notices",
    request_body = NoticeCreateRequest,
    responses(
        (status = 201, description = "Notice published"),
        (status = 400, description = "Missing or empty fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "notices"
)]
pub async fn notice_create(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    payload: Option<Json<NoticeCreateRequest>>,
) -> Response {
    let identity = match require_role(&headers, &pool, &state, &[Role::Admin]).await {
        Ok(identity) => identity,
        Err(failure) => return failure.into_response(),
    };

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let title = request.title.trim();
    let content = request.content.trim();
    if title.is_empty() || content.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing fields".to_string()).into_response();
    }

    let published_on = request
        .published_on
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    match insert_notice(&pool, title, content, published_on, identity.account_id).await {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(err) => {
            error!("Failed to create notice: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/notices",
    responses(
        (status = 200, description = "All notices, newest first", body = [NoticeView], content_type = "application/json"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "notices"
)]
pub async fn notice_list(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    if let Err(failure) = require_role(
        &headers,
        &pool,
        &state,
        &[Role::Admin, Role::Staff, Role::Student],
    )
    .await
    {
        return failure.into_response();
    }

    match list_notices(&pool).await {
        Ok(notices) => Json(notices).into_response(),
        Err(err) => {
            error!("Failed to list notices: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/v1/notices/{id}",
    responses(
        (status = 200, description = "Notice deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No notice with that id"),
    ),
    security(("bearer" = [])),
    tag = "notices"
)]
pub async fn notice_delete(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    match remove_notice(&pool, id).await {
        Ok(true) => (StatusCode::OK, "Notice deleted".to_string()).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Notice not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete notice: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_the_date() {
        let request: NoticeCreateRequest =
            serde_json::from_str(r#"{"title":"Closed","content":"Holiday"}"#).expect("payload");
        assert!(request.published_on.is_none());
    }

    #[test]
    fn create_request_parses_iso_dates() {
        let request: NoticeCreateRequest = serde_json::from_str(
            r#"{"title":"Closed","content":"Holiday","published_on":"2026-11-09"}"#,
        )
        .expect("payload");
        assert_eq!(
            request.published_on,
            NaiveDate::from_ymd_opt(2026, 11, 9)
        );
    }
}
