use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::api::handlers::auth::principal::require_role;
use crate::api::handlers::auth::role::Role;
use crate::api::handlers::auth::AuthState;

use super::storage::{delete_student, list_students, set_student_ban};
use super::types::{StudentBanRequest, StudentView};

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server error".to_string(),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/admin/students",
    responses(
        (status = 200, description = "All student accounts, banned included", body = [StudentView], content_type = "application/json"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn students_list(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    match list_students(&pool).await {
        Ok(records) => {
            let views: Vec<StudentView> = records.into_iter().map(StudentView::from).collect();
            Json(views).into_response()
        }
        Err(err) => {
            error!("Failed to list student accounts: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    put,
    path = "/v1/admin/students/{id}/ban",
    request_body = StudentBanRequest,
    responses(
        (status = 200, description = "Ban state updated"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No student account with that id"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn student_ban(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    payload: Option<Json<StudentBanRequest>>,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    match set_student_ban(&pool, id, request.ban).await {
        Ok(true) => {
            let message = if request.ban {
                "Student banned"
            } else {
                "Student unbanned"
            };
            (StatusCode::OK, message.to_string()).into_response()
        }
        Ok(false) => (StatusCode::NOT_FOUND, "Student not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to update student ban state: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/v1/admin/students/{id}",
    responses(
        (status = 200, description = "Student account deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No student account with that id"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn student_delete(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    match delete_student(&pool, id).await {
        Ok(true) => (StatusCode::OK, "Student deleted".to_string()).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Student not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete student account: {err}");
            server_error()
        }
    }
}
