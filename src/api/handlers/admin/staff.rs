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

use crate::api::handlers::auth::password::hash_password;
use crate::api::handlers::auth::principal::require_role;
use crate::api::handlers::auth::role::Role;
use crate::api::handlers::auth::AuthState;
use crate::api::handlers::auth::utils::{normalize_email, valid_email};

use super::storage::{
    create_staff, list_staff, remove_staff, update_staff, StaffChanges, StaffCreateOutcome,
    StaffMutationOutcome,
};
use super::types::{StaffCreateRequest, StaffUpdateRequest, StaffView};

const DEFAULT_SUBROLE: &str = "Other";

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server error".to_string(),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/v1/admin/staff",
    request_body = StaffCreateRequest,
    responses(
        (status = 201, description = "Staff account created"),
        (status = 400, description = "Missing or invalid fields, or email already registered"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn staff_create(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    payload: Option<Json<StaffCreateRequest>>,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let email = normalize_email(&request.email);

    if email.is_empty() || request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing fields".to_string()).into_response();
    }

    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let digest = match hash_password(&request.password) {
        Ok(digest) => digest,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return server_error();
        }
    };

    let subrole = request.subrole.as_deref().unwrap_or(DEFAULT_SUBROLE);

    match create_staff(
        &pool,
        request.name.as_deref(),
        &email,
        &digest,
        request.role,
        subrole,
    )
    .await
    {
        Ok(StaffCreateOutcome::Created { id }) => {
            (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response()
        }
        Ok(StaffCreateOutcome::Conflict) => {
            (StatusCode::BAD_REQUEST, "Staff already exists".to_string()).into_response()
        }
        Err(err) => {
            error!("Failed to create staff account: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/admin/staff",
    responses(
        (status = 200, description = "Active staff accounts", body = [StaffView], content_type = "application/json"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn staff_list(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    match list_staff(&pool).await {
        Ok(records) => {
            let views: Vec<StaffView> = records.into_iter().map(StaffView::from).collect();
            Json(views).into_response()
        }
        Err(err) => {
            error!("Failed to list staff accounts: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    put,
    path = "/v1/admin/staff/{id}",
    request_body = StaffUpdateRequest,
    responses(
        (status = 200, description = "Staff account updated"),
        (status = 400, description = "Demotion would leave no active admin"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No active staff account with that id"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn staff_update(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    payload: Option<Json<StaffUpdateRequest>>,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let changes = StaffChanges {
        name: request.name,
        role: request.role,
        subrole: request.subrole,
        password: request.password,
    };

    match update_staff(&pool, id, changes).await {
        Ok(StaffMutationOutcome::Applied) => {
            (StatusCode::OK, "Staff updated".to_string()).into_response()
        }
        Ok(StaffMutationOutcome::NotFound) => {
            (StatusCode::NOT_FOUND, "Staff not found".to_string()).into_response()
        }
        Ok(StaffMutationOutcome::LastAdmin) => (
            StatusCode::BAD_REQUEST,
            "Cannot demote the last admin".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to update staff account: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/v1/admin/staff/{id}",
    responses(
        (status = 200, description = "Staff account removed (record retained)"),
        (status = 400, description = "Removal would leave no active admin"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No active staff account with that id"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn staff_remove(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Admin]).await {
        return failure.into_response();
    }

    match remove_staff(&pool, id).await {
        Ok(StaffMutationOutcome::Applied) => {
            (StatusCode::OK, "Staff removed".to_string()).into_response()
        }
        Ok(StaffMutationOutcome::NotFound) => {
            (StatusCode::NOT_FOUND, "Staff not found".to_string()).into_response()
        }
        Ok(StaffMutationOutcome::LastAdmin) => (
            StatusCode::BAD_REQUEST,
            "Cannot remove the last admin".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to remove staff account: {err}");
            server_error()
        }
    }
}
