//! Menu management. Admins own the catalogue, staff flip stock state, and
//! students get a filtered read-only view.

use axum::{
    extract::{Extension, Path, Query},
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

pub(crate) mod storage;
pub(crate) mod types;

use storage::{
    deactivate_item, insert_item, list_items, list_student_items, set_availability, update_item,
};
use types::{
    Availability, AvailabilityRequest, MenuCreateRequest, MenuFilter, MenuItemView,
    MenuUpdateRequest,
};

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server error".to_string(),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/v1/menu",
    request_body = MenuCreateRequest,
    responses(
        (status = 201, description = "Menu item created"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "menu"
)]
pub async fn menu_create(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    payload: Option<Json<MenuCreateRequest>>,
) -> Response {
    let identity = match require_role(&headers, &pool, &state, &[Role::Admin]).await {
        Ok(identity) => identity,
        Err(failure) => return failure.into_response(),
    };

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let item_name = request.item_name.trim();
    if item_name.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing fields".to_string()).into_response();
    }

    if !request.price.is_finite() || request.price < 0.0 {
        return (StatusCode::BAD_REQUEST, "Invalid price".to_string()).into_response();
    }

    let availability = request.availability.unwrap_or(Availability::InStock);

    match insert_item(
        &pool,
        item_name,
        request.price,
        request.category,
        request.description.as_deref(),
        availability,
        &identity.email,
    )
    .await
    {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(err) => {
            error!("Failed to create menu item: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/menu",
    responses(
        (status = 200, description = "All active menu items", body = [MenuItemView], content_type = "application/json"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is a student"),
    ),
    security(("bearer" = [])),
    tag = "menu"
)]
pub async fn menu_list(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    if let Err(failure) =
        require_role(&headers, &pool, &state, &[Role::Admin, Role::Staff]).await
    {
        return failure.into_response();
    }

    match list_items(&pool).await {
        Ok(records) => {
            let views: Vec<MenuItemView> = records.into_iter().map(MenuItemView::from).collect();
            Json(views).into_response()
        }
        Err(err) => {
            error!("Failed to list menu items: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/menu/student",
    params(
        ("category" = Option<String>, Query, description = "Exact category name"),
        ("search" = Option<String>, Query, description = "Substring of the item name"),
    ),
    responses(
        (status = 200, description = "In-stock items matching the filters", body = [MenuItemView], content_type = "application/json"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a student, or is banned"),
    ),
    security(("bearer" = [])),
    tag = "menu"
)]
pub async fn menu_student(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    filter: Option<Query<MenuFilter>>,
) -> Response {
    if let Err(failure) = require_role(&headers, &pool, &state, &[Role::Student]).await {
        return failure.into_response();
    }

    let Query(filter) = filter.unwrap_or_default();

    match list_student_items(&pool, &filter).await {
        Ok(records) => {
            let views: Vec<MenuItemView> = records.into_iter().map(MenuItemView::from).collect();
            Json(views).into_response()
        }
        Err(err) => {
            error!("Failed to list student menu items: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    put,
    path = "/v1/menu/{id}",
    request_body = MenuUpdateRequest,
    responses(
        (status = 200, description = "Menu item updated"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No active item with that id"),
    ),
    security(("bearer" = [])),
    tag = "menu"
)]
pub async fn menu_update(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    payload: Option<Json<MenuUpdateRequest>>,
) -> Response {
    let identity = match require_role(&headers, &pool, &state, &[Role::Admin]).await {
        Ok(identity) => identity,
        Err(failure) => return failure.into_response(),
    };

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if let Some(price) = request.price {
        if !price.is_finite() || price < 0.0 {
            return (StatusCode::BAD_REQUEST, "Invalid price".to_string()).into_response();
        }
    }

    match update_item(
        &pool,
        id,
        request.item_name.as_deref(),
        request.price,
        request.category,
        request.description.as_deref(),
        request.availability,
        &identity.email,
    )
    .await
    {
        Ok(true) => (StatusCode::OK, "Menu item updated".to_string()).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Menu item not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to update menu item: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    put,
    path = "/v1/menu/{id}/availability",
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Stock state updated"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is a student"),
        (status = 404, description = "No active item with that id"),
    ),
    security(("bearer" = [])),
    tag = "menu"
)]
pub async fn menu_availability(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    payload: Option<Json<AvailabilityRequest>>,
) -> Response {
    let identity =
        match require_role(&headers, &pool, &state, &[Role::Admin, Role::Staff]).await {
            Ok(identity) => identity,
            Err(failure) => return failure.into_response(),
        };

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    match set_availability(&pool, id, request.availability, &identity.email).await {
        Ok(true) => (StatusCode::OK, "Availability updated".to_string()).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Menu item not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to update menu item availability: {err}");
            server_error()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/v1/menu/{id}",
    responses(
        (status = 200, description = "Menu item removed from every view"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No active item with that id"),
    ),
    security(("bearer" = [])),
    tag = "menu"
)]
pub async fn menu_delete(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let identity = match require_role(&headers, &pool, &state, &[Role::Admin]).await {
        Ok(identity) => identity,
        Err(failure) => return failure.into_response(),
    };

    match deactivate_item(&pool, id, &identity.email).await {
        Ok(true) => (StatusCode::OK, "Menu item deleted".to_string()).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Menu item not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete menu item: {err}");
            server_error()
        }
    }
}
