use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use sqlx::PgPool;
use tracing::{error, info_span, Instrument};

use crate::GIT_COMMIT_HASH;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up"),
        (status = 503, description = "Database unreachable"),
    ),
    tag = "health"
)]
pub async fn health(Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
    }));

    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )
    .parse()
    {
        headers.insert("X-App", value);
    }

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = "SELECT 1"
    );

    match sqlx::query("SELECT 1").execute(&pool).instrument(span).await {
        Ok(_) => (StatusCode::OK, headers, body),
        Err(err) => {
            error!("Health check failed: {err}");
            (StatusCode::SERVICE_UNAVAILABLE, headers, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;

    async fn call() -> Response {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")
            .expect("lazy pool");
        health(Extension(pool)).await.into_response()
    }

    #[tokio::test]
    async fn reports_unavailable_without_a_database() {
        let response = call().await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn sets_the_app_header_and_build_body() {
        let response = call().await;
        let app = response
            .headers()
            .get("X-App")
            .and_then(|value| value.to_str().ok())
            .expect("X-App header");
        assert!(app.starts_with(env!("CARGO_PKG_NAME")));

        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
        assert!(body["build"].is_string());
    }
}
