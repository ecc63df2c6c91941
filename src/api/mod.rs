//! HTTP surface: pool setup, migrations, startup seeding, routing, and the
//! tower middleware stack.

use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request},
    routing::{delete, get, post, put},
    Extension, Router,
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use url::Url;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
pub mod openapi;

use handlers::auth::{AuthConfig, AuthState};
use handlers::{admin, auth, dashboard, health, menu, notices, root};

/// Startup seed for the first admin account, from CLI/env.
#[derive(Debug)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: SecretString,
}

fn v1_routes() -> Router {
    Router::new()
        .route("/v1/auth/signup", post(auth::signup))
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/session", get(auth::session))
        .route("/v1/admin/stats", get(admin::stats))
        .route(
            "/v1/admin/staff",
            get(admin::staff_list).post(admin::staff_create),
        )
        .route(
            "/v1/admin/staff/:id",
            put(admin::staff_update).delete(admin::staff_remove),
        )
        .route("/v1/admin/students", get(admin::students_list))
        .route("/v1/admin/students/:id/ban", put(admin::student_ban))
        .route("/v1/admin/students/:id", delete(admin::student_delete))
        .route("/v1/menu", get(menu::menu_list).post(menu::menu_create))
        .route("/v1/menu/student", get(menu::menu_student))
        .route(
            "/v1/menu/:id",
            put(menu::menu_update).delete(menu::menu_delete),
        )
        .route("/v1/menu/:id/availability", put(menu::menu_availability))
        .route(
            "/v1/notices",
            get(notices::notice_list).post(notices::notice_create),
        )
        .route("/v1/notices/:id", delete(notices::notice_delete))
        .route("/v1/dashboard/admin", get(dashboard::admin_dashboard))
        .route("/v1/dashboard/staff", get(dashboard::staff_dashboard))
        .route("/v1/dashboard/student", get(dashboard::student_dashboard))
}

/// Derive an exact CORS origin from the configured frontend base URL, so a
/// URL with a path still yields a valid `Origin` value.
fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

fn cors_layer(frontend_base_url: Option<&str>) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    // No configured frontend means permissive CORS (local development).
    match frontend_base_url {
        Some(base_url) => Ok(cors.allow_origin(frontend_origin(base_url)?)),
        None => Ok(cors.allow_origin(Any)),
    }
}

/// Connect, migrate, seed, and serve until the process is stopped.
///
/// # Errors
/// Returns an error when the database is unreachable, migrations fail,
/// bootstrap seeding fails, or the listener cannot bind.
pub async fn new(
    port: u16,
    dsn: String,
    frontend_origin: Option<String>,
    auth_config: AuthConfig,
    bootstrap_admin: Option<BootstrapAdmin>,
) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    if let Some(seed) = &bootstrap_admin {
        admin::bootstrap_admin(&pool, seed).await?;
    }

    let state = Arc::new(AuthState::new(auth_config));

    let app = v1_routes()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::doc()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors_layer(frontend_origin.as_deref())?)
                .layer(Extension(state))
                .layer(Extension(pool)),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_strips_paths_and_keeps_ports() {
        let origin = frontend_origin("https://canteen.example.edu/app/").expect("origin");
        assert_eq!(origin, "https://canteen.example.edu");

        let origin = frontend_origin("http://localhost:5173").expect("origin");
        assert_eq!(origin, "http://localhost:5173");
    }

    #[test]
    fn frontend_origin_rejects_garbage() {
        assert!(frontend_origin("not a url").is_err());
        assert!(frontend_origin("file:///tmp").is_err(), "no host");
    }

    #[test]
    fn cors_builds_with_and_without_an_origin() {
        assert!(cors_layer(Some("https://canteen.example.edu")).is_ok());
        assert!(cors_layer(None).is_ok());
        assert!(cors_layer(Some("not a url")).is_err());
    }

    #[test]
    fn route_table_builds() {
        let _router: Router = v1_routes();
    }
}
