//! OpenAPI document assembly, served through Swagger UI at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::{Contact, InfoBuilder, License};
use utoipa::{Modify, OpenApi};

use super::handlers;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerSecurity),
    paths(
        handlers::health::health,
        handlers::auth::signup::signup,
        handlers::auth::login::login,
        handlers::auth::session::session,
        handlers::admin::stats::stats,
        handlers::admin::staff::staff_create,
        handlers::admin::staff::staff_list,
        handlers::admin::staff::staff_update,
        handlers::admin::staff::staff_remove,
        handlers::admin::students::students_list,
        handlers::admin::students::student_ban,
        handlers::admin::students::student_delete,
        handlers::menu::menu_create,
        handlers::menu::menu_list,
        handlers::menu::menu_student,
        handlers::menu::menu_update,
        handlers::menu::menu_availability,
        handlers::menu::menu_delete,
        handlers::notices::notice_create,
        handlers::notices::notice_list,
        handlers::notices::notice_delete,
        handlers::dashboard::admin_dashboard,
        handlers::dashboard::staff_dashboard,
        handlers::dashboard::student_dashboard,
    ),
    components(schemas(
        handlers::auth::role::Role,
        handlers::auth::role::StaffRole,
        handlers::auth::types::SignupRequest,
        handlers::auth::types::LoginRequest,
        handlers::auth::types::AuthResponse,
        handlers::auth::types::SessionResponse,
        handlers::admin::types::StaffCreateRequest,
        handlers::admin::types::StaffUpdateRequest,
        handlers::admin::types::StudentBanRequest,
        handlers::admin::types::StaffView,
        handlers::admin::types::StudentView,
        handlers::admin::types::StatsResponse,
        handlers::menu::types::Category,
        handlers::menu::types::Availability,
        handlers::menu::types::MenuCreateRequest,
        handlers::menu::types::MenuUpdateRequest,
        handlers::menu::types::AvailabilityRequest,
        handlers::menu::types::MenuItemView,
        handlers::notices::NoticeCreateRequest,
        handlers::notices::NoticeView,
    )),
    tags(
        (name = "auth", description = "Signup, login, and session resolution"),
        (name = "admin", description = "Staff and student administration"),
        (name = "menu", description = "Menu catalogue and stock state"),
        (name = "notices", description = "Notice board"),
        (name = "dashboard", description = "Role-gated landing payloads"),
        (name = "health", description = "Liveness and build info"),
    )
)]
struct ApiDoc;

/// The full document, with the info section taken from Cargo.toml metadata
/// rather than the derive defaults.
#[must_use]
pub fn doc() -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();

    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();
    openapi.info = info;

    openapi
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}
