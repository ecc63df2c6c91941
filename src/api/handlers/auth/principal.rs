//! Per-request identity resolution and role gating.
//!
//! Flow: extract the bearer token, verify signature and expiry,
//! re-fetch the live account record via the role claim, then gate on the
//! route's allow-list. Ban, removal, and deletion are rechecked here on every
//! request, not just at login.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use tracing::error;

use super::role::Role;
use super::state::AuthState;
use super::storage::{fetch_staff_identity, fetch_student_identity, StaffIdentity, StudentIdentity};
use super::token::decode_token;
use super::utils::extract_bearer_token;

/// Authenticated caller context derived from a bearer token and the live
/// account record. Never carries the password digest.
#[derive(Clone, Debug)]
pub struct Identity {
    pub account_id: uuid::Uuid,
    pub email: String,
    pub role: Role,
}

/// Expected, user-facing auth outcomes. Anything else is an internal fault
/// logged at the failure site and surfaced as a generic 500.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthFailure {
    /// No bearer token on the request.
    MissingToken,
    /// Malformed, tampered, or expired token.
    InvalidToken,
    /// Token was valid but its account no longer exists (or staff removed).
    AccountNotFound,
    /// Valid token, live record says banned.
    Banned,
    /// Valid session, role not in the route's allow-list.
    RoleNotAllowed(Role),
    /// Store unreachable or similar; already logged where it happened.
    Internal,
}

impl AuthFailure {
    fn status_message(&self) -> (StatusCode, String) {
        match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Not authorized, no token".to_string(),
            ),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Token invalid".to_string()),
            Self::AccountNotFound => (StatusCode::UNAUTHORIZED, "User not found".to_string()),
            Self::Banned => (StatusCode::FORBIDDEN, "Account banned".to_string()),
            Self::RoleNotAllowed(role) => (
                StatusCode::FORBIDDEN,
                format!("Role '{role}' not authorized"),
            ),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        self.status_message().into_response()
    }
}

/// Decide the fate of a student session from the freshly fetched record.
/// Ban state is live: a banned student is rejected here on every request, no
/// matter how recent the token.
fn resolve_student(student: Option<StudentIdentity>) -> Result<Identity, AuthFailure> {
    match student {
        Some(student) if student.banned => Err(AuthFailure::Banned),
        Some(student) => Ok(Identity {
            account_id: student.id,
            email: student.email,
            role: Role::Student,
        }),
        None => Err(AuthFailure::AccountNotFound),
    }
}

/// Decide the fate of a staff session. The store fetch already filters
/// Removed rows, so a stale token for a removed account arrives here as
/// `None` and resolves exactly like a deleted one. The role comes from the
/// record, never the claim.
fn resolve_staff(staff: Option<StaffIdentity>) -> Result<Identity, AuthFailure> {
    match staff {
        Some(staff) => Ok(Identity {
            account_id: staff.id,
            email: staff.email,
            role: staff.role.into(),
        }),
        None => Err(AuthFailure::AccountNotFound),
    }
}

/// Resolve the request's bearer token against live account state.
///
/// # Errors
/// Returns an [`AuthFailure`] for every rejected request: missing token,
/// invalid/expired token, vanished account, or banned student.
pub async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<Identity, AuthFailure> {
    let token = extract_bearer_token(headers).ok_or(AuthFailure::MissingToken)?;

    let claims = decode_token(state.config().signing_secret(), &token)
        .ok_or(AuthFailure::InvalidToken)?;

    // The role claim picks the store; the effective role comes from the live
    // record so demotions apply immediately.
    match claims.role {
        Role::Student => match fetch_student_identity(pool, claims.sub).await {
            Ok(student) => resolve_student(student),
            Err(err) => {
                error!("Failed to resolve student account: {err}");
                Err(AuthFailure::Internal)
            }
        },
        Role::Admin | Role::Staff => match fetch_staff_identity(pool, claims.sub).await {
            Ok(staff) => resolve_staff(staff),
            Err(err) => {
                error!("Failed to resolve staff account: {err}");
                Err(AuthFailure::Internal)
            }
        },
    }
}

/// Pure role gate: no I/O, just the resolved role against the allow-list.
///
/// # Errors
/// Returns `RoleNotAllowed` when the role is not in the allow-list.
pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), AuthFailure> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AuthFailure::RoleNotAllowed(identity.role))
    }
}

/// Resolution followed by the role gate; the shape every protected handler
/// starts with.
///
/// # Errors
/// Returns any [`require_auth`] failure, or `RoleNotAllowed` from the gate.
pub async fn require_role(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
    allowed: &[Role],
) -> Result<Identity, AuthFailure> {
    let identity = require_auth(headers, pool, state).await?;
    authorize(&identity, allowed)?;
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::header::AUTHORIZATION;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use crate::api::handlers::auth::AuthConfig;
    use crate::api::handlers::auth::token::issue;

    fn state() -> AuthState {
        AuthState::new(AuthConfig::new(SecretString::from("test-secret")))
    }

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")
            .expect("lazy pool")
    }

    fn identity(role: Role) -> Identity {
        Identity {
            account_id: uuid::Uuid::new_v4(),
            email: "who@vit.edu.in".to_string(),
            role,
        }
    }

    fn student(banned: bool) -> StudentIdentity {
        StudentIdentity {
            id: uuid::Uuid::new_v4(),
            email: "asha@vit.edu.in".to_string(),
            banned,
        }
    }

    #[test]
    fn live_student_resolves() {
        let record = student(false);
        let id = record.id;
        let identity = resolve_student(Some(record)).expect("identity");
        assert_eq!(identity.account_id, id);
        assert_eq!(identity.role, Role::Student);
    }

    #[test]
    fn banned_student_is_rejected_despite_a_valid_token() {
        // The record is live and the token was fine; the ban alone decides.
        let result = resolve_student(Some(student(true)));
        assert_eq!(result.unwrap_err(), AuthFailure::Banned);
    }

    #[test]
    fn deleted_student_is_rejected() {
        assert_eq!(
            resolve_student(None).unwrap_err(),
            AuthFailure::AccountNotFound
        );
    }

    #[test]
    fn staff_resolves_with_the_stored_role() {
        let record = StaffIdentity {
            id: uuid::Uuid::new_v4(),
            email: "cook@mensa.app".to_string(),
            role: crate::api::handlers::auth::role::StaffRole::Staff,
        };
        let identity = resolve_staff(Some(record)).expect("identity");
        // A demoted admin holding an admin-claim token gets the live role.
        assert_eq!(identity.role, Role::Staff);
    }

    #[test]
    fn removed_staff_resolves_like_a_deleted_account() {
        // The store filters Removed rows, so resolution only ever sees None.
        assert_eq!(
            resolve_staff(None).unwrap_err(),
            AuthFailure::AccountNotFound
        );
    }

    #[test]
    fn authorize_passes_listed_roles() {
        assert!(authorize(&identity(Role::Admin), &[Role::Admin]).is_ok());
        assert!(authorize(&identity(Role::Staff), &[Role::Staff, Role::Admin]).is_ok());
    }

    #[test]
    fn authorize_rejects_unlisted_roles() {
        let result = authorize(&identity(Role::Student), &[Role::Staff, Role::Admin]);
        assert_eq!(result, Err(AuthFailure::RoleNotAllowed(Role::Student)));
    }

    #[test]
    fn failure_maps_to_expected_statuses() {
        assert_eq!(
            AuthFailure::MissingToken.status_message().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthFailure::InvalidToken.status_message().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthFailure::AccountNotFound.status_message().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthFailure::Banned.status_message().0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthFailure::RoleNotAllowed(Role::Staff).status_message().0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthFailure::Internal.status_message().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn role_mismatch_names_the_role() {
        let (_, message) = AuthFailure::RoleNotAllowed(Role::Student).status_message();
        assert_eq!(message, "Role 'student' not authorized");
    }

    #[tokio::test]
    async fn missing_token_short_circuits() {
        // No database round-trip happens before the header check, so the lazy
        // pool never connects.
        let result = require_auth(&HeaderMap::new(), &lazy_pool(), &state()).await;
        assert_eq!(result.unwrap_err(), AuthFailure::MissingToken);
    }

    #[tokio::test]
    async fn garbage_token_short_circuits() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer junk"));
        let result = require_auth(&headers, &lazy_pool(), &state()).await;
        assert_eq!(result.unwrap_err(), AuthFailure::InvalidToken);
    }

    #[tokio::test]
    async fn foreign_signature_short_circuits() {
        let other_secret = SecretString::from("somebody-else");
        let token = issue(&other_secret, uuid::Uuid::new_v4(), Role::Student, 3600)
            .expect("token");
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );
        let result = require_auth(&headers, &lazy_pool(), &state()).await;
        assert_eq!(result.unwrap_err(), AuthFailure::InvalidToken);
    }
}
