use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::password::{burn_verification, verify_password};
use super::state::AuthState;
use super::storage::{find_login_account, LoginAccount};
use super::token::issue;
use super::types::{AuthResponse, LoginRequest};
use super::utils::normalize_email;

/// What a login attempt is allowed to learn. `InvalidCredentials` covers both
/// an unknown email and a wrong password; the caller must render them
/// identically.
#[derive(Debug)]
enum LoginDecision {
    Accept(LoginAccount),
    InvalidCredentials,
    Banned,
}

/// Pure credential check over the (possibly absent) lookup result.
///
/// An absent account still burns one verification against the dummy digest so
/// unknown emails cost the same as wrong passwords. The ban check runs only
/// after the password verifies: wrong credentials on a banned account must
/// not reveal the ban.
fn decide_login(account: Option<LoginAccount>, password: &str) -> LoginDecision {
    let Some(account) = account else {
        burn_verification(password);
        return LoginDecision::InvalidCredentials;
    };

    if !verify_password(password, &account.password_digest) {
        return LoginDecision::InvalidCredentials;
    }

    if account.banned {
        return LoginDecision::Banned;
    }

    LoginDecision::Accept(account)
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = AuthResponse, content_type = "application/json"),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 403, description = "Account banned"),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let email = normalize_email(&request.email);

    let account = match find_login_account(&pool, &email).await {
        Ok(account) => account,
        Err(err) => {
            error!("Failed to look up login account: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response();
        }
    };

    let account = match decide_login(account, &request.password) {
        LoginDecision::Accept(account) => account,
        LoginDecision::InvalidCredentials => {
            return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
        }
        LoginDecision::Banned => {
            return (StatusCode::FORBIDDEN, "Account banned".to_string()).into_response();
        }
    };

    let token = match issue(
        state.config().signing_secret(),
        account.id,
        account.role,
        state.config().token_ttl_seconds(),
    ) {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to issue token: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(AuthResponse {
            id: account.id.to_string(),
            name: account.name,
            email: account.email,
            role: account.role,
            token,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::password::hash_password;
    use crate::api::handlers::auth::role::Role;
    use uuid::Uuid;

    fn account_with(password: &str, role: Role, banned: bool) -> LoginAccount {
        LoginAccount {
            id: Uuid::new_v4(),
            name: Some("Asha".to_string()),
            email: "asha@vit.edu.in".to_string(),
            password_digest: hash_password(password).expect("digest"),
            role,
            banned,
        }
    }

    #[test]
    fn correct_credentials_are_accepted() {
        let decision = decide_login(Some(account_with("hunter2", Role::Student, false)), "hunter2");
        assert!(matches!(decision, LoginDecision::Accept(_)));
    }

    #[test]
    fn unknown_email_and_wrong_password_are_indistinguishable() {
        // Both collapse to the same variant, so the handler cannot help but
        // render the same 401 for either case.
        let unknown = decide_login(None, "whatever");
        let wrong = decide_login(
            Some(account_with("hunter2", Role::Student, false)),
            "not-hunter2",
        );
        assert!(matches!(unknown, LoginDecision::InvalidCredentials));
        assert!(matches!(wrong, LoginDecision::InvalidCredentials));
    }

    #[test]
    fn banned_student_with_correct_credentials_is_distinct() {
        let decision = decide_login(Some(account_with("hunter2", Role::Student, true)), "hunter2");
        assert!(matches!(decision, LoginDecision::Banned));
    }

    #[test]
    fn banned_student_with_wrong_password_reveals_nothing() {
        let decision = decide_login(Some(account_with("hunter2", Role::Student, true)), "guess");
        assert!(matches!(decision, LoginDecision::InvalidCredentials));
    }

    #[test]
    fn removed_staff_behaves_like_an_unknown_email() {
        // The lookup filters Removed staff out before the decision runs, so
        // the decision sees the same input as a never-registered email.
        let decision = decide_login(None, "their-old-password");
        assert!(matches!(decision, LoginDecision::InvalidCredentials));
    }
}
