//! Request and response payloads for the auth routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

/// Student self-registration payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "asha.rao2023@vit.edu.in")]
    pub email: String,
    #[schema(example = "hunter2hunter2")]
    pub password: String,
}

/// Credentials for any account namespace; the server decides which store
/// the email belongs to.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "asha.rao2023@vit.edu.in")]
    pub email: String,
    pub password: String,
}

/// Returned on successful signup or login. The token goes into the
/// `Authorization: Bearer` header for every subsequent request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// Live session snapshot for the bearer of a valid token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
}
