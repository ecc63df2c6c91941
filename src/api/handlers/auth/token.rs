//! Signed bearer tokens encoding identity and role.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// Claims carried by a bearer token. The role claim only selects which account
/// store the resolver consults; the effective role always comes from the live
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Mint a signed token for the account, valid for `ttl_seconds` from now.
///
/// # Errors
/// Returns an error if signing fails.
pub fn issue(secret: &SecretString, account_id: Uuid, role: Role, ttl_seconds: i64) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: account_id,
        role,
        iat: now,
        exp: now + ttl_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .context("failed to sign bearer token")
}

/// Verify signature and expiry, returning the claims on success.
///
/// Malformed, tampered, and expired tokens all collapse to `None`; callers
/// must not distinguish them in responses.
#[must_use]
pub fn decode_token(secret: &SecretString, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("unit-test-secret")
    }

    #[test]
    fn issue_then_decode_round_trips() {
        let account_id = Uuid::new_v4();
        let token = issue(&secret(), account_id, Role::Student, 3600).expect("token");
        let claims = decode_token(&secret(), &token).expect("claims");
        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(&secret(), Uuid::new_v4(), Role::Admin, 3600).expect("token");
        let other = SecretString::from("a-different-secret");
        assert!(decode_token(&other, &token).is_none());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = issue(&secret(), Uuid::new_v4(), Role::Staff, 3600).expect("token");
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(decode_token(&secret(), &tampered).is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default validation leeway of 60 seconds.
        let token = issue(&secret(), Uuid::new_v4(), Role::Student, -3600).expect("token");
        assert!(decode_token(&secret(), &token).is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_token(&secret(), "not.a.token").is_none());
        assert!(decode_token(&secret(), "").is_none());
    }
}
