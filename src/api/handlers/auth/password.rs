//! Salted password digests with a fixed work factor.

use anyhow::{Context, Result};

/// Fixed bcrypt work factor. Changing it only affects newly set credentials;
/// stored digests keep their own cost and still verify.
const BCRYPT_COST: u32 = 10;

/// Well-formed digest of a throwaway password. Login verifies against this
/// when no account matches the email, so unknown emails cost the same as wrong
/// passwords and the response reveals nothing about which case occurred.
const DUMMY_DIGEST: &str = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Hash a plaintext credential. Called exactly once whenever a credential is
/// created or changed, never on an already-hashed value.
///
/// # Errors
/// Returns an error if bcrypt fails (e.g. the plaintext exceeds its 72-byte
/// limit).
pub fn hash_password(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, BCRYPT_COST).context("failed to hash password")
}

/// Verify a plaintext against a stored digest. A malformed digest counts as a
/// mismatch rather than a fault.
#[must_use]
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}

/// Burn one verification against the dummy digest (see [`DUMMY_DIGEST`]).
pub fn burn_verification(plaintext: &str) {
    let _ = bcrypt::verify(plaintext, DUMMY_DIGEST);
}

/// Whether a value already looks like a bcrypt digest. Used by bootstrap and
/// update paths as a belt-and-braces check that a digest is never re-hashed.
#[must_use]
pub fn is_bcrypt_digest(value: &str) -> bool {
    value.starts_with("$2a$") || value.starts_with("$2b$") || value.starts_with("$2y$")
}

/// Resolve the digest to persist on an account update.
///
/// Hashes exactly once when a new password is supplied; otherwise returns the
/// stored digest untouched, so re-saving an account without changing its
/// password never re-hashes.
///
/// # Errors
/// Returns an error if hashing the new password fails.
pub fn digest_for_update(current_digest: &str, new_password: Option<&str>) -> Result<String> {
    match new_password {
        Some(plaintext) => hash_password(plaintext),
        None => Ok(current_digest.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let digest = hash_password("tandoori").expect("digest");
        assert!(verify_password("tandoori", &digest));
        assert!(!verify_password("tandoor", &digest));
    }

    #[test]
    fn hashing_twice_salts_differently() {
        let first = hash_password("same-password").expect("digest");
        let second = hash_password("same-password").expect("digest");
        assert_ne!(first, second, "salts must differ");
        assert!(verify_password("same-password", &first));
        assert!(verify_password("same-password", &second));
    }

    #[test]
    fn verify_rejects_malformed_digest() {
        assert!(!verify_password("anything", "not-a-digest"));
    }

    #[test]
    fn digest_for_update_is_idempotent_without_change() {
        let stored = hash_password("original").expect("digest");
        let unchanged = digest_for_update(&stored, None).expect("digest");
        assert_eq!(stored, unchanged, "no password change must not re-hash");
    }

    #[test]
    fn digest_for_update_rehashes_on_change() {
        let stored = hash_password("original").expect("digest");
        let replaced = digest_for_update(&stored, Some("changed")).expect("digest");
        assert_ne!(stored, replaced);
        assert!(verify_password("changed", &replaced));
        assert!(!verify_password("original", &replaced));
    }

    #[test]
    fn bcrypt_digest_detection() {
        let digest = hash_password("x").expect("digest");
        assert!(is_bcrypt_digest(&digest));
        assert!(is_bcrypt_digest(DUMMY_DIGEST));
        assert!(!is_bcrypt_digest("plaintext"));
    }

    #[test]
    fn dummy_digest_is_well_formed() {
        // A malformed constant would silently drop the timing pad.
        assert!(verify_password("password", DUMMY_DIGEST));
        assert!(!verify_password("not-the-password", DUMMY_DIGEST));
    }
}
