//! # Mensa (Canteen Management API)
//!
//! `mensa` is the backend for a role-based canteen: students sign up and
//! browse the menu, staff manage stock, admins manage accounts, the menu, and
//! the notice board.
//!
//! ## Accounts & Roles
//!
//! Accounts live in two disjoint namespaces: staff/admin accounts and student
//! accounts. Roles (`admin`, `staff`, `student`) are coarse authorization
//! tiers; a staff account's `subrole` is a descriptive job title with no
//! authorization effect.
//!
//! - **Email Normalization:** Emails are trimmed and lowercased before any
//!   lookup or insert, so login normalization always matches creation time.
//! - **Soft Deletes:** Removing a staff account flips its status to `Removed`;
//!   the row is retained but never authenticates or counts as an active admin.
//! - **Last Admin:** Demoting or removing the last remaining active admin is
//!   rejected, and the check is taken under row locks so two concurrent
//!   demotions cannot slip past each other.
//!
//! ## Authentication
//!
//! Login issues a signed JWT bearer token valid for 24 hours. Every protected
//! request re-resolves the token against the live account record, so bans,
//! deletions, and role changes take effect immediately instead of at token
//! expiry.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
