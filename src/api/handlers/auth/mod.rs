//! Auth handlers and supporting modules.
//!
//! This module covers credential verification, bearer token issuance, and
//! per-request identity resolution.
//!
//! ## Account Namespaces
//!
//! Staff/admin accounts and student accounts are disjoint stores. Login
//! queries both on every attempt and deterministically resolves an email
//! collision to the staff record (see [`storage::pick_login_account`]).
//!
//! ## Live Re-validation
//!
//! A bearer token only proves who the caller was at issuance. Every protected
//! request re-fetches the account record, so a ban, removal, deletion, or role
//! change takes effect on the next request rather than at token expiry.

pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod principal;
pub(crate) mod role;
pub(crate) mod session;
pub(crate) mod signup;
mod state;
pub(crate) mod storage;
pub(crate) mod token;
pub(crate) mod types;
pub(crate) mod utils;

pub use state::{AuthConfig, AuthState};

pub(crate) use login::login;
pub(crate) use session::session;
pub(crate) use signup::signup;

#[cfg(test)]
mod tests;
