//! Startup seeding: ensure at least one Active admin exists.

use anyhow::Result;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::api::handlers::auth::password::{hash_password, is_bcrypt_digest};
use crate::api::handlers::auth::role::StaffRole;
use crate::api::handlers::auth::utils::{normalize_email, valid_email};
use crate::api::BootstrapAdmin;

use super::storage::{count_active_admins, create_staff, StaffCreateOutcome};

/// Create the configured admin account when the store has no Active admin.
/// Runs once at startup, before the listener binds. A no-op when an admin
/// already exists, so restarts are safe.
///
/// # Errors
/// Fails when the store is unreachable or the configured email is unusable;
/// startup aborts in that case rather than running an admin-less service.
pub async fn bootstrap_admin(pool: &PgPool, seed: &BootstrapAdmin) -> Result<()> {
    if count_active_admins(pool).await? > 0 {
        return Ok(());
    }

    let email = normalize_email(&seed.email);
    if !valid_email(&email) {
        anyhow::bail!("Bootstrap admin email '{email}' is not a valid address");
    }

    let password = seed.password.expose_secret();

    // Accept a pre-hashed value so the secret can be provisioned as a digest;
    // hash exactly once otherwise.
    let digest = if is_bcrypt_digest(password) {
        password.to_string()
    } else {
        hash_password(password)?
    };

    match create_staff(pool, None, &email, &digest, StaffRole::Admin, "Other").await? {
        StaffCreateOutcome::Created { id } => {
            info!("Bootstrapped admin account {id} for {email}");
        }
        StaffCreateOutcome::Conflict => {
            // The email exists but is not an Active admin (removed, or demoted).
            warn!("Bootstrap admin email {email} already taken, no admin created");
        }
    }

    Ok(())
}
