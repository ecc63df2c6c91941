//! Staff and student administration queries, including the last-admin guard.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::api::handlers::auth::password::digest_for_update;
use crate::api::handlers::auth::role::StaffRole;

/// Result of creating a staff account.
#[derive(Debug)]
pub(crate) enum StaffCreateOutcome {
    Created { id: Uuid },
    Conflict,
}

/// Result of a guarded staff mutation (role change or soft removal).
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum StaffMutationOutcome {
    Applied,
    NotFound,
    LastAdmin,
}

#[derive(Debug)]
pub(crate) struct StaffRecord {
    pub(crate) id: Uuid,
    pub(crate) name: Option<String>,
    pub(crate) email: String,
    pub(crate) role: StaffRole,
    pub(crate) subrole: String,
    pub(crate) created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug)]
pub(crate) struct StudentRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) is_banned: bool,
    pub(crate) created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug)]
pub(crate) struct Stats {
    pub(crate) staff: i64,
    pub(crate) students: i64,
    pub(crate) menu_items: i64,
    pub(crate) notices: i64,
}

/// Fields an admin may change on a staff account. `password` is re-hashed
/// only when present; everything else overwrites in place.
#[derive(Debug, Default)]
pub(crate) struct StaffChanges {
    pub(crate) name: Option<String>,
    pub(crate) role: Option<StaffRole>,
    pub(crate) subrole: Option<String>,
    pub(crate) password: Option<String>,
}

/// The invariant itself, separated from the locking so it can be tested as
/// plain logic: mutating the last Active admin out of the admin pool leaves
/// nobody able to administer the system.
pub(crate) fn would_leave_no_admin(target_is_active_admin: bool, active_admins: usize) -> bool {
    target_is_active_admin && active_admins <= 1
}

pub(crate) async fn create_staff(
    pool: &PgPool,
    name: Option<&str>,
    email: &str,
    digest: &str,
    role: StaffRole,
    subrole: &str,
) -> Result<StaffCreateOutcome> {
    let query = "INSERT INTO staff_accounts (name, email, password_digest, role, subrole) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    let result = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(digest)
        .bind(role.as_str())
        .bind(subrole)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match result {
        Ok(row) => Ok(StaffCreateOutcome::Created { id: row.get("id") }),
        Err(err) if crate::api::handlers::auth::utils::is_unique_violation(&err) => {
            Ok(StaffCreateOutcome::Conflict)
        }
        Err(err) => Err(err).context("Failed to insert staff account"),
    }
}

pub(crate) async fn list_staff(pool: &PgPool) -> Result<Vec<StaffRecord>> {
    let query = "SELECT id, name, email, role, subrole, created_at FROM staff_accounts \
                 WHERE status = 'Active' ORDER BY created_at DESC";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );

    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("Failed to list staff accounts")?;

    rows.into_iter()
        .map(|row| {
            let role: String = row.get("role");
            Ok(StaffRecord {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                role: StaffRole::parse(&role)
                    .with_context(|| format!("Unexpected staff role '{role}' in store"))?,
                subrole: row.get("subrole"),
                created_at: row.get("created_at"),
            })
        })
        .collect()
}

async fn lock_staff_row(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<(StaffRole, bool, String)>> {
    let query = "SELECT role, status, password_digest FROM staff_accounts \
                 WHERE id = $1 FOR UPDATE";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );

    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("Failed to lock staff account")?;

    row.map(|row| {
        let role: String = row.get("role");
        let status: String = row.get("status");
        let digest: String = row.get("password_digest");
        Ok((
            StaffRole::parse(&role)
                .with_context(|| format!("Unexpected staff role '{role}' in store"))?,
            status == "Active",
            digest,
        ))
    })
    .transpose()
}

/// Locks every Active admin row so two concurrent demotions cannot both see a
/// count of two and proceed. Returns the count under lock.
///
/// Lock order invariant: callers take this lock BEFORE any target-row lock,
/// and the rows lock in id order, so guarded mutations serialize on the first
/// admin row instead of deadlocking on crossed target/set waits.
const LOCK_ACTIVE_ADMINS: &str = "SELECT id FROM staff_accounts \
                                  WHERE role = 'admin' AND status = 'Active' \
                                  ORDER BY id FOR UPDATE";

async fn lock_active_admins(tx: &mut Transaction<'_, Postgres>) -> Result<usize> {
    let query = LOCK_ACTIVE_ADMINS;

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );

    let rows = sqlx::query(query)
        .fetch_all(&mut **tx)
        .instrument(span)
        .await
        .context("Failed to lock active admin accounts")?;

    Ok(rows.len())
}

/// Apply role/subrole/name/password changes to a staff account. A demotion
/// away from admin runs under the last-admin guard.
pub(crate) async fn update_staff(
    pool: &PgPool,
    id: Uuid,
    changes: StaffChanges,
) -> Result<StaffMutationOutcome> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    // Admin set before target row, always in that order (see lock_active_admins).
    let active_admins = match changes.role {
        Some(StaffRole::Staff) => Some(lock_active_admins(&mut tx).await?),
        _ => None,
    };

    let Some((current_role, active, current_digest)) = lock_staff_row(&mut tx, id).await? else {
        return Ok(StaffMutationOutcome::NotFound);
    };

    if !active {
        return Ok(StaffMutationOutcome::NotFound);
    }

    let demoting = current_role == StaffRole::Admin
        && matches!(changes.role, Some(StaffRole::Staff));

    if demoting {
        if let Some(active_admins) = active_admins {
            if would_leave_no_admin(true, active_admins) {
                return Ok(StaffMutationOutcome::LastAdmin);
            }
        }
    }

    let digest = digest_for_update(&current_digest, changes.password.as_deref())?;
    let role = changes.role.unwrap_or(current_role);

    let query = "UPDATE staff_accounts SET \
                 name = COALESCE($2, name), \
                 role = $3, \
                 subrole = COALESCE($4, subrole), \
                 password_digest = $5, \
                 updated_at = now() \
                 WHERE id = $1";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );

    sqlx::query(query)
        .bind(id)
        .bind(changes.name)
        .bind(role.as_str())
        .bind(changes.subrole)
        .bind(digest)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("Failed to update staff account")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(StaffMutationOutcome::Applied)
}

/// Soft-remove a staff account. Removing an Active admin runs under the same
/// guard as demotion: the row survives, but it leaves the admin pool.
pub(crate) async fn remove_staff(pool: &PgPool, id: Uuid) -> Result<StaffMutationOutcome> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    // The target's role is unknown until its row is read, so take the admin
    // set lock up front to preserve the set-before-target lock order.
    let active_admins = lock_active_admins(&mut tx).await?;

    let Some((current_role, active, _)) = lock_staff_row(&mut tx, id).await? else {
        return Ok(StaffMutationOutcome::NotFound);
    };

    if !active {
        return Ok(StaffMutationOutcome::NotFound);
    }

    if current_role == StaffRole::Admin && would_leave_no_admin(true, active_admins) {
        return Ok(StaffMutationOutcome::LastAdmin);
    }

    let query = "UPDATE staff_accounts SET status = 'Removed', updated_at = now() WHERE id = $1";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );

    sqlx::query(query)
        .bind(id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("Failed to remove staff account")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(StaffMutationOutcome::Applied)
}

pub(crate) async fn list_students(pool: &PgPool) -> Result<Vec<StudentRecord>> {
    let query = "SELECT id, name, email, is_banned, created_at FROM student_accounts \
                 ORDER BY created_at DESC";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );

    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("Failed to list student accounts")?;

    Ok(rows
        .into_iter()
        .map(|row| StudentRecord {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            is_banned: row.get("is_banned"),
            created_at: row.get("created_at"),
        })
        .collect())
}

/// Returns `false` when no student with that id exists.
pub(crate) async fn set_student_ban(pool: &PgPool, id: Uuid, banned: bool) -> Result<bool> {
    let query = "UPDATE student_accounts SET is_banned = $2, updated_at = now() WHERE id = $1";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );

    let result = sqlx::query(query)
        .bind(id)
        .bind(banned)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to update student ban state")?;

    Ok(result.rows_affected() > 0)
}

/// Hard delete; the student namespace has no soft-delete state.
pub(crate) async fn delete_student(pool: &PgPool, id: Uuid) -> Result<bool> {
    let query = "DELETE FROM student_accounts WHERE id = $1";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );

    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to delete student account")?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn fetch_stats(pool: &PgPool) -> Result<Stats> {
    let query = "SELECT \
                 (SELECT COUNT(*) FROM staff_accounts WHERE status = 'Active') AS staff, \
                 (SELECT COUNT(*) FROM student_accounts) AS students, \
                 (SELECT COUNT(*) FROM menu_items WHERE is_active) AS menu_items, \
                 (SELECT COUNT(*) FROM notices) AS notices";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );

    let row = sqlx::query(query)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("Failed to fetch stats")?;

    Ok(Stats {
        staff: row.get("staff"),
        students: row.get("students"),
        menu_items: row.get("menu_items"),
        notices: row.get("notices"),
    })
}

/// Count of Active admin accounts, used by the startup seeding path.
pub(crate) async fn count_active_admins(pool: &PgPool) -> Result<i64> {
    let query =
        "SELECT COUNT(*) AS admins FROM staff_accounts WHERE role = 'admin' AND status = 'Active'";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );

    let row = sqlx::query(query)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("Failed to count active admins")?;

    Ok(row.get("admins"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_trips_only_on_the_last_active_admin() {
        assert!(would_leave_no_admin(true, 1));
        assert!(would_leave_no_admin(true, 0));
        assert!(!would_leave_no_admin(true, 2));
        assert!(!would_leave_no_admin(false, 1));
        assert!(!would_leave_no_admin(false, 0));
    }

    #[test]
    fn admin_set_lock_acquires_rows_in_id_order() {
        // Concurrent guarded mutations all walk the admin rows in the same
        // order, so two demotions targeting different admins queue instead of
        // waiting on each other.
        let order_by = LOCK_ACTIVE_ADMINS
            .find("ORDER BY id")
            .expect("set lock must impose a row order");
        let for_update = LOCK_ACTIVE_ADMINS
            .find("FOR UPDATE")
            .expect("set lock must take row locks");
        assert!(order_by < for_update);
    }

    #[test]
    fn changes_default_to_no_op() {
        let changes = StaffChanges::default();
        assert!(changes.name.is_none());
        assert!(changes.role.is_none());
        assert!(changes.subrole.is_none());
        assert!(changes.password.is_none());
    }

    #[test]
    fn mutation_outcomes_are_distinguishable() {
        assert_ne!(StaffMutationOutcome::Applied, StaffMutationOutcome::LastAdmin);
        assert_ne!(StaffMutationOutcome::NotFound, StaffMutationOutcome::LastAdmin);
    }
}
