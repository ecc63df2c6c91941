//! Database helpers for credential lookup and student signup.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::role::{Role, StaffRole};
use super::utils::is_unique_violation;

/// Outcome when attempting to create a new student account.
#[derive(Debug)]
pub(crate) enum SignupOutcome {
    Created { id: Uuid },
    Conflict,
}

/// Account data needed to answer a login attempt, normalized across both
/// namespaces.
#[derive(Debug)]
pub(crate) struct LoginAccount {
    pub(crate) id: Uuid,
    pub(crate) name: Option<String>,
    pub(crate) email: String,
    pub(crate) password_digest: String,
    pub(crate) role: Role,
    pub(crate) banned: bool,
}

/// Live staff record as seen by the session resolver.
#[derive(Debug)]
pub(crate) struct StaffIdentity {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) role: StaffRole,
}

/// Live student record as seen by the session resolver.
#[derive(Debug)]
pub(crate) struct StudentIdentity {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) banned: bool,
}

/// Resolve an email collision across namespaces: the staff/admin record wins,
/// deterministically, every time. Pure so the policy is testable on its own.
pub(crate) fn pick_login_account(
    staff: Option<LoginAccount>,
    student: Option<LoginAccount>,
) -> Option<LoginAccount> {
    staff.or(student)
}

/// Look up a login candidate by normalized email.
///
/// Both stores are queried on every attempt so lookup timing does not reveal
/// which namespace (if any) holds the email.
pub(crate) async fn find_login_account(
    pool: &PgPool,
    email_normalized: &str,
) -> Result<Option<LoginAccount>> {
    let staff = find_staff_login(pool, email_normalized).await?;
    let student = find_student_login(pool, email_normalized).await?;
    Ok(pick_login_account(staff, student))
}

async fn find_staff_login(pool: &PgPool, email: &str) -> Result<Option<LoginAccount>> {
    // Removed staff must behave exactly like absent accounts.
    let query = r"
        SELECT id, name, email, password_digest, role
        FROM staff_accounts
        WHERE email = $1
          AND status = 'Active'
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup staff login record")?;

    row.map(|row| {
        let role: String = row.get("role");
        let role = StaffRole::parse(&role)
            .with_context(|| format!("unexpected staff role in store: {role}"))?;
        Ok(LoginAccount {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_digest: row.get("password_digest"),
            role: role.into(),
            banned: false,
        })
    })
    .transpose()
}

async fn find_student_login(pool: &PgPool, email: &str) -> Result<Option<LoginAccount>> {
    // Banned students are still returned: correct credentials on a banned
    // account must produce a distinct outcome, not "invalid credentials".
    let query = r"
        SELECT id, name, email, password_digest, is_banned
        FROM student_accounts
        WHERE email = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup student login record")?;

    Ok(row.map(|row| LoginAccount {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_digest: row.get("password_digest"),
        role: Role::Student,
        banned: row.get("is_banned"),
    }))
}

/// Insert a new student account with an already-hashed digest.
pub(crate) async fn insert_student(
    pool: &PgPool,
    name: &str,
    email_normalized: &str,
    password_digest: &str,
) -> Result<SignupOutcome> {
    let query = r"
        INSERT INTO student_accounts (name, email, password_digest)
        VALUES ($1, $2, $3)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(name)
        .bind(email_normalized)
        .bind(password_digest)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(SignupOutcome::Created { id: row.get("id") }),
        Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert student account"),
    }
}

/// Re-fetch a live staff account by id. Removed rows are filtered so a stale
/// token for a removed account resolves like a deleted one.
pub(crate) async fn fetch_staff_identity(pool: &PgPool, id: Uuid) -> Result<Option<StaffIdentity>> {
    let query = r"
        SELECT id, email, role
        FROM staff_accounts
        WHERE id = $1
          AND status = 'Active'
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch staff account")?;

    row.map(|row| {
        let role: String = row.get("role");
        let role = StaffRole::parse(&role)
            .with_context(|| format!("unexpected staff role in store: {role}"))?;
        Ok(StaffIdentity {
            id: row.get("id"),
            email: row.get("email"),
            role,
        })
    })
    .transpose()
}

/// Re-fetch a live student account by id. Ban state is read fresh on every
/// call; resolution is where bans take effect mid-session.
pub(crate) async fn fetch_student_identity(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<StudentIdentity>> {
    let query = r"
        SELECT id, email, is_banned
        FROM student_accounts
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch student account")?;

    Ok(row.map(|row| StudentIdentity {
        id: row.get("id"),
        email: row.get("email"),
        banned: row.get("is_banned"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(role: Role, email: &str) -> LoginAccount {
        LoginAccount {
            id: Uuid::new_v4(),
            name: None,
            email: email.to_string(),
            password_digest: String::new(),
            role,
            banned: false,
        }
    }

    #[test]
    fn collision_resolves_to_staff() {
        let staff = account(Role::Staff, "shared@vit.edu.in");
        let staff_id = staff.id;
        let student = account(Role::Student, "shared@vit.edu.in");

        let picked = pick_login_account(Some(staff), Some(student)).expect("account");
        assert_eq!(picked.id, staff_id);
        assert_eq!(picked.role, Role::Staff);
    }

    #[test]
    fn collision_resolution_is_stable_across_attempts() {
        for _ in 0..10 {
            let picked = pick_login_account(
                Some(account(Role::Admin, "a@b.co")),
                Some(account(Role::Student, "a@b.co")),
            )
            .expect("account");
            assert_eq!(picked.role, Role::Admin);
        }
    }

    #[test]
    fn single_namespace_wins_by_default() {
        let picked =
            pick_login_account(None, Some(account(Role::Student, "s@b.co"))).expect("account");
        assert_eq!(picked.role, Role::Student);

        let picked =
            pick_login_account(Some(account(Role::Staff, "t@b.co")), None).expect("account");
        assert_eq!(picked.role, Role::Staff);

        assert!(pick_login_account(None, None).is_none());
    }

    #[test]
    fn signup_outcome_debug_names() {
        assert_eq!(format!("{:?}", SignupOutcome::Conflict), "Conflict");
    }
}
