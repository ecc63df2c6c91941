//! Payloads for the administration routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::handlers::auth::role::StaffRole;

use super::storage::{StaffRecord, Stats, StudentRecord};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StaffCreateRequest {
    pub name: Option<String>,
    #[schema(example = "ravi.k@mensa.app")]
    pub email: String,
    pub password: String,
    pub role: StaffRole,
    #[schema(example = "Cook")]
    pub subrole: Option<String>,
}

/// All fields optional; omitted fields keep their stored value. A present
/// `password` is the only thing that triggers a re-hash.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StaffUpdateRequest {
    pub name: Option<String>,
    pub role: Option<StaffRole>,
    pub subrole: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StudentBanRequest {
    pub ban: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub role: StaffRole,
    pub subrole: String,
    pub created_at: String,
}

impl From<StaffRecord> for StaffView {
    fn from(record: StaffRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            email: record.email,
            role: record.role,
            subrole: record.subrole,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_banned: bool,
    pub created_at: String,
}

impl From<StudentRecord> for StudentView {
    fn from(record: StudentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            email: record.email,
            is_banned: record.is_banned,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub staff: i64,
    pub students: i64,
    pub menu_items: i64,
    pub notices: i64,
}

impl From<Stats> for StatsResponse {
    fn from(stats: Stats) -> Self {
        Self {
            staff: stats.staff,
            students: stats.students,
            menu_items: stats.menu_items,
            notices: stats.notices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_accepts_partial_payloads() {
        let request: StaffUpdateRequest =
            serde_json::from_str(r#"{"role":"staff"}"#).expect("payload");
        assert_eq!(request.role, Some(StaffRole::Staff));
        assert!(request.subrole.is_none());
        assert!(request.password.is_none());
    }

    #[test]
    fn create_request_rejects_unknown_roles() {
        let result =
            serde_json::from_str::<StaffCreateRequest>(r#"{"email":"a@b.co","password":"pw","role":"student"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn staff_view_renders_rfc3339() {
        let record = StaffRecord {
            id: uuid::Uuid::new_v4(),
            name: None,
            email: "a@b.co".to_string(),
            role: StaffRole::Admin,
            subrole: "Other".to_string(),
            created_at: chrono::Utc::now(),
        };
        let view = StaffView::from(record);
        assert!(view.created_at.contains('T'));
        assert!(view.name.is_none());
    }
}
