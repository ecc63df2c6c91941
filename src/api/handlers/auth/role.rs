//! Closed role unions used at every authorization dispatch point.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Coarse authorization tier carried in tokens and checked by route gates.
///
/// Adding a variant is a compile-time-visible change: every dispatch point
/// matches exhaustively instead of comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Student,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a staff account can hold. Students are a separate namespace and never
/// appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Staff,
}

impl StaffRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }

    /// Parse the database representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }
}

impl From<StaffRole> for Role {
    fn from(role: StaffRole) -> Self {
        match role {
            StaffRole::Admin => Self::Admin,
            StaffRole::Staff => Self::Staff,
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, StaffRole};

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
        assert_eq!(serde_json::to_value(Role::Staff).unwrap(), "staff");
        assert_eq!(serde_json::to_value(Role::Student).unwrap(), "student");
    }

    #[test]
    fn role_round_trips_through_serde() {
        for role in [Role::Admin, Role::Staff, Role::Student] {
            let value = serde_json::to_value(role).unwrap();
            let decoded: Role = serde_json::from_value(value).unwrap();
            assert_eq!(decoded, role);
        }
    }

    #[test]
    fn staff_role_parses_database_values() {
        assert_eq!(StaffRole::parse("admin"), Some(StaffRole::Admin));
        assert_eq!(StaffRole::parse("staff"), Some(StaffRole::Staff));
        assert_eq!(StaffRole::parse("student"), None);
        assert_eq!(StaffRole::parse("Admin"), None);
    }

    #[test]
    fn staff_role_widens_to_role() {
        assert_eq!(Role::from(StaffRole::Admin), Role::Admin);
        assert_eq!(Role::from(StaffRole::Staff), Role::Staff);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(StaffRole::Admin.to_string(), "admin");
    }
}
