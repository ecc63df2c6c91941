//! Menu payloads and the closed category/availability vocabularies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::storage::MenuItemRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Snack,
    Beverage,
    #[serde(rename = "Main Course")]
    MainCourse,
    Desserts,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snack => "Snack",
            Self::Beverage => "Beverage",
            Self::MainCourse => "Main Course",
            Self::Desserts => "Desserts",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Snack" => Some(Self::Snack),
            "Beverage" => Some(Self::Beverage),
            "Main Course" => Some(Self::MainCourse),
            "Desserts" => Some(Self::Desserts),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Availability {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl Availability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "In Stock" => Some(Self::InStock),
            "Out of Stock" => Some(Self::OutOfStock),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuCreateRequest {
    #[schema(example = "Masala Dosa")]
    pub item_name: String,
    #[schema(example = 60.0)]
    pub price: f64,
    pub category: Category,
    pub description: Option<String>,
    pub availability: Option<Availability>,
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuUpdateRequest {
    pub item_name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub availability: Option<Availability>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityRequest {
    pub availability: Availability,
}

/// Query filters for the student-facing menu view.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MenuFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemView {
    pub id: String,
    pub item_name: String,
    pub price: f64,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub availability: Availability,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    pub updated_at: String,
}

impl From<MenuItemRecord> for MenuItemView {
    fn from(record: MenuItemRecord) -> Self {
        Self {
            id: record.id.to_string(),
            item_name: record.item_name,
            price: record.price,
            category: record.category,
            description: record.description,
            availability: record.availability,
            created_by: record.created_by,
            last_modified_by: record.last_modified_by,
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}
