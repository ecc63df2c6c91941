use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::types::{Availability, Category, MenuFilter};

#[derive(Debug)]
pub(crate) struct MenuItemRecord {
    pub(crate) id: Uuid,
    pub(crate) item_name: String,
    pub(crate) price: f64,
    pub(crate) category: Category,
    pub(crate) description: Option<String>,
    pub(crate) availability: Availability,
    pub(crate) created_by: String,
    pub(crate) last_modified_by: Option<String>,
    pub(crate) updated_at: chrono::DateTime<chrono::Utc>,
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<MenuItemRecord> {
    let category: String = row.get("category");
    let availability: String = row.get("availability");
    Ok(MenuItemRecord {
        id: row.get("id"),
        item_name: row.get("item_name"),
        price: row.get("price"),
        category: Category::parse(&category)
            .with_context(|| format!("Unexpected category '{category}' in store"))?,
        description: row.get("description"),
        availability: Availability::parse(&availability)
            .with_context(|| format!("Unexpected availability '{availability}' in store"))?,
        created_by: row.get("created_by"),
        last_modified_by: row.get("last_modified_by"),
        updated_at: row.get("updated_at"),
    })
}

pub(crate) async fn insert_item(
    pool: &PgPool,
    item_name: &str,
    price: f64,
    category: Category,
    description: Option<&str>,
    availability: Availability,
    created_by: &str,
) -> Result<Uuid> {
    let query = "INSERT INTO menu_items \
                 (item_name, price, category, description, availability, created_by) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    let row = sqlx::query(query)
        .bind(item_name)
        .bind(price)
        .bind(category.as_str())
        .bind(description)
        .bind(availability.as_str())
        .bind(created_by)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("Failed to insert menu item")?;

    Ok(row.get("id"))
}

/// Staff/admin view: every active item regardless of stock state.
pub(crate) async fn list_items(pool: &PgPool) -> Result<Vec<MenuItemRecord>> {
    let query = "SELECT id, item_name, price, category, description, availability, \
                 created_by, last_modified_by, updated_at \
                 FROM menu_items WHERE is_active ORDER BY item_name";

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
        .context("Failed to list menu items")?;

    rows.iter().map(record_from_row).collect()
}

/// Student view: active, in-stock items with optional category and name
/// filters. Null filter parameters match everything.
pub(crate) async fn list_student_items(
    pool: &PgPool,
    filter: &MenuFilter,
) -> Result<Vec<MenuItemRecord>> {
    let query = "SELECT id, item_name, price, category, description, availability, \
                 created_by, last_modified_by, updated_at \
                 FROM menu_items \
                 WHERE is_active AND availability = 'In Stock' \
                 AND ($1::text IS NULL OR category = $1) \
                 AND ($2::text IS NULL OR item_name ILIKE '%' || $2 || '%') \
                 ORDER BY item_name";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );

    let rows = sqlx::query(query)
        .bind(filter.category.map(Category::as_str))
        .bind(filter.search.as_deref())
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("Failed to list student menu items")?;

    rows.iter().map(record_from_row).collect()
}

/// Returns `false` when no active item with that id exists.
pub(crate) async fn update_item(
    pool: &PgPool,
    id: Uuid,
    item_name: Option<&str>,
    price: Option<f64>,
    category: Option<Category>,
    description: Option<&str>,
    availability: Option<Availability>,
    modified_by: &str,
) -> Result<bool> {
    let query = "UPDATE menu_items SET \
                 item_name = COALESCE($2, item_name), \
                 price = COALESCE($3, price), \
                 category = COALESCE($4, category), \
                 description = COALESCE($5, description), \
                 availability = COALESCE($6, availability), \
                 last_modified_by = $7, \
                 updated_at = now() \
                 WHERE id = $1 AND is_active";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );

    let result = sqlx::query(query)
        .bind(id)
        .bind(item_name)
        .bind(price)
        .bind(category.map(Category::as_str))
        .bind(description)
        .bind(availability.map(Availability::as_str))
        .bind(modified_by)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to update menu item")?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn set_availability(
    pool: &PgPool,
    id: Uuid,
    availability: Availability,
    modified_by: &str,
) -> Result<bool> {
    let query = "UPDATE menu_items SET availability = $2, last_modified_by = $3, \
                 updated_at = now() WHERE id = $1 AND is_active";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );

    let result = sqlx::query(query)
        .bind(id)
        .bind(availability.as_str())
        .bind(modified_by)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to update menu item availability")?;

    Ok(result.rows_affected() > 0)
}

/// Soft delete: the row is kept for audit, the item leaves every view.
pub(crate) async fn deactivate_item(pool: &PgPool, id: Uuid, modified_by: &str) -> Result<bool> {
    let query = "UPDATE menu_items SET is_active = FALSE, last_modified_by = $2, \
                 updated_at = now() WHERE id = $1 AND is_active";

    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );

    let result = sqlx::query(query)
        .bind(id)
        .bind(modified_by)
        .execute(pool)
        .instrument(span)
        .await
        .context("Failed to deactivate menu item")?;

    Ok(result.rows_affected() > 0)
}
