use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::repo_types::MenuItem;

const SELECT_JOINED: &str = r#"
    SELECT m.id, m.name, m.description, m.price, m.category_id, c.name AS category,
           m.image, m.available, m.featured, m.stock, m.created_at, m.updated_at
"#;

/// Validated fields written by the admin add/edit forms.
pub struct MenuItemWrite<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub category_id: Uuid,
    pub image: Option<&'a str>,
    pub available: bool,
    pub featured: bool,
    pub stock: i32,
}

impl MenuItem {
    /// Every item, ordered by name.
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<MenuItem>> {
        let rows = sqlx::query_as::<_, MenuItem>(&format!(
            r#"{SELECT_JOINED}
              FROM menu_items m
              JOIN categories c ON c.id = m.category_id
             ORDER BY m.name
            "#
        ))
        .fetch_all(db)
        .await
        .context("list menu items")?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MenuItem>> {
        let row = sqlx::query_as::<_, MenuItem>(&format!(
            r#"{SELECT_JOINED}
              FROM menu_items m
              JOIN categories c ON c.id = m.category_id
             WHERE m.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find menu item")?;
        Ok(row)
    }

    pub async fn create<'e>(
        db: impl PgExecutor<'e>,
        item: &MenuItemWrite<'_>,
    ) -> Result<MenuItem, sqlx::Error> {
        sqlx::query_as::<_, MenuItem>(&format!(
            r#"
            WITH m AS (
                INSERT INTO menu_items
                    (name, description, price, category_id, image, available, featured, stock)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            {SELECT_JOINED}
              FROM m
              JOIN categories c ON c.id = m.category_id
            "#
        ))
        .bind(item.name)
        .bind(item.description)
        .bind(item.price)
        .bind(item.category_id)
        .bind(item.image)
        .bind(item.available)
        .bind(item.featured)
        .bind(item.stock)
        .fetch_one(db)
        .await
    }

    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
        item: &MenuItemWrite<'_>,
    ) -> Result<Option<MenuItem>, sqlx::Error> {
        sqlx::query_as::<_, MenuItem>(&format!(
            r#"
            WITH m AS (
                UPDATE menu_items
                   SET name = $2, description = $3, price = $4, category_id = $5,
                       image = $6, available = $7, featured = $8, stock = $9,
                       updated_at = now()
                 WHERE id = $1
                RETURNING *
            )
            {SELECT_JOINED}
              FROM m
              JOIN categories c ON c.id = m.category_id
            "#
        ))
        .bind(id)
        .bind(item.name)
        .bind(item.description)
        .bind(item.price)
        .bind(item.category_id)
        .bind(item.image)
        .bind(item.available)
        .bind(item.featured)
        .bind(item.stock)
        .fetch_optional(db)
        .await
    }

    /// Deletes the item; `Some(image)` when a row was removed.
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<Option<Option<String>>, sqlx::Error> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("DELETE FROM menu_items WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(row.map(|(image,)| image))
    }
}
