use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::repo_types::{Category, CategoryWithCount};

const COLUMNS: &str = "id, name, description, active, featured, color, created_at, updated_at";

#[derive(Debug)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub active: bool,
    pub featured: bool,
    pub color: &'a str,
}

impl Category {
    pub async fn list_with_counts(db: &PgPool) -> anyhow::Result<Vec<CategoryWithCount>> {
        let rows = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT c.id, c.name, c.description, c.active, c.featured, c.color,
                   c.created_at, c.updated_at,
                   COUNT(m.id) AS item_count
              FROM categories c
              LEFT JOIN menu_items m ON m.category_id = c.id
             GROUP BY c.id
             ORDER BY c.name
            "#,
        )
        .fetch_all(db)
        .await
        .context("list categories")?;
        Ok(rows)
    }

    /// Looks up a category by exact name, creating it with defaults when missing.
    pub async fn find_or_create<'e>(db: impl PgExecutor<'e>, name: &str) -> anyhow::Result<Category> {
        // the no-op update makes RETURNING yield the existing row on conflict
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING {COLUMNS}
            "#
        ))
        .bind(name)
        .fetch_one(db)
        .await
        .with_context(|| format!("find or create category {name}"))?;
        Ok(row)
    }

    pub async fn create(db: &PgPool, new: &NewCategory<'_>) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, description, active, featured, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.name)
        .bind(new.description)
        .bind(new.active)
        .bind(new.featured)
        .bind(new.color)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        new: &NewCategory<'_>,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
               SET name = $2, description = $3, active = $4, featured = $5, color = $6,
                   updated_at = now()
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(new.name)
        .bind(new.description)
        .bind(new.active)
        .bind(new.featured)
        .bind(new.color)
        .fetch_optional(db)
        .await
    }

    pub async fn count_items(db: &PgPool, id: Uuid) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM menu_items WHERE category_id = $1")
                .bind(id)
                .fetch_one(db)
                .await
                .context("count category items")?;
        Ok(count)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
