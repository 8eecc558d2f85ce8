use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{AddOutcome, CartLineRow, CartRow};

/// Persistence for shopping carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Adds one unit of `menu_item_id`, incrementing the existing row if there is one.
    async fn add_item(
        &self,
        user_id: Uuid,
        menu_item_id: Uuid,
        sugar_level: Option<i32>,
    ) -> anyhow::Result<AddOutcome>;

    /// Lines of the user's cart, newest first.
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<CartLineRow>>;

    /// `None` when the row does not exist or belongs to another user.
    async fn set_quantity(
        &self,
        user_id: Uuid,
        row_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<Option<CartRow>>;

    async fn remove(&self, user_id: Uuid, row_id: Uuid) -> anyhow::Result<bool>;
}

/// Postgres carts. `MemoryCartStore` mirrors this behaviour for unit tests;
/// `pg_tests` runs the same cases against a live database.
#[derive(Clone)]
pub struct PgCartStore {
    db: PgPool,
}

impl PgCartStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const CART_ROW_COLUMNS: &str =
    "id, user_id, menu_item_id, quantity, sugar_level, created_at, updated_at";

#[async_trait]
impl CartStore for PgCartStore {
    async fn add_item(
        &self,
        user_id: Uuid,
        menu_item_id: Uuid,
        sugar_level: Option<i32>,
    ) -> anyhow::Result<AddOutcome> {
        // single statement: concurrent adds of the same item can't create duplicate rows
        let row = sqlx::query_as::<_, CartRow>(&format!(
            r#"
            INSERT INTO cart_items (user_id, menu_item_id, quantity, sugar_level)
            SELECT $1, m.id, 1, $3
              FROM menu_items m
             WHERE m.id = $2 AND m.available
            ON CONFLICT (user_id, menu_item_id) DO UPDATE
               SET quantity = cart_items.quantity + 1,
                   sugar_level = COALESCE(EXCLUDED.sugar_level, cart_items.sugar_level),
                   updated_at = now()
            RETURNING {CART_ROW_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(menu_item_id)
        .bind(sugar_level)
        .fetch_optional(&self.db)
        .await
        .context("upsert cart item")?;

        if let Some(row) = row {
            return Ok(AddOutcome::Added(row));
        }

        let exists: Option<(bool,)> =
            sqlx::query_as("SELECT available FROM menu_items WHERE id = $1")
                .bind(menu_item_id)
                .fetch_optional(&self.db)
                .await
                .context("lookup menu item")?;
        Ok(match exists {
            Some(_) => AddOutcome::Unavailable,
            None => AddOutcome::UnknownItem,
        })
    }

    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<CartLineRow>> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT c.id, c.menu_item_id, c.quantity, c.sugar_level,
                   m.name, m.price, m.image, m.available, m.stock
              FROM cart_items c
              JOIN menu_items m ON m.id = c.menu_item_id
             WHERE c.user_id = $1
             ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list cart items")?;
        Ok(rows)
    }

    async fn set_quantity(
        &self,
        user_id: Uuid,
        row_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<Option<CartRow>> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            r#"
            UPDATE cart_items
               SET quantity = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {CART_ROW_COLUMNS}
            "#
        ))
        .bind(row_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(&self.db)
        .await
        .context("update cart quantity")?;
        Ok(row)
    }

    async fn remove(&self, user_id: Uuid, row_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(row_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete cart item")?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
pub use memory::MemoryCartStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::CartStore;
    use crate::cart::repo_types::{AddOutcome, CartLineRow, CartRow};

    #[derive(Debug, Clone)]
    struct MenuEntry {
        name: String,
        price: f64,
        available: bool,
        stock: i32,
    }

    /// In-memory cart store with the same semantics as [`super::PgCartStore`].
    #[derive(Default)]
    pub struct MemoryCartStore {
        menu: Mutex<HashMap<Uuid, MenuEntry>>,
        rows: Mutex<Vec<CartRow>>,
    }

    impl MemoryCartStore {
        pub fn with_item(self, id: Uuid, name: &str, price: f64, available: bool, stock: i32) -> Self {
            self.menu.lock().unwrap().insert(
                id,
                MenuEntry {
                    name: name.to_string(),
                    price,
                    available,
                    stock,
                },
            );
            self
        }
    }

    #[async_trait]
    impl CartStore for MemoryCartStore {
        async fn add_item(
            &self,
            user_id: Uuid,
            menu_item_id: Uuid,
            sugar_level: Option<i32>,
        ) -> anyhow::Result<AddOutcome> {
            match self.menu.lock().unwrap().get(&menu_item_id) {
                None => return Ok(AddOutcome::UnknownItem),
                Some(m) if !m.available => return Ok(AddOutcome::Unavailable),
                Some(_) => {}
            }

            let mut rows = self.rows.lock().unwrap();
            let now = OffsetDateTime::now_utc();
            if let Some(row) = rows
                .iter_mut()
                .find(|r| r.user_id == user_id && r.menu_item_id == menu_item_id)
            {
                row.quantity += 1;
                row.sugar_level = sugar_level.or(row.sugar_level);
                row.updated_at = now;
                return Ok(AddOutcome::Added(row.clone()));
            }

            let row = CartRow {
                id: Uuid::new_v4(),
                user_id,
                menu_item_id,
                quantity: 1,
                sugar_level,
                created_at: now,
                updated_at: now,
            };
            rows.push(row.clone());
            Ok(AddOutcome::Added(row))
        }

        async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<CartLineRow>> {
            let menu = self.menu.lock().unwrap();
            let rows = self.rows.lock().unwrap();
            let mut lines: Vec<CartLineRow> = rows
                .iter()
                .filter(|r| r.user_id == user_id)
                .filter_map(|r| {
                    menu.get(&r.menu_item_id).map(|m| CartLineRow {
                        id: r.id,
                        menu_item_id: r.menu_item_id,
                        quantity: r.quantity,
                        sugar_level: r.sugar_level,
                        name: m.name.clone(),
                        price: m.price,
                        image: None,
                        available: m.available,
                        stock: m.stock,
                    })
                })
                .collect();
            lines.reverse();
            Ok(lines)
        }

        async fn set_quantity(
            &self,
            user_id: Uuid,
            row_id: Uuid,
            quantity: i32,
        ) -> anyhow::Result<Option<CartRow>> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows
                .iter_mut()
                .find(|r| r.id == row_id && r.user_id == user_id)
                .map(|r| {
                    r.quantity = quantity;
                    r.updated_at = OffsetDateTime::now_utc();
                    r.clone()
                }))
        }

        async fn remove(&self, user_id: Uuid, row_id: Uuid) -> anyhow::Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !(r.id == row_id && r.user_id == user_id));
            Ok(rows.len() != before)
        }
    }
}
