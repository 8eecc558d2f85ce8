use anyhow::Context;
use sqlx::{types::Json, PgConnection, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{CheckoutLine, Order, OrderLine, OrderStatus, OrderWithCustomer};

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.items, o.total, o.status, o.created_at";

impl Order {
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.user_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list orders for user")?;
        Ok(rows)
    }

    /// Orders with customer details, newest first. `limit` of `None` means all.
    pub async fn list_with_customers(
        db: &PgPool,
        limit: Option<i64>,
    ) -> anyhow::Result<Vec<OrderWithCustomer>> {
        let rows = sqlx::query_as::<_, OrderWithCustomer>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}, u.full_name AS customer_name, u.email AS customer_email
              FROM orders o
              LEFT JOIN users u ON u.id = o.user_id
             ORDER BY o.created_at DESC
             LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(db)
        .await
        .context("list orders")?;
        Ok(rows)
    }

    pub async fn find_with_customer(
        db: &PgPool,
        id: Uuid,
    ) -> anyhow::Result<Option<OrderWithCustomer>> {
        let row = sqlx::query_as::<_, OrderWithCustomer>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}, u.full_name AS customer_name, u.email AS customer_email
              FROM orders o
              LEFT JOIN users u ON u.id = o.user_id
             WHERE o.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find order")?;
        Ok(row)
    }

    pub async fn set_status(
        db: &PgPool,
        id: Uuid,
        status: OrderStatus,
    ) -> anyhow::Result<Option<Order>> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders o SET status = $2 WHERE o.id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(db)
        .await
        .context("update order status")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete order")?;
        Ok(res.rows_affected() > 0)
    }

    /// Creation times of orders placed at or after `since`.
    pub async fn created_since(
        db: &PgPool,
        since: OffsetDateTime,
    ) -> anyhow::Result<Vec<OffsetDateTime>> {
        let rows: Vec<(OffsetDateTime,)> =
            sqlx::query_as("SELECT created_at FROM orders WHERE created_at >= $1")
                .bind(since)
                .fetch_all(db)
                .await
                .context("orders since")?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    /// `(created_at, total)` of completed orders in `[from, to)`.
    pub async fn completed_totals_between(
        db: &PgPool,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> anyhow::Result<Vec<(OffsetDateTime, f64)>> {
        let rows = sqlx::query_as(
            r#"
            SELECT created_at, total
              FROM orders
             WHERE status = 'completed' AND created_at >= $1 AND created_at < $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await
        .context("completed order totals")?;
        Ok(rows)
    }

    /// Line items of every completed order, oldest first.
    pub async fn completed_lines(db: &PgPool) -> anyhow::Result<Vec<Vec<OrderLine>>> {
        let rows: Vec<(Json<Vec<OrderLine>>,)> = sqlx::query_as(
            "SELECT items FROM orders WHERE status = 'completed' ORDER BY created_at",
        )
        .fetch_all(db)
        .await
        .context("completed order lines")?;
        Ok(rows.into_iter().map(|(Json(lines),)| lines).collect())
    }

    /// Raw status values with their counts; legacy values are folded by the caller.
    pub async fn status_counts(db: &PgPool) -> anyhow::Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(db)
            .await
            .context("order status counts")?;
        Ok(rows)
    }

    /// Number of orders per customer.
    pub async fn counts_by_user(db: &PgPool) -> anyhow::Result<Vec<(Uuid, i64)>> {
        let rows = sqlx::query_as(
            "SELECT user_id, COUNT(*) FROM orders WHERE user_id IS NOT NULL GROUP BY user_id",
        )
        .fetch_all(db)
        .await
        .context("order counts by user")?;
        Ok(rows)
    }
}

// Checkout steps. All run on the caller's transaction.

/// Locks and returns the user's cart joined with the menu, oldest line first.
pub async fn lock_cart(conn: &mut PgConnection, user_id: Uuid) -> anyhow::Result<Vec<CheckoutLine>> {
    let rows = sqlx::query_as::<_, CheckoutLine>(
        r#"
        SELECT c.menu_item_id, c.quantity, c.sugar_level,
               m.name, m.price, m.available, m.stock
          FROM cart_items c
          JOIN menu_items m ON m.id = c.menu_item_id
         WHERE c.user_id = $1
         ORDER BY c.created_at
           FOR UPDATE OF c, m
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
    .context("lock cart for checkout")?;
    Ok(rows)
}

pub async fn take_stock(conn: &mut PgConnection, menu_item_id: Uuid, quantity: i32) -> anyhow::Result<()> {
    sqlx::query("UPDATE menu_items SET stock = stock - $2, updated_at = now() WHERE id = $1")
        .bind(menu_item_id)
        .bind(quantity)
        .execute(conn)
        .await
        .context("decrement stock")?;
    Ok(())
}

pub async fn insert_order(
    conn: &mut PgConnection,
    user_id: Uuid,
    lines: &[OrderLine],
    total: f64,
) -> anyhow::Result<Order> {
    let row = sqlx::query_as::<_, Order>(&format!(
        r#"
        INSERT INTO orders AS o (user_id, items, total, status)
        VALUES ($1, $2, $3, 'pending')
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(Json(lines))
    .bind(total)
    .fetch_one(conn)
    .await
    .context("insert order")?;
    Ok(row)
}

pub async fn clear_cart(conn: &mut PgConnection, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(conn)
        .await
        .context("clear cart")?;
    Ok(())
}
