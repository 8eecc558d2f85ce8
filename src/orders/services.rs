use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{OrderListResponse, OrderQuery, OrderSortKey, OrderView, StatusCounts, StatusFilter},
    repo,
    repo_types::{CheckoutLine, Order, OrderLine, OrderStatus, OrderWithCustomer},
};
use crate::{
    cart::services::round_cents,
    error::{ApiError, ApiResult},
    listing::{contains_ci, sort_by_key},
};

/// Turns locked cart lines into order lines and the order total.
pub fn price_checkout(lines: &[CheckoutLine]) -> ApiResult<(Vec<OrderLine>, f64)> {
    if lines.is_empty() {
        return Err(ApiError::bad_request("Your cart is empty"));
    }
    if let Some(l) = lines.iter().find(|l| !l.available) {
        return Err(ApiError::conflict(format!("{} is currently unavailable", l.name)));
    }
    if let Some(l) = lines.iter().find(|l| l.quantity > l.stock) {
        return Err(ApiError::conflict(format!(
            "Only {} left of {}",
            l.stock.max(0),
            l.name
        )));
    }

    let order_lines: Vec<OrderLine> = lines
        .iter()
        .map(|l| OrderLine {
            menu_item_id: l.menu_item_id,
            name: l.name.clone(),
            unit_price: l.price,
            quantity: l.quantity,
            sugar_level: l.sugar_level,
        })
        .collect();
    let total = order_total(&order_lines);
    Ok((order_lines, total))
}

pub fn order_total(lines: &[OrderLine]) -> f64 {
    round_cents(
        lines
            .iter()
            .map(|l| l.unit_price * f64::from(l.quantity))
            .sum(),
    )
}

/// Places an order from the user's cart in one transaction.
pub async fn checkout(db: &PgPool, user_id: Uuid) -> ApiResult<Order> {
    let mut tx = db.begin().await.context("begin checkout")?;

    let lines = repo::lock_cart(&mut tx, user_id).await?;
    let (order_lines, total) = price_checkout(&lines).map_err(|e| {
        warn!(%user_id, error = %e, "checkout rejected");
        e
    })?;

    for line in &order_lines {
        repo::take_stock(&mut tx, line.menu_item_id, line.quantity).await?;
    }
    let order = repo::insert_order(&mut tx, user_id, &order_lines, total).await?;
    repo::clear_cart(&mut tx, user_id).await?;

    tx.commit().await.context("commit checkout")?;
    info!(%user_id, order_id = %order.id, total, lines = order_lines.len(), "order placed");
    Ok(order)
}

pub fn view(order: Order, customer_name: Option<String>, customer_email: Option<String>) -> OrderView {
    let Order {
        id,
        user_id,
        items,
        total,
        status,
        created_at,
    } = order;
    let items = items.0;
    OrderView {
        id,
        user_id,
        customer_name,
        customer_email,
        item_count: items.iter().map(|l| i64::from(l.quantity)).sum(),
        items,
        total,
        status,
        created_at,
    }
}

impl From<OrderWithCustomer> for OrderView {
    fn from(o: OrderWithCustomer) -> Self {
        view(o.order, o.customer_name, o.customer_email)
    }
}

fn matches_search(o: &OrderView, q: &str) -> bool {
    q.is_empty()
        || contains_ci(&o.id.to_string(), q)
        || o.customer_name.as_deref().is_some_and(|n| contains_ci(n, q))
        || o.customer_email.as_deref().is_some_and(|e| contains_ci(e, q))
        || o.items.iter().any(|l| contains_ci(&l.name, q))
}

/// Counts per status; raw values are normalized so legacy rows land in `pending`.
pub fn status_counts<'a, I>(rows: I) -> StatusCounts
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut counts = StatusCounts::default();
    for (raw, n) in rows {
        match raw.parse::<OrderStatus>() {
            Ok(OrderStatus::Pending) => counts.pending += n,
            Ok(OrderStatus::Completed) => counts.completed += n,
            Ok(OrderStatus::Cancelled) => counts.cancelled += n,
            Err(e) => warn!(error = %e, "skipping order status"),
        }
    }
    counts
}

/// Search, status filter, sort and page over orders already in newest-first order.
pub fn order_listing(orders: Vec<OrderView>, query: &OrderQuery) -> OrderListResponse {
    let summary = status_counts(orders.iter().map(|o| (o.status.as_str(), 1)));

    let q = query.q.trim();
    let mut matched: Vec<OrderView> = orders
        .into_iter()
        .filter(|o| matches_search(o, q))
        .filter(|o| match query.status {
            StatusFilter::All => true,
            StatusFilter::Only(s) => o.status == s,
        })
        .collect();

    match query.sort {
        Some(OrderSortKey::CreatedAt) => sort_by_key(&mut matched, query.direction, |o| o.created_at),
        Some(OrderSortKey::Total) => sort_by_key(&mut matched, query.direction, |o| o.total),
        Some(OrderSortKey::Status) => sort_by_key(&mut matched, query.direction, |o| o.status.as_str()),
        None => {}
    }

    let total = matched.len();
    OrderListResponse {
        orders: query.page().apply(matched),
        total,
        summary,
    }
}
