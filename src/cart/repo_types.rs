use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row of `cart_items`: one per (user, menu item) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub sugar_level: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Cart row joined with the menu item it points at.
#[derive(Debug, Clone, FromRow)]
pub struct CartLineRow {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub sugar_level: Option<i32>,
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
    pub available: bool,
    pub stock: i32,
}

/// Result of adding a menu item to a cart.
#[derive(Debug, Clone)]
pub enum AddOutcome {
    Added(CartRow),
    UnknownItem,
    Unavailable,
}
