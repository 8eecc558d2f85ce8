use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub menu_item_id: Uuid,
    #[serde(default)]
    pub sugar_level: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub sugar_level: Option<i32>,
    pub line_total: f64,
    pub image_url: String,
    pub available: bool,
    pub stock: i32,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: i64,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub sugar_level: Option<i32>,
}
