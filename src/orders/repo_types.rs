use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Order lifecycle state. The legacy `processing` value reads as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "processing" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = UnknownStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchased line, snapshotted into `orders.items` at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: Uuid,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_level: Option<i32>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub items: Json<Vec<OrderLine>>,
    pub total: f64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub created_at: OffsetDateTime,
}

/// Order joined with the customer who placed it, if they still exist.
#[derive(Debug, Clone, FromRow)]
pub struct OrderWithCustomer {
    #[sqlx(flatten)]
    pub order: Order,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

/// Cart row locked for checkout, with the current menu data.
#[derive(Debug, Clone, FromRow)]
pub struct CheckoutLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub sugar_level: Option<i32>,
    pub name: String,
    pub price: f64,
    pub available: bool,
    pub stock: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_reads_as_pending() {
        assert_eq!("processing".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!(
            OrderStatus::try_from("Completed".to_string()).unwrap(),
            OrderStatus::Completed
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn order_line_skips_missing_sugar_level() {
        let line = OrderLine {
            menu_item_id: Uuid::nil(),
            name: "Latte".into(),
            unit_price: 4.5,
            quantity: 2,
            sugar_level: None,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("sugar_level").is_none());
        let back: OrderLine = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }
}
