use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{OrderLine, OrderStatus};
use crate::listing::{Pagination, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortKey {
    #[serde(alias = "createdAt", alias = "date")]
    CreatedAt,
    Total,
    Status,
}

/// `all` or one status; `processing` selects pending orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.trim().is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        raw.parse()
            .map(StatusFilter::Only)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort: Option<OrderSortKey>,
    #[serde(default)]
    pub direction: SortDirection,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderQuery {
    pub fn page(&self) -> Pagination {
        let mut page = Pagination::default();
        if let Some(limit) = self.limit {
            page.limit = limit;
        }
        if let Some(offset) = self.offset {
            page.offset = offset;
        }
        page
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<OrderLine>,
    pub item_count: i64,
    pub total: f64,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderView>,
    pub total: usize,
    pub summary: StatusCounts,
}
