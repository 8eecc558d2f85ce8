use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::listing::{Pagination, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuSortKey {
    Name,
    Price,
    Category,
    Stock,
    #[serde(alias = "createdAt")]
    CreatedAt,
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: Option<MenuSortKey>,
    #[serde(default)]
    pub direction: SortDirection,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl MenuQuery {
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

#[derive(Debug, Serialize)]
pub struct MenuItemView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub category_id: Uuid,
    /// Stored object path, `None` when the item has no image.
    pub image: Option<String>,
    pub image_url: String,
    pub available: bool,
    pub featured: bool,
    pub stock: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct MenuListResponse {
    pub items: Vec<MenuItemView>,
    pub categories: Vec<String>,
    /// Matches before paging.
    pub total: usize,
}

/// Body of the admin add/edit forms.
#[derive(Debug, Deserialize)]
pub struct MenuItemInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub new_category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub featured: bool,
    pub stock: Option<i64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub path: String,
    pub url: String,
}
