use serde::{Deserialize, Serialize};

use super::repo_types::CategoryWithCount;
use crate::listing::SortDirection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySortKey {
    #[default]
    Name,
    #[serde(alias = "itemCount")]
    ItemCount,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: Option<CategorySortKey>,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub total: usize,
    pub active: usize,
    pub featured: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryWithCount>,
    pub summary: CategorySummary,
}
