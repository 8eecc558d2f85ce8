//! Search, sort and paging helpers shared by the list endpoints.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ascending")]
    Asc,
    #[serde(alias = "descending")]
    Desc,
}

/// Case-insensitive substring match; an empty needle matches everything.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Stable sort by a derived key. Ties keep their input order in both directions.
pub fn sort_by_key<T, K, F>(items: &mut [T], direction: SortDirection, key: F)
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| {
        let ord = key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Pagination {
    /// Slice of `items` selected by this page; out-of-range offsets give an empty page.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.max(0) as usize;
        let limit = self.limit.clamp(1, 500) as usize;
        items.into_iter().skip(offset).take(limit).collect()
    }
}
