//! In-memory menu search, ordering and category derivation.

use super::{dto::MenuSortKey, repo_types::MenuItem};
use crate::listing::{contains_ci, sort_by_key, SortDirection};

/// Category value that matches every item.
pub const ALL_CATEGORIES: &str = "All";
/// Form sentinel asking for a category to be created from `new_category`.
pub const NEW_CATEGORY: &str = "new";

fn matches_category(item: &MenuItem, category: Option<&str>) -> bool {
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        None => true,
        Some(c) if c.eq_ignore_ascii_case(ALL_CATEGORIES) => true,
        Some(c) => item.category == c,
    }
}

/// Items whose name or description contains `query` and whose category is `category`.
/// Input order is kept.
pub fn filter(items: Vec<MenuItem>, query: &str, category: Option<&str>) -> Vec<MenuItem> {
    let query = query.trim();
    items
        .into_iter()
        .filter(|i| contains_ci(&i.name, query) || contains_ci(&i.description, query))
        .filter(|i| matches_category(i, category))
        .collect()
}

pub fn sort(items: &mut [MenuItem], key: MenuSortKey, direction: SortDirection) {
    match key {
        MenuSortKey::Name => sort_by_key(items, direction, |i| i.name.clone()),
        MenuSortKey::Price => sort_by_key(items, direction, |i| i.price),
        MenuSortKey::Category => sort_by_key(items, direction, |i| i.category.clone()),
        MenuSortKey::Stock => sort_by_key(items, direction, |i| i.stock),
        MenuSortKey::CreatedAt => sort_by_key(items, direction, |i| i.created_at),
    }
}

/// `All` followed by each distinct category in first-seen order.
pub fn derive_categories(items: &[MenuItem]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for item in items {
        if !out[1..].iter().any(|c| *c == item.category) {
            out.push(item.category.clone());
        }
    }
    out
}

/// Category choices for the admin forms: the derived list plus the `new` sentinel.
pub fn admin_category_options(items: &[MenuItem]) -> Vec<String> {
    let mut out = derive_categories(items);
    out.push(NEW_CATEGORY.to_string());
    out
}
