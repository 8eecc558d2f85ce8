use lazy_static::lazy_static;
use regex::Regex;

use super::{
    dto::{CategoryQuery, CategorySortKey, CategorySummary},
    repo::NewCategory,
    repo_types::CategoryWithCount,
};
use crate::{
    error::{ApiError, ApiResult},
    listing::{contains_ci, sort_by_key},
};

pub const DEFAULT_COLOR: &str = "#7d5a3c";

fn is_hex_color(s: &str) -> bool {
    lazy_static! {
        static ref HEX_RE: Regex = Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap();
    }
    HEX_RE.is_match(s)
}

/// Trimmed, validated category fields ready for insert/update.
pub fn validate<'a>(
    name: &'a str,
    description: &'a str,
    active: bool,
    featured: bool,
    color: Option<&'a str>,
) -> ApiResult<NewCategory<'a>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Category name is required."));
    }
    let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) if is_hex_color(c) => c,
        Some(_) => return Err(ApiError::bad_request("Color must be a hex value like #7d5a3c.")),
        None => DEFAULT_COLOR,
    };
    Ok(NewCategory {
        name,
        description: description.trim(),
        active,
        featured,
        color,
    })
}

pub fn filter_and_sort(
    mut rows: Vec<CategoryWithCount>,
    query: &CategoryQuery,
) -> Vec<CategoryWithCount> {
    let q = query.q.trim();
    rows.retain(|c| contains_ci(&c.category.name, q) || contains_ci(&c.category.description, q));
    match query.sort {
        Some(CategorySortKey::Name) => {
            sort_by_key(&mut rows, query.direction, |c| c.category.name.to_lowercase())
        }
        Some(CategorySortKey::ItemCount) => sort_by_key(&mut rows, query.direction, |c| c.item_count),
        None => {}
    }
    rows
}

pub fn summarize(rows: &[CategoryWithCount]) -> CategorySummary {
    CategorySummary {
        total: rows.len(),
        active: rows.iter().filter(|c| c.category.active).count(),
        featured: rows.iter().filter(|c| c.category.featured).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::repo_types::Category;
    use crate::listing::SortDirection;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn cat(name: &str, description: &str, items: i64, active: bool, featured: bool) -> CategoryWithCount {
        CategoryWithCount {
            category: Category {
                id: Uuid::new_v4(),
                name: name.into(),
                description: description.into(),
                active,
                featured,
                color: DEFAULT_COLOR.into(),
                created_at: OffsetDateTime::now_utc(),
                updated_at: OffsetDateTime::now_utc(),
            },
            item_count: items,
        }
    }

    fn sample() -> Vec<CategoryWithCount> {
        vec![
            cat("Hot Coffee", "Freshly brewed hot coffee drinks", 15, true, true),
            cat("Pastries", "Freshly baked pastries", 10, true, false),
            cat("Seasonal", "Limited time offerings", 4, false, false),
            cat("Cold Brew", "Cold brewed coffee and iced drinks", 12, true, true),
        ]
    }

    #[test]
    fn search_matches_name_or_description() {
        let query = CategoryQuery {
            q: "COFFEE".into(),
            ..Default::default()
        };
        let names: Vec<_> = filter_and_sort(sample(), &query)
            .into_iter()
            .map(|c| c.category.name)
            .collect();
        assert_eq!(names, vec!["Hot Coffee", "Cold Brew"]);
    }

    #[test]
    fn sorts_by_item_count_descending() {
        let query = CategoryQuery {
            sort: Some(CategorySortKey::ItemCount),
            direction: SortDirection::Desc,
            ..Default::default()
        };
        let counts: Vec<_> = filter_and_sort(sample(), &query)
            .into_iter()
            .map(|c| c.item_count)
            .collect();
        assert_eq!(counts, vec![15, 12, 10, 4]);
    }

    #[test]
    fn summary_counts_flags() {
        assert_eq!(
            summarize(&sample()),
            CategorySummary {
                total: 4,
                active: 3,
                featured: 2
            }
        );
    }

    #[test]
    fn validate_trims_and_defaults_color() {
        let c = validate("  Desserts ", " Sweet treats ", true, false, None).unwrap();
        assert_eq!(c.name, "Desserts");
        assert_eq!(c.description, "Sweet treats");
        assert_eq!(c.color, DEFAULT_COLOR);
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_color() {
        let err = validate("   ", "", true, false, None).unwrap_err();
        assert_eq!(err.to_string(), "Category name is required.");
        assert!(validate("Tea", "", true, false, Some("brown")).is_err());
        assert!(validate("Tea", "", true, false, Some("#abc")).is_ok());
    }
}
