use bytes::Bytes;
use tracing::{info, warn};

use super::{
    dto::{MenuItemInput, MenuItemView, MenuListResponse, MenuQuery, UploadedImage},
    filter,
    repo_types::MenuItem,
};
use crate::{
    config::StorageConfig,
    error::{ApiError, ApiResult},
    storage::{self, StorageClient},
};

/// Upload size cap for menu images.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Form fields after trimming and validation, with the category still by name.
#[derive(Debug, PartialEq)]
pub struct ValidMenuItem {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image: Option<String>,
    pub available: bool,
    pub featured: bool,
    pub stock: i32,
}

/// Checks run in the same order for add and edit, first failure wins.
pub fn validate(input: MenuItemInput) -> ApiResult<ValidMenuItem> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required."));
    }

    let mut category = input.category.trim();
    if category == filter::NEW_CATEGORY {
        category = input.new_category.as_deref().map(str::trim).unwrap_or("");
        if category.is_empty() {
            return Err(ApiError::bad_request("New category name is required."));
        }
    }
    if category.is_empty() {
        return Err(ApiError::bad_request("Category is required."));
    }

    let price = match input.price {
        Some(p) if p.is_finite() && p > 0.0 => p,
        _ => return Err(ApiError::bad_request("Please enter a valid price greater than 0.")),
    };

    let stock = input
        .stock
        .filter(|s| *s >= 0)
        .and_then(|s| i32::try_from(s).ok())
        .ok_or_else(|| ApiError::bad_request("Please enter a valid stock number (0 or greater)."))?;

    Ok(ValidMenuItem {
        name: name.to_string(),
        description: input.description.trim().to_string(),
        price,
        category: category.to_string(),
        image: input
            .image
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty()),
        available: input.available,
        featured: input.featured,
        stock,
    })
}

pub fn to_view(item: MenuItem, cfg: &StorageConfig) -> MenuItemView {
    MenuItemView {
        image_url: storage::public_url(cfg, item.image.as_deref()),
        id: item.id,
        name: item.name,
        description: item.description,
        price: item.price,
        category: item.category,
        category_id: item.category_id,
        image: item.image,
        available: item.available,
        featured: item.featured,
        stock: item.stock,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

/// Filters, sorts and pages `items`. Categories are derived from the unfiltered list.
pub fn menu_listing(
    items: Vec<MenuItem>,
    query: &MenuQuery,
    admin: bool,
    cfg: &StorageConfig,
) -> MenuListResponse {
    let categories = if admin {
        filter::admin_category_options(&items)
    } else {
        filter::derive_categories(&items)
    };

    let mut matched = filter::filter(items, &query.q, query.category.as_deref());
    if let Some(key) = query.sort {
        filter::sort(&mut matched, key, query.direction);
    }
    let total = matched.len();
    let items = query
        .page()
        .apply(matched)
        .into_iter()
        .map(|i| to_view(i, cfg))
        .collect();

    MenuListResponse {
        items,
        categories,
        total,
    }
}

pub async fn upload_image(
    storage: &dyn StorageClient,
    cfg: &StorageConfig,
    body: Bytes,
    content_type: &str,
    file_name: Option<&str>,
) -> ApiResult<UploadedImage> {
    if body.is_empty() {
        return Err(ApiError::bad_request("No file selected for upload."));
    }
    if !content_type.starts_with("image/") {
        return Err(ApiError::bad_request("Only image files can be uploaded."));
    }
    if body.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::bad_request("Image is larger than 5 MB."));
    }

    let path = storage::object_key(file_name, content_type);
    let size = body.len();
    storage.put_object(&path, body, content_type).await?;
    info!(%path, size, content_type, "menu image uploaded");

    Ok(UploadedImage {
        url: storage::public_url(cfg, Some(&path)),
        path,
    })
}

/// Deletes a stored image, logging instead of failing.
pub async fn remove_image(storage: &dyn StorageClient, path: Option<&str>) {
    let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
        return;
    };
    if let Err(e) = storage.delete_object(path).await {
        warn!(error = ?e, %path, "failed to delete menu image");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SortDirection;
    use crate::menu::dto::MenuSortKey;
    use crate::menu::filter::tests::item;
    use crate::state::AppState;

    fn input() -> MenuItemInput {
        MenuItemInput {
            name: " Flat White ".into(),
            description: " Velvety ".into(),
            price: Some(4.25),
            category: "Hot Coffee".into(),
            new_category: None,
            image: Some("  ".into()),
            available: true,
            featured: false,
            stock: Some(100),
        }
    }

    fn message(r: ApiResult<ValidMenuItem>) -> String {
        r.unwrap_err().to_string()
    }

    #[test]
    fn valid_input_is_trimmed() {
        let v = validate(input()).unwrap();
        assert_eq!(v.name, "Flat White");
        assert_eq!(v.description, "Velvety");
        assert_eq!(v.category, "Hot Coffee");
        assert_eq!(v.image, None);
        assert_eq!(v.stock, 100);
    }

    #[test]
    fn validation_messages() {
        assert_eq!(
            message(validate(MenuItemInput { name: "  ".into(), ..input() })),
            "Name is required."
        );
        assert_eq!(
            message(validate(MenuItemInput { category: "".into(), ..input() })),
            "Category is required."
        );
        assert_eq!(
            message(validate(MenuItemInput {
                category: "new".into(),
                new_category: Some(" ".into()),
                ..input()
            })),
            "New category name is required."
        );
        for price in [None, Some(0.0), Some(-1.0), Some(f64::NAN)] {
            assert_eq!(
                message(validate(MenuItemInput { price, ..input() })),
                "Please enter a valid price greater than 0."
            );
        }
        for stock in [None, Some(-1), Some(i64::MAX)] {
            assert_eq!(
                message(validate(MenuItemInput { stock, ..input() })),
                "Please enter a valid stock number (0 or greater)."
            );
        }
    }

    #[test]
    fn new_category_sentinel_uses_new_name() {
        let v = validate(MenuItemInput {
            category: "new".into(),
            new_category: Some(" Smoothies ".into()),
            ..input()
        })
        .unwrap();
        assert_eq!(v.category, "Smoothies");
    }

    #[test]
    fn zero_stock_is_allowed() {
        let v = validate(MenuItemInput { stock: Some(0), ..input() }).unwrap();
        assert_eq!(v.stock, 0);
    }

    #[tokio::test]
    async fn listing_pages_after_filtering() {
        let state = AppState::fake();
        let items = vec![
            item("Latte", "Hot Coffee", 4.5),
            item("Cold Brew", "Cold Brew", 5.0),
            item("Mocha", "Hot Coffee", 5.5),
        ];
        let query = MenuQuery {
            category: Some("Hot Coffee".into()),
            sort: Some(MenuSortKey::Price),
            direction: SortDirection::Desc,
            limit: Some(1),
            ..Default::default()
        };
        let out = menu_listing(items, &query, false, &state.config.storage);
        assert_eq!(out.total, 2);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].name, "Mocha");
        assert_eq!(out.items[0].image_url, storage::PLACEHOLDER_IMAGE);
        assert_eq!(out.categories, vec!["All", "Hot Coffee", "Cold Brew"]);
    }

    #[tokio::test]
    async fn upload_returns_path_and_public_url() {
        let state = AppState::fake();
        let up = upload_image(
            state.storage.as_ref(),
            &state.config.storage,
            Bytes::from_static(b"\x89PNG"),
            "image/png",
            Some("latte.png"),
        )
        .await
        .unwrap();
        assert!(up.path.ends_with(".png"));
        assert_eq!(
            up.url,
            format!("http://fake.local/storage/v1/object/public/menu-images/{}", up.path)
        );
    }

    #[tokio::test]
    async fn upload_rejects_empty_and_non_images() {
        let state = AppState::fake();
        let err = upload_image(
            state.storage.as_ref(),
            &state.config.storage,
            Bytes::new(),
            "image/png",
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "No file selected for upload.");

        let err = upload_image(
            state.storage.as_ref(),
            &state.config.storage,
            Bytes::from_static(b"%PDF"),
            "application/pdf",
            Some("menu.pdf"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
