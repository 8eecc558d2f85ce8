use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CartLineView, CartView},
    repo::CartStore,
    repo_types::{AddOutcome, CartLineRow, CartRow},
};
use crate::{
    config::StorageConfig,
    error::{ApiError, ApiResult},
    storage,
};

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn validate_sugar_level(level: Option<i32>) -> ApiResult<()> {
    match level {
        Some(l) if !(0..=100).contains(&l) => Err(ApiError::bad_request(
            "Sugar level must be between 0 and 100",
        )),
        _ => Ok(()),
    }
}

pub async fn add_to_cart(
    store: &dyn CartStore,
    user_id: Uuid,
    menu_item_id: Uuid,
    sugar_level: Option<i32>,
) -> ApiResult<CartRow> {
    validate_sugar_level(sugar_level)?;

    match store.add_item(user_id, menu_item_id, sugar_level).await? {
        AddOutcome::Added(row) => {
            info!(%user_id, %menu_item_id, quantity = row.quantity, "cart item added");
            Ok(row)
        }
        AddOutcome::UnknownItem => Err(ApiError::not_found("Menu item not found")),
        AddOutcome::Unavailable => {
            warn!(%user_id, %menu_item_id, "add of unavailable item");
            Err(ApiError::conflict("This item is currently unavailable"))
        }
    }
}

pub async fn update_quantity(
    store: &dyn CartStore,
    user_id: Uuid,
    row_id: Uuid,
    quantity: i32,
) -> ApiResult<CartRow> {
    if quantity < 1 {
        return Err(ApiError::bad_request("Quantity must be at least 1"));
    }
    store
        .set_quantity(user_id, row_id, quantity)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart item not found"))
}

pub async fn remove_item(store: &dyn CartStore, user_id: Uuid, row_id: Uuid) -> ApiResult<()> {
    if !store.remove(user_id, row_id).await? {
        return Err(ApiError::not_found("Cart item not found"));
    }
    Ok(())
}

pub fn cart_view(lines: Vec<CartLineRow>, storage_cfg: &StorageConfig) -> CartView {
    let items: Vec<CartLineView> = lines
        .into_iter()
        .map(|l| CartLineView {
            id: l.id,
            menu_item_id: l.menu_item_id,
            line_total: round_cents(l.price * f64::from(l.quantity)),
            image_url: storage::public_url(storage_cfg, l.image.as_deref()),
            name: l.name,
            unit_price: l.price,
            quantity: l.quantity,
            sugar_level: l.sugar_level,
            available: l.available,
            stock: l.stock,
        })
        .collect();

    let total = round_cents(items.iter().map(|i| i.unit_price * f64::from(i.quantity)).sum());
    let item_count = items.iter().map(|i| i64::from(i.quantity)).sum();
    CartView {
        items,
        item_count,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::repo::MemoryCartStore;
    use crate::state::AppState;

    fn store_with_latte() -> (MemoryCartStore, Uuid) {
        let latte = Uuid::new_v4();
        (
            MemoryCartStore::default().with_item(latte, "Latte", 4.5, true, 10),
            latte,
        )
    }

    #[tokio::test]
    async fn adding_same_item_twice_increments_one_row() {
        let (store, latte) = store_with_latte();
        let user = Uuid::new_v4();

        let first = add_to_cart(&store, user, latte, None).await.unwrap();
        let second = add_to_cart(&store, user, latte, None).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 2);
        let lines = store.list(user).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn carts_are_per_user() {
        let (store, latte) = store_with_latte();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        add_to_cart(&store, alice, latte, None).await.unwrap();
        add_to_cart(&store, bob, latte, Some(50)).await.unwrap();

        assert_eq!(store.list(alice).await.unwrap()[0].quantity, 1);
        assert_eq!(store.list(bob).await.unwrap()[0].sugar_level, Some(50));
    }

    #[tokio::test]
    async fn unknown_and_unavailable_items_are_rejected() {
        let sold_out = Uuid::new_v4();
        let store = MemoryCartStore::default().with_item(sold_out, "Mocha", 5.0, false, 0);
        let user = Uuid::new_v4();

        let err = add_to_cart(&store, user, Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = add_to_cart(&store, user, sold_out, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn sugar_level_must_be_a_percentage() {
        let (store, latte) = store_with_latte();
        let err = add_to_cart(&store, Uuid::new_v4(), latte, Some(120))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn quantity_updates_require_positive_value_and_ownership() {
        let (store, latte) = store_with_latte();
        let (owner, stranger) = (Uuid::new_v4(), Uuid::new_v4());
        let row = add_to_cart(&store, owner, latte, None).await.unwrap();

        let err = update_quantity(&store, owner, row.id, 0).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        let err = update_quantity(&store, stranger, row.id, 3).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let updated = update_quantity(&store, owner, row.id, 3).await.unwrap();
        assert_eq!(updated.quantity, 3);
    }

    #[tokio::test]
    async fn remove_only_touches_own_rows() {
        let (store, latte) = store_with_latte();
        let (owner, stranger) = (Uuid::new_v4(), Uuid::new_v4());
        let row = add_to_cart(&store, owner, latte, None).await.unwrap();

        assert!(remove_item(&store, stranger, row.id).await.is_err());
        remove_item(&store, owner, row.id).await.unwrap();
        assert!(store.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cart_view_totals_lines() {
        let state = AppState::fake();
        let (store, latte) = store_with_latte();
        let user = Uuid::new_v4();
        add_to_cart(&store, user, latte, None).await.unwrap();
        add_to_cart(&store, user, latte, None).await.unwrap();
        add_to_cart(&store, user, latte, None).await.unwrap();

        let view = cart_view(store.list(user).await.unwrap(), &state.config.storage);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, 13.5);
        assert_eq!(view.items[0].line_total, 13.5);
        assert_eq!(view.items[0].image_url, storage::PLACEHOLDER_IMAGE);
        assert_eq!(view.items[0].stock, 10);
    }

    #[test]
    fn round_cents_drops_float_noise() {
        assert_eq!(round_cents(0.1 + 0.2), 0.3);
        assert_eq!(round_cents(12.345678), 12.35);
    }
}
