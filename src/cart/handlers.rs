use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{AddToCartRequest, CartItemResponse, CartView, UpdateQuantityRequest},
    repo_types::CartRow,
    services,
};
use crate::{auth::extractors::CurrentCustomer, error::ApiResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/:id", patch(update_item).delete(remove_item))
}

impl From<CartRow> for CartItemResponse {
    fn from(r: CartRow) -> Self {
        Self {
            id: r.id,
            menu_item_id: r.menu_item_id,
            quantity: r.quantity,
            sugar_level: r.sugar_level,
        }
    }
}

#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    CurrentCustomer(user_id): CurrentCustomer,
) -> ApiResult<Json<CartView>> {
    let lines = state.carts.list(user_id).await?;
    Ok(Json(services::cart_view(lines, &state.config.storage)))
}

#[instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    CurrentCustomer(user_id): CurrentCustomer,
    Json(body): Json<AddToCartRequest>,
) -> ApiResult<Json<CartItemResponse>> {
    let row =
        services::add_to_cart(state.carts.as_ref(), user_id, body.menu_item_id, body.sugar_level)
            .await?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    CurrentCustomer(user_id): CurrentCustomer,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateQuantityRequest>,
) -> ApiResult<Json<CartItemResponse>> {
    let row = services::update_quantity(state.carts.as_ref(), user_id, id, body.quantity).await?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentCustomer(user_id): CurrentCustomer,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services::remove_item(state.carts.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
