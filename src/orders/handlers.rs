use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{OrderListResponse, OrderQuery, OrderView, UpdateStatusRequest},
    repo_types::{Order, OrderStatus},
    services,
};
use crate::{
    auth::extractors::{CurrentAdmin, CurrentCustomer},
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/checkout", post(checkout))
        .route("/orders", get(my_orders))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route(
            "/admin/orders/:id",
            get(get_order).patch(update_status).delete(delete_order),
        )
}

fn order_not_found() -> ApiError {
    ApiError::not_found("Order not found")
}

#[instrument(skip(state))]
pub async fn checkout(
    State(state): State<AppState>,
    CurrentCustomer(user_id): CurrentCustomer,
) -> ApiResult<(StatusCode, Json<OrderView>)> {
    let order = services::checkout(&state.db, user_id).await?;
    Ok((StatusCode::CREATED, Json(services::view(order, None, None))))
}

#[instrument(skip(state))]
pub async fn my_orders(
    State(state): State<AppState>,
    CurrentCustomer(user_id): CurrentCustomer,
) -> ApiResult<Json<Vec<OrderView>>> {
    let orders = Order::list_for_user(&state.db, user_id).await?;
    Ok(Json(
        orders
            .into_iter()
            .map(|o| services::view(o, None, None))
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Json<OrderListResponse>> {
    let orders = Order::list_with_customers(&state.db, None)
        .await?
        .into_iter()
        .map(OrderView::from)
        .collect();
    Ok(Json(services::order_listing(orders, &query)))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderView>> {
    let order = Order::find_with_customer(&state.db, id)
        .await?
        .ok_or_else(order_not_found)?;
    Ok(Json(order.into()))
}

#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<OrderView>> {
    let status: OrderStatus = body.status.parse().map_err(|e| {
        warn!(error = %e, %id, "invalid order status");
        ApiError::bad_request("Invalid order status")
    })?;
    Order::set_status(&state.db, id, status)
        .await?
        .ok_or_else(order_not_found)?;
    info!(%admin_id, order_id = %id, %status, "order status updated");

    let order = Order::find_with_customer(&state.db, id)
        .await?
        .ok_or_else(order_not_found)?;
    Ok(Json(order.into()))
}

#[instrument(skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !Order::delete(&state.db, id).await? {
        return Err(order_not_found());
    }
    info!(%admin_id, order_id = %id, "order deleted");
    Ok(StatusCode::NO_CONTENT)
}
