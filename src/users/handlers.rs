use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{UserListResponse, UserQuery},
    services,
};
use crate::{
    auth::{
        extractors::CurrentAdmin,
        repo_types::{Admin, User},
    },
    error::{ApiError, ApiResult},
    orders::repo_types::Order,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", delete(delete_user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let (customers, admins, counts) = tokio::try_join!(
        User::list(&state.db),
        Admin::list(&state.db),
        Order::counts_by_user(&state.db),
    )?;
    let counts: HashMap<Uuid, i64> = counts.into_iter().collect();
    let users = services::merge_accounts(customers, admins, &counts);
    Ok(Json(services::user_listing(users, &query)))
}

/// Deletes a customer account. Their cart goes with it; orders are kept.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(%admin_id, user_id = %id, "customer deleted");
    Ok(StatusCode::NO_CONTENT)
}
