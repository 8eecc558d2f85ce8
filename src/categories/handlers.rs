use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CategoryInput, CategoryListResponse, CategoryQuery},
    repo_types::Category,
    services,
};
use crate::{
    auth::extractors::CurrentAdmin,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/categories", get(list_categories).post(create_category))
        .route(
            "/admin/categories/:id",
            put(update_category).delete(delete_category),
        )
}

fn duplicate_name(e: sqlx::Error) -> ApiError {
    match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::conflict("A category with this name already exists."),
        other => other,
    }
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<CategoryListResponse>> {
    let rows = Category::list_with_counts(&state.db).await?;
    // summary describes every category, not just the filtered page
    let summary = services::summarize(&rows);
    Ok(Json(CategoryListResponse {
        categories: services::filter_and_sort(rows, &query),
        summary,
    }))
}

#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Json(body): Json<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let new = services::validate(
        &body.name,
        &body.description,
        body.active,
        body.featured,
        body.color.as_deref(),
    )?;
    let category = Category::create(&state.db, &new).await.map_err(duplicate_name)?;
    info!(%admin_id, category_id = %category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state))]
pub async fn update_category(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryInput>,
) -> ApiResult<Json<Category>> {
    let new = services::validate(
        &body.name,
        &body.description,
        body.active,
        body.featured,
        body.color.as_deref(),
    )?;
    let category = Category::update(&state.db, id, &new)
        .await
        .map_err(duplicate_name)?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    info!(%admin_id, category_id = %id, "category updated");
    Ok(Json(category))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let in_use = Category::count_items(&state.db, id).await?;
    if in_use > 0 {
        warn!(%admin_id, category_id = %id, in_use, "category still has menu items");
        return Err(ApiError::conflict(format!(
            "Category still has {in_use} menu item(s). Move or delete them first."
        )));
    }
    if !Category::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Category not found"));
    }
    info!(%admin_id, category_id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
