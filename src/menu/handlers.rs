use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{MenuItemInput, MenuItemView, MenuListResponse, MenuQuery, UploadedImage},
    repo::MenuItemWrite,
    repo_types::MenuItem,
    services::{self, ValidMenuItem},
};
use crate::{
    auth::extractors::{CurrentAdmin, CurrentCustomer},
    categories::repo_types::Category,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu))
        .route("/menu/:id", get(get_menu_item))
        .route("/customer/menu", get(customer_menu))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/menu", get(admin_list_menu).post(create_menu_item))
        .route(
            "/admin/menu/:id",
            get(admin_get_menu_item)
                .put(update_menu_item)
                .delete(delete_menu_item),
        )
        .route(
            "/admin/menu/images",
            post(upload_menu_image)
                .layer(DefaultBodyLimit::max(services::MAX_IMAGE_BYTES + 64 * 1024)),
        )
}

fn item_not_found() -> ApiError {
    ApiError::not_found("Menu item not found")
}

#[instrument(skip(state))]
pub async fn list_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Json<MenuListResponse>> {
    let items = MenuItem::list(&state.db).await?;
    Ok(Json(services::menu_listing(
        items,
        &query,
        false,
        &state.config.storage,
    )))
}

#[instrument(skip(state))]
pub async fn customer_menu(
    State(state): State<AppState>,
    CurrentCustomer(_user): CurrentCustomer,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Json<MenuListResponse>> {
    list_menu(State(state), Query(query)).await
}

#[instrument(skip(state))]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MenuItemView>> {
    let item = MenuItem::find(&state.db, id).await?.ok_or_else(item_not_found)?;
    Ok(Json(services::to_view(item, &state.config.storage)))
}

#[instrument(skip(state))]
pub async fn admin_list_menu(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Json<MenuListResponse>> {
    let items = MenuItem::list(&state.db).await?;
    Ok(Json(services::menu_listing(
        items,
        &query,
        true,
        &state.config.storage,
    )))
}

#[instrument(skip(state))]
pub async fn admin_get_menu_item(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MenuItemView>> {
    get_menu_item(State(state), Path(id)).await
}

fn write_fields(valid: &ValidMenuItem, category_id: Uuid) -> MenuItemWrite<'_> {
    MenuItemWrite {
        name: &valid.name,
        description: &valid.description,
        price: valid.price,
        category_id,
        image: valid.image.as_deref(),
        available: valid.available,
        featured: valid.featured,
        stock: valid.stock,
    }
}

#[instrument(skip(state, body))]
pub async fn create_menu_item(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Json(body): Json<MenuItemInput>,
) -> ApiResult<(StatusCode, Json<MenuItemView>)> {
    let valid = services::validate(body)?;

    let mut tx = state.db.begin().await.context("begin menu insert")?;
    let category = Category::find_or_create(&mut *tx, &valid.category).await?;
    let item = MenuItem::create(&mut *tx, &write_fields(&valid, category.id)).await?;
    tx.commit().await.context("commit menu insert")?;

    info!(%admin_id, item_id = %item.id, name = %item.name, category = %item.category, "menu item created");
    Ok((
        StatusCode::CREATED,
        Json(services::to_view(item, &state.config.storage)),
    ))
}

#[instrument(skip(state, body))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<MenuItemInput>,
) -> ApiResult<Json<MenuItemView>> {
    let valid = services::validate(body)?;
    let previous = MenuItem::find(&state.db, id).await?.ok_or_else(item_not_found)?;

    let mut tx = state.db.begin().await.context("begin menu update")?;
    let category = Category::find_or_create(&mut *tx, &valid.category).await?;
    let item = MenuItem::update(&mut *tx, id, &write_fields(&valid, category.id))
        .await?
        .ok_or_else(item_not_found)?;
    tx.commit().await.context("commit menu update")?;

    if previous.image.is_some() && previous.image != item.image {
        services::remove_image(state.storage.as_ref(), previous.image.as_deref()).await;
    }

    info!(%admin_id, item_id = %id, "menu item updated");
    Ok(Json(services::to_view(item, &state.config.storage)))
}

#[instrument(skip(state))]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let image = MenuItem::delete(&state.db, id).await?.ok_or_else(item_not_found)?;
    services::remove_image(state.storage.as_ref(), image.as_deref()).await;
    info!(%admin_id, item_id = %id, "menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Multipart upload; the image is read from the `file` field.
#[instrument(skip(state, mp))]
pub async fn upload_menu_image(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
    mut mp: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedImage>)> {
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field.bytes().await.map_err(|e| {
            warn!(error = %e, %admin_id, "reading upload failed");
            ApiError::bad_request("Failed to upload image. Please try again.")
        })?;

        let uploaded = services::upload_image(
            state.storage.as_ref(),
            &state.config.storage,
            body,
            &content_type,
            file_name.as_deref(),
        )
        .await?;
        return Ok((StatusCode::CREATED, Json(uploaded)));
    }

    Err(ApiError::bad_request("No file selected for upload."))
}
