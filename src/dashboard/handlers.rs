use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use super::{
    dto::{BestSeller, DailyCount, DashboardResponse, MonthlySales, RecentOrder},
    services,
};
use crate::{
    auth::extractors::CurrentAdmin,
    error::ApiResult,
    orders::{
        dto::{OrderView, StatusCounts},
        repo_types::Order,
        services::status_counts,
    },
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/dashboard/daily-orders", get(daily_orders))
        .route("/admin/dashboard/monthly-sales", get(monthly_sales))
        .route("/admin/dashboard/best-sellers", get(best_sellers))
        .route("/admin/dashboard/status-counts", get(order_status_counts))
        .route("/admin/dashboard/recent-orders", get(recent_orders))
}

async fn load_daily(state: &AppState) -> ApiResult<Vec<DailyCount>> {
    let today = OffsetDateTime::now_utc().date();
    let created = Order::created_since(&state.db, services::week_start(today)).await?;
    Ok(services::daily_order_counts(today, &created))
}

async fn load_monthly(state: &AppState) -> ApiResult<Vec<MonthlySales>> {
    let year = OffsetDateTime::now_utc().year();
    let (from, to) = services::year_bounds(year)?;
    let rows = Order::completed_totals_between(&state.db, from, to).await?;
    Ok(services::monthly_sales(year, &rows))
}

async fn load_best_sellers(state: &AppState) -> ApiResult<Vec<BestSeller>> {
    let lines = Order::completed_lines(&state.db).await?;
    Ok(services::best_sellers(&lines))
}

async fn load_status_counts(state: &AppState) -> ApiResult<StatusCounts> {
    let rows = Order::status_counts(&state.db).await?;
    Ok(status_counts(rows.iter().map(|(s, n)| (s.as_str(), *n))))
}

async fn load_recent(state: &AppState) -> ApiResult<Vec<RecentOrder>> {
    let orders = Order::list_with_customers(&state.db, Some(services::RECENT_ORDER_LIMIT))
        .await?
        .into_iter()
        .map(OrderView::from)
        .collect();
    Ok(services::recent_orders(orders))
}

/// Every chart in one response.
#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> ApiResult<Json<DashboardResponse>> {
    let (daily_orders, monthly_sales, best_sellers, status_counts, recent_orders) = tokio::try_join!(
        load_daily(&state),
        load_monthly(&state),
        load_best_sellers(&state),
        load_status_counts(&state),
        load_recent(&state),
    )?;
    Ok(Json(DashboardResponse {
        daily_orders,
        monthly_sales,
        best_sellers,
        status_counts,
        recent_orders,
    }))
}

#[instrument(skip(state))]
pub async fn daily_orders(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> ApiResult<Json<Vec<DailyCount>>> {
    Ok(Json(load_daily(&state).await?))
}

#[instrument(skip(state))]
pub async fn monthly_sales(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> ApiResult<Json<Vec<MonthlySales>>> {
    Ok(Json(load_monthly(&state).await?))
}

#[instrument(skip(state))]
pub async fn best_sellers(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> ApiResult<Json<Vec<BestSeller>>> {
    Ok(Json(load_best_sellers(&state).await?))
}

#[instrument(skip(state))]
pub async fn order_status_counts(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> ApiResult<Json<StatusCounts>> {
    Ok(Json(load_status_counts(&state).await?))
}

#[instrument(skip(state))]
pub async fn recent_orders(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> ApiResult<Json<Vec<RecentOrder>>> {
    Ok(Json(load_recent(&state).await?))
}
