use serde::Serialize;

use crate::orders::dto::{OrderView, StatusCounts};

/// Orders placed on one day, labelled `M/D`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub name: String,
    pub sales: i64,
}

/// Completed-order revenue for one month, labelled `Jan`..`Dec`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    pub name: &'static str,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSeller {
    pub name: String,
    pub value: i64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentOrder {
    pub reference: String,
    #[serde(flatten)]
    pub order: OrderView,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub daily_orders: Vec<DailyCount>,
    pub monthly_sales: Vec<MonthlySales>,
    pub best_sellers: Vec<BestSeller>,
    pub status_counts: StatusCounts,
    pub recent_orders: Vec<RecentOrder>,
}
