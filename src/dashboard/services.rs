//! Chart data for the admin dashboard, computed from order rows.

use std::collections::HashMap;

use anyhow::Context;
use time::{Date, Duration, Month, OffsetDateTime};
use uuid::Uuid;

use super::dto::{BestSeller, DailyCount, MonthlySales, RecentOrder};
use crate::{cart::services::round_cents, orders::dto::OrderView, orders::repo_types::OrderLine};

pub const DAYS_SHOWN: i64 = 7;
pub const BEST_SELLER_LIMIT: usize = 5;
pub const RECENT_ORDER_LIMIT: i64 = 5;
pub const BEST_SELLER_COLORS: [&str; 5] = ["#FF6F61", "#6B7280", "#F4A261", "#2A9D8F", "#E76F51"];

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn day_label(d: Date) -> String {
    format!("{}/{}", u8::from(d.month()), d.day())
}

/// Midnight UTC at the start of the chart window ending on `today`.
pub fn week_start(today: Date) -> OffsetDateTime {
    (today - Duration::days(DAYS_SHOWN - 1)).midnight().assume_utc()
}

/// `[Jan 1 of year, Jan 1 of year + 1)` in UTC.
pub fn year_bounds(year: i32) -> anyhow::Result<(OffsetDateTime, OffsetDateTime)> {
    let start = Date::from_calendar_date(year, Month::January, 1).context("year start")?;
    let end = Date::from_calendar_date(year + 1, Month::January, 1).context("year end")?;
    Ok((start.midnight().assume_utc(), end.midnight().assume_utc()))
}

/// Order counts for each of the last seven days, oldest first, zero-filled.
pub fn daily_order_counts(today: Date, created: &[OffsetDateTime]) -> Vec<DailyCount> {
    (0..DAYS_SHOWN)
        .rev()
        .map(|back| today - Duration::days(back))
        .map(|day| DailyCount {
            name: day_label(day),
            sales: created
                .iter()
                .filter(|t| t.to_offset(time::UtcOffset::UTC).date() == day)
                .count() as i64,
        })
        .collect()
}

/// Completed revenue per month of `year`. Rows outside the year are ignored.
pub fn monthly_sales(year: i32, rows: &[(OffsetDateTime, f64)]) -> Vec<MonthlySales> {
    let mut totals = [0.0_f64; 12];
    for (at, total) in rows {
        let at = at.to_offset(time::UtcOffset::UTC);
        if at.year() == year {
            totals[usize::from(u8::from(at.month())) - 1] += total;
        }
    }
    MONTH_LABELS
        .iter()
        .zip(totals)
        .map(|(&name, total)| MonthlySales {
            name,
            total: round_cents(total),
        })
        .collect()
}

/// Top items by quantity across `orders`; ties keep first-seen order.
pub fn best_sellers(orders: &[Vec<OrderLine>]) -> Vec<BestSeller> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut by_item: HashMap<Uuid, (String, i64)> = HashMap::new();
    for line in orders.iter().flatten() {
        by_item
            .entry(line.menu_item_id)
            .or_insert_with(|| {
                order.push(line.menu_item_id);
                (line.name.clone(), 0)
            })
            .1 += i64::from(line.quantity);
    }

    let mut ranked: Vec<(String, i64)> = order
        .into_iter()
        .filter_map(|id| by_item.remove(&id))
        .collect();
    // stable: equal quantities stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(BEST_SELLER_LIMIT)
        .enumerate()
        .map(|(i, (name, value))| BestSeller {
            name,
            value,
            color: BEST_SELLER_COLORS[i % BEST_SELLER_COLORS.len()],
        })
        .collect()
}

/// Labels the newest orders `Order #n` down to `Order #1`.
pub fn recent_orders(newest_first: Vec<OrderView>) -> Vec<RecentOrder> {
    let n = newest_first.len();
    newest_first
        .into_iter()
        .enumerate()
        .map(|(i, order)| RecentOrder {
            reference: format!("Order #{}", n - i),
            order,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::repo_types::OrderStatus;
    use crate::orders::services::tests::order;
    use time::macros::{date, datetime};

    #[test]
    fn seven_day_window_with_zero_days() {
        let today = date!(2025 - 03 - 02);
        let created = [
            datetime!(2025-03-02 09:00 UTC),
            datetime!(2025-03-02 18:30 UTC),
            datetime!(2025-02-25 00:00 UTC),
            datetime!(2025-02-23 23:59 UTC), // before the window
        ];
        let days = daily_order_counts(today, &created);
        let labels: Vec<_> = days.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(labels, vec!["2/24", "2/25", "2/26", "2/27", "2/28", "3/1", "3/2"]);
        let counts: Vec<_> = days.iter().map(|d| d.sales).collect();
        assert_eq!(counts, vec![0, 1, 0, 0, 0, 0, 2]);
        assert_eq!(week_start(today), datetime!(2025-02-24 00:00 UTC));
    }

    #[test]
    fn monthly_sales_fill_every_month() {
        let rows = [
            (datetime!(2025-01-15 10:00 UTC), 10.25),
            (datetime!(2025-01-20 10:00 UTC), 4.5),
            (datetime!(2025-12-31 23:00 UTC), 7.0),
            (datetime!(2024-12-31 23:00 UTC), 99.0),
        ];
        let months = monthly_sales(2025, &rows);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], MonthlySales { name: "Jan", total: 14.75 });
        assert_eq!(months[5].total, 0.0);
        assert_eq!(months[11], MonthlySales { name: "Dec", total: 7.0 });
    }

    #[test]
    fn year_bounds_span_the_calendar_year() {
        let (from, to) = year_bounds(2025).unwrap();
        assert_eq!(from, datetime!(2025-01-01 00:00 UTC));
        assert_eq!(to, datetime!(2026-01-01 00:00 UTC));
    }

    fn line(id: Uuid, name: &str, quantity: i32) -> OrderLine {
        OrderLine {
            menu_item_id: id,
            name: name.into(),
            unit_price: 1.0,
            quantity,
            sugar_level: None,
        }
    }

    #[test]
    fn best_sellers_top_five_with_palette() {
        let ids: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
        let orders = vec![
            vec![line(ids[0], "Latte", 2), line(ids[1], "Mocha", 3)],
            vec![line(ids[2], "Scone", 1), line(ids[3], "Tea", 3)],
            vec![line(ids[0], "Latte", 2), line(ids[4], "Bagel", 1), line(ids[5], "Muffin", 1)],
        ];
        let top = best_sellers(&orders);
        let names: Vec<_> = top.iter().map(|b| b.name.as_str()).collect();
        // Mocha and Tea tie at 3; Mocha was seen first
        assert_eq!(names, vec!["Latte", "Mocha", "Tea", "Scone", "Bagel"]);
        assert_eq!(top[0].value, 4);
        let colors: Vec<_> = top.iter().map(|b| b.color).collect();
        assert_eq!(colors, BEST_SELLER_COLORS.to_vec());
    }

    #[test]
    fn recent_orders_count_down() {
        let orders = vec![
            order("Ana", &[("Latte", 1)], 4.5, OrderStatus::Pending, Duration::minutes(1)),
            order("Ben", &[("Mocha", 1)], 5.0, OrderStatus::Completed, Duration::minutes(2)),
            order("Cleo", &[("Tea", 1)], 3.0, OrderStatus::Cancelled, Duration::minutes(3)),
        ];
        let refs: Vec<_> = recent_orders(orders).into_iter().map(|r| r.reference).collect();
        assert_eq!(refs, vec!["Order #3", "Order #2", "Order #1"]);
    }
}
