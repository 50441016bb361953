use std::{collections::BTreeMap, sync::Arc};

use time::{Date, Duration, OffsetDateTime, UtcOffset};
use tracing::warn;

use super::{
    dto::{DashboardResponse, DashboardStats, ReportQuery, ReportSummary, RevenuePoint, StatusCount},
    window::{self, Period},
};
use crate::error::AppResult;
use crate::transactions::{
    repo::TransactionStore,
    repo_types::{Transaction, TransactionFilter, TransactionStatus},
};

/// Days covered by the dashboard revenue chart, today included.
pub const REVENUE_DAYS: i64 = 7;

/// Read-only aggregates over the transaction store.
pub struct ReportingService {
    store: Arc<dyn TransactionStore>,
    offset: UtcOffset,
}

fn or_default<T: Default>(aggregate: &'static str, result: anyhow::Result<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, aggregate, "dashboard aggregate failed; using default");
        T::default()
    })
}

impl ReportingService {
    pub fn new(store: Arc<dyn TransactionStore>, offset: UtcOffset) -> Self {
        Self { store, offset }
    }

    pub fn filter_for(&self, query: &ReportQuery, now: OffsetDateTime) -> AppResult<TransactionFilter> {
        let (from, until) = window::resolve(query, now, self.offset)?;
        Ok(TransactionFilter {
            from,
            until,
            text: None,
        }
        .with_text(query.q.as_deref()))
    }

    pub async fn filtered(&self, filter: &TransactionFilter) -> AppResult<Vec<Transaction>> {
        Ok(self.store.search(filter).await?)
    }

    pub async fn summary(&self, filter: &TransactionFilter) -> AppResult<ReportSummary> {
        let rows = self.filtered(filter).await?;
        Ok(ReportSummary {
            total_transactions: rows.len(),
            total_revenue: rows.iter().map(|t| t.price).sum(),
            completed_transactions: rows
                .iter()
                .filter(|t| t.status == TransactionStatus::Completed)
                .count(),
        })
    }

    /// Every aggregate is computed concurrently and falls back to its zero
    /// value on its own; this never fails.
    pub async fn dashboard(&self, now: OffsetDateTime) -> DashboardResponse {
        let store = &self.store;
        let day = Period::Today.start(now, self.offset);
        let month = Period::Month.start(now, self.offset);
        let year = Period::Year.start(now, self.offset);
        let chart_start = day - Duration::days(REVENUE_DAYS - 1);

        let (total, completed, pending, daily, monthly, yearly, revenue, points, by_status) = tokio::join!(
            store.count(None),
            store.count(Some(TransactionStatus::Completed)),
            store.count(Some(TransactionStatus::Pending)),
            store.sum_price(Some(day)),
            store.sum_price(Some(month)),
            store.sum_price(Some(year)),
            store.sum_price(None),
            store.revenue_points(chart_start),
            store.count_by_status(),
        );

        DashboardResponse {
            stats: DashboardStats {
                daily_profit: or_default("daily_profit", daily),
                monthly_profit: or_default("monthly_profit", monthly),
                yearly_profit: or_default("yearly_profit", yearly),
                total_transactions: or_default("total_transactions", total),
                completed_transactions: or_default("completed_transactions", completed),
                pending_transactions: or_default("pending_transactions", pending),
            },
            total_revenue: or_default("total_revenue", revenue),
            revenue_data: revenue_series(
                &or_default("revenue_data", points),
                chart_start.to_offset(self.offset).date(),
                self.offset,
            ),
            status_distribution: status_distribution(&or_default("status_distribution", by_status)),
        }
    }
}

/// One entry per day starting at `first_day`, zero-filled, ascending.
fn revenue_series(
    points: &[(OffsetDateTime, i64)],
    first_day: Date,
    offset: UtcOffset,
) -> Vec<RevenuePoint> {
    let mut by_day: BTreeMap<Date, i64> = (0..REVENUE_DAYS)
        .map(|i| (first_day + Duration::days(i), 0))
        .collect();
    for (at, price) in points {
        if let Some(amount) = by_day.get_mut(&at.to_offset(offset).date()) {
            *amount += price;
        }
    }
    by_day
        .into_iter()
        .map(|(date, amount)| RevenuePoint {
            date: date.to_string(),
            amount,
        })
        .collect()
}

fn status_distribution(counts: &[(TransactionStatus, i64)]) -> Vec<StatusCount> {
    TransactionStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            name: status,
            value: counts
                .iter()
                .filter(|(s, _)| *s == status)
                .map(|(_, n)| n)
                .sum(),
        })
        .collect()
}
