use serde::{Deserialize, Serialize};

use crate::transactions::repo_types::TransactionStatus;

/// Query string of `/reports` and `/reports/summary`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub period: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub daily_profit: i64,
    pub monthly_profit: i64,
    pub yearly_profit: i64,
    pub total_transactions: i64,
    pub completed_transactions: i64,
    pub pending_transactions: i64,
}

/// Revenue of one calendar day, `date` formatted `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub date: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub name: TransactionStatus,
    pub value: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub total_revenue: i64,
    pub revenue_data: Vec<RevenuePoint>,
    pub status_distribution: Vec<StatusCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_transactions: usize,
    pub total_revenue: i64,
    pub completed_transactions: usize,
}
