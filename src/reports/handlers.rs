use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::dto::{DashboardResponse, ReportQuery, ReportSummary};
use crate::{error::AppResult, state::AppState, transactions::repo_types::Transaction};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(report))
        .route("/reports/summary", get(report_summary))
        .route("/dashboard-stats", get(dashboard_stats))
}

#[instrument(skip(state))]
pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    let reporting = state.reporting();
    let filter = reporting.filter_for(&query, OffsetDateTime::now_utc())?;
    let rows = reporting.filtered(&filter).await?;
    debug!(rows = rows.len(), "report generated");
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn report_summary(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ReportSummary>> {
    let reporting = state.reporting();
    let filter = reporting.filter_for(&query, OffsetDateTime::now_utc())?;
    Ok(Json(reporting.summary(&filter).await?))
}

#[instrument(skip(state))]
pub async fn dashboard_stats(State(state): State<AppState>) -> Json<DashboardResponse> {
    Json(state.reporting().dashboard(OffsetDateTime::now_utc()).await)
}
