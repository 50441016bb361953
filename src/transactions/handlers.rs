use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{DeletedResponse, ListParams, ListResponse, TransactionRequest},
    repo_types::Transaction,
    validation::{parse_id, validate, validate_page},
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListResponse>> {
    let page = validate_page(&params)?;
    let data = state.transactions.list(page).await?;
    Ok(Json(ListResponse { data }))
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<Transaction>)> {
    let Json(body) = payload?;
    let draft = validate(body).inspect_err(|e| warn!(error = %e, "transaction rejected"))?;
    let created = state.transactions.insert(&draft).await?;
    info!(transaction_id = %created.id, %user_id, "transaction created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/transactions/{}", created.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(created)))
}

#[instrument(skip(state))]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Transaction>> {
    let id = parse_id(&id)?;
    state
        .transactions
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Transaction not found"))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> AppResult<Json<Transaction>> {
    let id = parse_id(&id)?;
    let Json(body) = payload?;

    let existing = state
        .transactions
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Transaction not found"))?;
    let draft = validate(body.overlay(&existing))?;

    // A concurrent delete between the read and the write still yields 404.
    let updated = state
        .transactions
        .update(id, &draft)
        .await?
        .ok_or(AppError::NotFound("Transaction not found"))?;
    info!(transaction_id = %id, %user_id, status = %updated.status, "transaction updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse>> {
    let id = parse_id(&id)?;
    if !state.transactions.delete(id).await? {
        return Err(AppError::NotFound("Transaction not found"));
    }
    info!(transaction_id = %id, %user_id, "transaction deleted");
    Ok(Json(DeletedResponse {
        message: "Transaction deleted",
        id,
    }))
}
