//! HTTP handlers for quote management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::quotes::{
    CreateQuoteInput, QuoteService, QuoteStatusInput, QuoteWithTotals, UpdateQuoteInput,
};
use crate::AppState;
use crate::models::WorkOrder;

/// List all quotes
pub async fn list_quotes(State(state): State<AppState>) -> AppResult<Json<Vec<QuoteWithTotals>>> {
    let service = QuoteService::new(state.db);
    let quotes = service.list_quotes().await?;
    Ok(Json(quotes))
}

/// Get a quote
pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> AppResult<Json<QuoteWithTotals>> {
    let service = QuoteService::new(state.db);
    let quote = service.get_quote(quote_id).await?;
    Ok(Json(quote))
}

/// Create a draft quote
pub async fn create_quote(
    State(state): State<AppState>,
    Json(input): Json<CreateQuoteInput>,
) -> AppResult<impl IntoResponse> {
    let service = QuoteService::new(state.db);
    let quote = service.create_quote(input).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

/// Update a draft quote
pub async fn update_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
    Json(input): Json<UpdateQuoteInput>,
) -> AppResult<Json<QuoteWithTotals>> {
    let service = QuoteService::new(state.db);
    let quote = service.update_quote(quote_id, input).await?;
    Ok(Json(quote))
}

/// Delete a draft quote
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = QuoteService::new(state.db);
    service.delete_quote(quote_id).await?;
    Ok(Json(()))
}

/// Move a quote through its lifecycle
pub async fn set_quote_status(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
    Json(input): Json<QuoteStatusInput>,
) -> AppResult<Json<QuoteWithTotals>> {
    let service = QuoteService::new(state.db);
    let quote = service.set_status(quote_id, input).await?;
    Ok(Json(quote))
}

/// Convert an accepted quote into a draft work order
pub async fn convert_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = QuoteService::new(state.db);
    let order: WorkOrder = service.convert_to_order(quote_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
