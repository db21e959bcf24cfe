//! HTTP handlers for inventory management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::inventory::{
    AdjustStockInput, CreateInventoryItemInput, InventoryService, UpdateInventoryItemInput,
};
use crate::AppState;
use crate::models::{InventoryItem, StockTransaction};

/// List all inventory items
pub async fn list_inventory_items(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = InventoryService::new(state.db);
    let items = service.list_items().await?;
    Ok(Json(items))
}

/// Get an inventory item
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(state.db);
    let item = service.get_item(item_id).await?;
    Ok(Json(item))
}

/// Create an inventory item
pub async fn create_inventory_item(
    State(state): State<AppState>,
    Json(input): Json<CreateInventoryItemInput>,
) -> AppResult<impl IntoResponse> {
    let service = InventoryService::new(state.db);
    let item = service.create_item(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update an inventory item's master data
pub async fn update_inventory_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateInventoryItemInput>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(state.db);
    let item = service.update_item(item_id, input).await?;
    Ok(Json(item))
}

/// Delete an inventory item
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = InventoryService::new(state.db);
    service.delete_item(item_id).await?;
    Ok(Json(()))
}

/// Record a manual stock movement for an item
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<impl IntoResponse> {
    let service = InventoryService::new(state.db);
    let transaction = service.adjust_stock(item_id, input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Get the ledger for one inventory item
pub async fn get_item_transactions(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let service = InventoryService::new(state.db);
    let transactions = service.get_item_transactions(item_id).await?;
    Ok(Json(transactions))
}

/// List the whole stock ledger
pub async fn list_stock_transactions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let service = InventoryService::new(state.db);
    let transactions = service.list_transactions().await?;
    Ok(Json(transactions))
}
