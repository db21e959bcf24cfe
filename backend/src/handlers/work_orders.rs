//! HTTP handlers for work order management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::work_orders::{
    ArchiveOutcome, CreateWorkOrderInput, DispatchOutcome, IssueOutcome, UpdateStepInput,
    UpdateWorkOrderInput, WorkOrderService,
};
use crate::AppState;
use crate::models::WorkOrder;
use shared::stockflow::{MaterialRequirement, ProcessCompletionReport};

/// List all work orders
pub async fn list_work_orders(State(state): State<AppState>) -> AppResult<Json<Vec<WorkOrder>>> {
    let service = WorkOrderService::new(state.db);
    let orders = service.list_orders().await?;
    Ok(Json(orders))
}

/// Get a work order
pub async fn get_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<WorkOrder>> {
    let service = WorkOrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Create a draft work order
pub async fn create_work_order(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkOrderInput>,
) -> AppResult<impl IntoResponse> {
    let service = WorkOrderService::new(state.db);
    let order = service.create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Update a draft work order
pub async fn update_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateWorkOrderInput>,
) -> AppResult<Json<WorkOrder>> {
    let service = WorkOrderService::new(state.db);
    let order = service.update_order(order_id, input).await?;
    Ok(Json(order))
}

/// Delete a draft work order
pub async fn delete_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = WorkOrderService::new(state.db);
    service.delete_order(order_id).await?;
    Ok(Json(()))
}

/// Cancel a draft work order
pub async fn cancel_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<WorkOrder>> {
    let service = WorkOrderService::new(state.db);
    let order = service.cancel_order(order_id).await?;
    Ok(Json(order))
}

/// Dry-run material requirement check for a work order
pub async fn get_work_order_requirements(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<MaterialRequirement>>> {
    let service = WorkOrderService::new(state.db);
    let requirements = service.get_requirements(order_id).await?;
    Ok(Json(requirements))
}

/// Issue a draft work order. Responds with either the issued order or the
/// per-material shortfall; a shortfall is a regular response, not an error.
pub async fn issue_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<IssueOutcome>> {
    let service = WorkOrderService::new(state.db);
    let outcome = service.issue_order(order_id).await?;
    Ok(Json(outcome))
}

/// Archive a work order, crediting its materials back to stock
pub async fn archive_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ArchiveOutcome>> {
    let service = WorkOrderService::new(state.db);
    let outcome = service.archive_order(order_id).await?;
    Ok(Json(outcome))
}

/// Pre-dispatch process completion analysis
pub async fn get_process_completion(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ProcessCompletionReport>> {
    let service = WorkOrderService::new(state.db);
    let report = service.get_process_completion(order_id).await?;
    Ok(Json(report))
}

/// Input for generating a delivery note
#[derive(Debug, Deserialize, Default)]
pub struct GenerateDeliveryNoteInput {
    pub notes: Option<String>,
}

/// Generate the delivery note for a work order and finalize the order
pub async fn generate_delivery_note(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<GenerateDeliveryNoteInput>,
) -> AppResult<impl IntoResponse> {
    let service = WorkOrderService::new(state.db);
    let outcome: DispatchOutcome = service.generate_delivery_note(order_id, input.notes).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Change the status of one process step
pub async fn update_step_status(
    State(state): State<AppState>,
    Path((order_id, item_index, material_index, step_index)): Path<(Uuid, usize, usize, usize)>,
    Json(input): Json<UpdateStepInput>,
) -> AppResult<Json<WorkOrder>> {
    let service = WorkOrderService::new(state.db);
    let order = service
        .update_step_status(order_id, item_index, material_index, step_index, input)
        .await?;
    Ok(Json(order))
}
