//! HTTP handlers for process management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::processes::{ProcessInput, ProcessService};
use crate::AppState;
use crate::models::Process;

/// List all processes
pub async fn list_processes(State(state): State<AppState>) -> AppResult<Json<Vec<Process>>> {
    let service = ProcessService::new(state.db);
    let processes = service.list_processes().await?;
    Ok(Json(processes))
}

/// Get a process
pub async fn get_process(
    State(state): State<AppState>,
    Path(process_id): Path<Uuid>,
) -> AppResult<Json<Process>> {
    let service = ProcessService::new(state.db);
    let process = service.get_process(process_id).await?;
    Ok(Json(process))
}

/// Create a process
pub async fn create_process(
    State(state): State<AppState>,
    Json(input): Json<ProcessInput>,
) -> AppResult<impl IntoResponse> {
    let service = ProcessService::new(state.db);
    let process = service.create_process(input).await?;
    Ok((StatusCode::CREATED, Json(process)))
}

/// Update a process
pub async fn update_process(
    State(state): State<AppState>,
    Path(process_id): Path<Uuid>,
    Json(input): Json<ProcessInput>,
) -> AppResult<Json<Process>> {
    let service = ProcessService::new(state.db);
    let process = service.update_process(process_id, input).await?;
    Ok(Json(process))
}

/// Delete a process
pub async fn delete_process(
    State(state): State<AppState>,
    Path(process_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ProcessService::new(state.db);
    service.delete_process(process_id).await?;
    Ok(Json(()))
}
