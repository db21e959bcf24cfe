//! HTTP handlers for the service catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::service_items::{ServiceItemInput, ServiceItemService};
use crate::AppState;
use crate::models::ServiceItem;

/// List all catalog services
pub async fn list_services(State(state): State<AppState>) -> AppResult<Json<Vec<ServiceItem>>> {
    let service = ServiceItemService::new(state.db);
    let services = service.list_services().await?;
    Ok(Json(services))
}

/// Get a catalog service
pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> AppResult<Json<ServiceItem>> {
    let service = ServiceItemService::new(state.db);
    let item = service.get_service(service_id).await?;
    Ok(Json(item))
}

/// Create a catalog service
pub async fn create_service(
    State(state): State<AppState>,
    Json(input): Json<ServiceItemInput>,
) -> AppResult<impl IntoResponse> {
    let service = ServiceItemService::new(state.db);
    let item = service.create_service(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a catalog service
pub async fn update_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Json(input): Json<ServiceItemInput>,
) -> AppResult<Json<ServiceItem>> {
    let service = ServiceItemService::new(state.db);
    let item = service.update_service(service_id, input).await?;
    Ok(Json(item))
}

/// Delete a catalog service
pub async fn delete_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ServiceItemService::new(state.db);
    service.delete_service(service_id).await?;
    Ok(Json(()))
}
