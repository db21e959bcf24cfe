//! HTTP handlers for delivery notes

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::delivery_notes::DeliveryNoteService;
use crate::AppState;
use crate::models::DeliveryNote;

/// List all delivery notes
pub async fn list_delivery_notes(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DeliveryNote>>> {
    let service = DeliveryNoteService::new(state.db);
    let notes = service.list_notes().await?;
    Ok(Json(notes))
}

/// Get a delivery note
pub async fn get_delivery_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> AppResult<Json<DeliveryNote>> {
    let service = DeliveryNoteService::new(state.db);
    let note = service.get_note(note_id).await?;
    Ok(Json(note))
}
