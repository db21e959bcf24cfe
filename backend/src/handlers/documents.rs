//! HTTP handlers for printable documents

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::DocumentRenderClient;
use crate::services::documents::{DocumentService, RenderedDocument};
use crate::AppState;

fn pdf_response(document: RenderedDocument) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename),
            ),
        ],
        document.bytes,
    )
}

fn document_service(state: &AppState) -> AppResult<DocumentService> {
    let renderer = DocumentRenderClient::new(
        state.config.documents.render_endpoint.clone(),
        state.config.documents.render_timeout_seconds,
    )?;
    Ok(DocumentService::new(state.db.clone(), renderer))
}

/// Render a quote PDF
pub async fn render_quote_pdf(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = document_service(&state)?;
    let document = service.render_quote(quote_id).await?;
    Ok(pdf_response(document))
}

/// Render a work order PDF
pub async fn render_work_order_pdf(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = document_service(&state)?;
    let document = service.render_work_order(order_id).await?;
    Ok(pdf_response(document))
}

/// Render a delivery note PDF
pub async fn render_delivery_note_pdf(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = document_service(&state)?;
    let document = service.render_delivery_note(note_id).await?;
    Ok(pdf_response(document))
}

/// Render the glass labels for a work order
pub async fn render_glass_labels_pdf(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = document_service(&state)?;
    let document = service.render_glass_labels(order_id).await?;
    Ok(pdf_response(document))
}
