//! Delivery note service
//!
//! Delivery notes are created by the work-order dispatch flow and archived
//! by the work-order archival cascade; this service only reads them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{DeliveryNote, DeliveryNoteItem, DeliveryNoteStatus};

/// Delivery note service
#[derive(Clone)]
pub struct DeliveryNoteService {
    db: PgPool,
}

/// Database row for a delivery note
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DeliveryNoteRow {
    id: Uuid,
    delivery_number: String,
    work_order_id: Uuid,
    client_id: Uuid,
    items: sqlx::types::Json<Vec<DeliveryNoteItem>>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DeliveryNoteRow> for DeliveryNote {
    type Error = AppError;

    fn try_from(row: DeliveryNoteRow) -> Result<Self, Self::Error> {
        let status =
            super::parse_status(DeliveryNoteStatus::parse(&row.status), "status", &row.status)?;
        Ok(DeliveryNote {
            id: row.id,
            delivery_number: row.delivery_number,
            work_order_id: row.work_order_id,
            client_id: row.client_id,
            items: row.items.0,
            status,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

pub(crate) const DELIVERY_NOTE_COLUMNS: &str =
    "id, delivery_number, work_order_id, client_id, items, status, notes, created_at";

impl DeliveryNoteService {
    /// Create a new DeliveryNoteService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all delivery notes, newest first
    pub async fn list_notes(&self) -> AppResult<Vec<DeliveryNote>> {
        let rows = sqlx::query_as::<_, DeliveryNoteRow>(&format!(
            "SELECT {} FROM delivery_notes ORDER BY created_at DESC",
            DELIVERY_NOTE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(DeliveryNote::try_from).collect()
    }

    /// Get a delivery note by ID
    pub async fn get_note(&self, note_id: Uuid) -> AppResult<DeliveryNote> {
        let row = sqlx::query_as::<_, DeliveryNoteRow>(&format!(
            "SELECT {} FROM delivery_notes WHERE id = $1",
            DELIVERY_NOTE_COLUMNS
        ))
        .bind(note_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Delivery note".to_string()))?;

        row.try_into()
    }

    /// Get the delivery note belonging to a work order, if one was generated
    pub async fn get_note_for_order(&self, work_order_id: Uuid) -> AppResult<Option<DeliveryNote>> {
        let row = sqlx::query_as::<_, DeliveryNoteRow>(&format!(
            "SELECT {} FROM delivery_notes WHERE work_order_id = $1",
            DELIVERY_NOTE_COLUMNS
        ))
        .bind(work_order_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(DeliveryNote::try_from).transpose()
    }
}
