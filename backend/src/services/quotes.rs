//! Quote management service
//!
//! Quote lines share the work-order line shape, so an accepted quote
//! converts into a draft work order by carrying its items over verbatim
//! and recording the provenance link on the order.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::work_orders::{
    generate_order_number, OrderItemInput, WorkOrderRow, WorkOrderService, ORDER_COLUMNS,
};
use shared::models::{
    compute_totals, format_quote_number, OrderStatus, Quote, QuoteStatus, QuoteTotals, WorkOrder,
    WorkOrderItem,
};
use shared::validation::validate_vat_rate;

/// Quote service
#[derive(Clone)]
pub struct QuoteService {
    db: PgPool,
}

/// Database row for a quote; line items live in a JSONB document
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuoteRow {
    id: Uuid,
    quote_number: String,
    client_id: Uuid,
    items: sqlx::types::Json<Vec<WorkOrderItem>>,
    status: String,
    vat_rate: Decimal,
    valid_until: Option<NaiveDate>,
    payment_bank_account_id: Option<Uuid>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = AppError;

    fn try_from(row: QuoteRow) -> Result<Self, Self::Error> {
        let status = super::parse_status(QuoteStatus::parse(&row.status), "status", &row.status)?;
        Ok(Quote {
            id: row.id,
            quote_number: row.quote_number,
            client_id: row.client_id,
            items: row.items.0,
            status,
            vat_rate: row.vat_rate,
            valid_until: row.valid_until,
            payment_bank_account_id: row.payment_bank_account_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) const QUOTE_COLUMNS: &str = "id, quote_number, client_id, items, status, vat_rate, valid_until, payment_bank_account_id, notes, created_at, updated_at";

/// Input for creating a quote
#[derive(Debug, Deserialize)]
pub struct CreateQuoteInput {
    pub client_id: Uuid,
    pub items: Vec<OrderItemInput>,
    /// Defaults to the Croatian standard rate
    pub vat_rate: Option<Decimal>,
    pub valid_until: Option<NaiveDate>,
    pub payment_bank_account_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Input for updating a draft quote
#[derive(Debug, Deserialize)]
pub struct UpdateQuoteInput {
    pub client_id: Option<Uuid>,
    pub items: Option<Vec<WorkOrderItem>>,
    pub vat_rate: Option<Decimal>,
    pub valid_until: Option<NaiveDate>,
    pub payment_bank_account_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Input for a status change (send, accept, reject)
#[derive(Debug, Deserialize)]
pub struct QuoteStatusInput {
    pub status: QuoteStatus,
}

/// A quote with its computed money totals
#[derive(Debug, Serialize)]
pub struct QuoteWithTotals {
    #[serde(flatten)]
    pub quote: Quote,
    pub totals: QuoteTotals,
}

impl From<Quote> for QuoteWithTotals {
    fn from(quote: Quote) -> Self {
        let totals = compute_totals(&quote.items, quote.vat_rate);
        QuoteWithTotals { quote, totals }
    }
}

impl QuoteService {
    /// Create a new QuoteService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all quotes, newest first
    pub async fn list_quotes(&self) -> AppResult<Vec<QuoteWithTotals>> {
        let rows = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes ORDER BY created_at DESC",
            QUOTE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| Quote::try_from(row).map(QuoteWithTotals::from))
            .collect()
    }

    /// Get a quote by ID
    pub async fn get_quote(&self, quote_id: Uuid) -> AppResult<QuoteWithTotals> {
        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes WHERE id = $1",
            QUOTE_COLUMNS
        ))
        .bind(quote_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote".to_string()))?;

        Quote::try_from(row).map(QuoteWithTotals::from)
    }

    /// Create a draft quote
    pub async fn create_quote(&self, input: CreateQuoteInput) -> AppResult<QuoteWithTotals> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A quote needs at least one item".to_string(),
                message_hr: "Ponuda mora imati barem jednu stavku".to_string(),
            });
        }

        let client_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(input.client_id)
                .fetch_one(&self.db)
                .await?;
        if !client_exists {
            return Err(AppError::NotFound("Client".to_string()));
        }

        let vat_rate = input
            .vat_rate
            .unwrap_or_else(|| Decimal::from(shared::models::DEFAULT_VAT_RATE));
        validate_vat_rate(vat_rate).map_err(|e| AppError::Validation {
            field: "vat_rate".to_string(),
            message: e.to_string(),
            message_hr: "Stopa PDV-a nije ispravna".to_string(),
        })?;

        if let Some(account_id) = input.payment_bank_account_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM bank_accounts WHERE id = $1)",
            )
            .bind(account_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::NotFound("Bank account".to_string()));
            }
        }

        // Quote lines are built exactly like order lines
        let items = WorkOrderService::new(self.db.clone())
            .build_items(&input.items)
            .await?;

        let mut tx = self.db.begin().await?;
        let quote_number = generate_quote_number(&mut tx).await?;

        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            r#"
            INSERT INTO quotes
                (quote_number, client_id, items, status, vat_rate, valid_until,
                 payment_bank_account_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            QUOTE_COLUMNS
        ))
        .bind(&quote_number)
        .bind(input.client_id)
        .bind(sqlx::types::Json(&items))
        .bind(QuoteStatus::Draft.as_str())
        .bind(vat_rate)
        .bind(input.valid_until)
        .bind(input.payment_bank_account_id)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Created quote {}", quote_number);
        Quote::try_from(row).map(QuoteWithTotals::from)
    }

    /// Update a draft quote
    pub async fn update_quote(
        &self,
        quote_id: Uuid,
        input: UpdateQuoteInput,
    ) -> AppResult<QuoteWithTotals> {
        let existing = self.get_quote(quote_id).await?.quote;
        if existing.status != QuoteStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "quote {} is {}, only drafts can be edited",
                existing.quote_number,
                existing.status.as_str()
            )));
        }

        let vat_rate = input.vat_rate.unwrap_or(existing.vat_rate);
        validate_vat_rate(vat_rate).map_err(|e| AppError::Validation {
            field: "vat_rate".to_string(),
            message: e.to_string(),
            message_hr: "Stopa PDV-a nije ispravna".to_string(),
        })?;

        let items = match input.items {
            Some(items) => {
                WorkOrderService::new(self.db.clone())
                    .validate_replacement_items(&items)
                    .await?;
                items
            }
            None => existing.items,
        };

        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            r#"
            UPDATE quotes
            SET client_id = $1, items = $2, vat_rate = $3, valid_until = $4,
                payment_bank_account_id = $5, notes = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING {}
            "#,
            QUOTE_COLUMNS
        ))
        .bind(input.client_id.unwrap_or(existing.client_id))
        .bind(sqlx::types::Json(&items))
        .bind(vat_rate)
        .bind(input.valid_until.or(existing.valid_until))
        .bind(
            input
                .payment_bank_account_id
                .or(existing.payment_bank_account_id),
        )
        .bind(input.notes.or(existing.notes))
        .bind(quote_id)
        .fetch_one(&self.db)
        .await?;

        Quote::try_from(row).map(QuoteWithTotals::from)
    }

    /// Delete a draft quote
    pub async fn delete_quote(&self, quote_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1 AND status = 'draft'")
            .bind(quote_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            let quote = self.get_quote(quote_id).await?.quote;
            return Err(AppError::InvalidStateTransition(format!(
                "quote {} is {}, only drafts can be deleted",
                quote.quote_number,
                quote.status.as_str()
            )));
        }

        Ok(())
    }

    /// Move a quote through its lifecycle (send, accept, reject, archive)
    pub async fn set_status(
        &self,
        quote_id: Uuid,
        input: QuoteStatusInput,
    ) -> AppResult<QuoteWithTotals> {
        let existing = self.get_quote(quote_id).await?.quote;

        if !existing.status.can_transition_to(input.status) {
            return Err(AppError::InvalidStateTransition(format!(
                "quote {} cannot move from {} to {}",
                existing.quote_number,
                existing.status.as_str(),
                input.status.as_str()
            )));
        }

        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            r#"
            UPDATE quotes SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            QUOTE_COLUMNS
        ))
        .bind(input.status.as_str())
        .bind(quote_id)
        .fetch_one(&self.db)
        .await?;

        Quote::try_from(row).map(QuoteWithTotals::from)
    }

    /// Convert an accepted quote into a draft work order, carrying the
    /// items over and recording the provenance link, in one transaction.
    pub async fn convert_to_order(&self, quote_id: Uuid) -> AppResult<WorkOrder> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes WHERE id = $1 FOR UPDATE",
            QUOTE_COLUMNS
        ))
        .bind(quote_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote".to_string()))?;
        let quote = Quote::try_from(row)?;

        if !quote.status.can_transition_to(QuoteStatus::Converted) {
            return Err(AppError::InvalidStateTransition(format!(
                "quote {} is {}, only accepted quotes convert to work orders",
                quote.quote_number,
                quote.status.as_str()
            )));
        }

        let order_number = generate_order_number(&mut tx).await?;

        let order_row = sqlx::query_as::<_, WorkOrderRow>(&format!(
            r#"
            INSERT INTO work_orders
                (order_number, client_id, items, status, notes, quote_id, quote_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&order_number)
        .bind(quote.client_id)
        .bind(sqlx::types::Json(&quote.items))
        .bind(OrderStatus::Draft.as_str())
        .bind(&quote.notes)
        .bind(quote.id)
        .bind(&quote.quote_number)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE quotes SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(QuoteStatus::Converted.as_str())
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Converted quote {} into work order {}",
            quote.quote_number,
            order_number
        );

        order_row.try_into()
    }
}

/// Generate an unused quote number
async fn generate_quote_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> AppResult<String> {
    use rand::Rng;

    let today = Utc::now().date_naive();
    for _ in 0..super::NUMBER_RETRIES {
        let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
        let candidate = format_quote_number(today, suffix);
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM quotes WHERE quote_number = $1)")
                .bind(&candidate)
                .fetch_one(&mut **tx)
                .await?;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(AppError::Conflict {
        resource: "quote_number".to_string(),
        message: "could not generate a free quote number".to_string(),
        message_hr: "Nije moguće dodijeliti broj ponude".to_string(),
    })
}
