//! Work order management service
//!
//! Owns the material-flow operations: issuance (draft to pending with stock
//! deduction), archival (reversal with inventory credit and document
//! cascade) and dispatch (delivery-note generation with auto-completion).
//! The computations live in `shared::stockflow` as pure functions; this
//! service wraps each of them in one database transaction, with row locks
//! on the order and the touched inventory, so the multi-table write is
//! applied atomically or not at all.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::delivery_notes::{DeliveryNoteRow, DELIVERY_NOTE_COLUMNS};
use crate::services::inventory::{InventoryItemRow, ITEM_COLUMNS};
use crate::services::inventory::{StockTransactionRow, TRANSACTION_COLUMNS};
use crate::services::products::{ProductRow, PRODUCT_COLUMNS};
use crate::services::quotes::{QuoteRow, QUOTE_COLUMNS};
use shared::models::{
    format_delivery_number, format_order_number, DeliveryNote, InventoryItem, ItemMaterial,
    LineRef, OrderStatus, Product, Quote, StepStatus, StockTransaction, WorkOrder, WorkOrderItem,
};
use shared::stockflow::{
    analyze_process_completion, compute_requirements, prepare_archive, prepare_dispatch,
    prepare_issue, MaterialRequirement, ProcessCompletionReport, RestoredMaterial, StockflowError,
};
use shared::validation::{validate_dimensions, validate_piece_count};

/// Work order service
#[derive(Clone)]
pub struct WorkOrderService {
    db: PgPool,
}

/// Database row for a work order; line items live in a JSONB document
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WorkOrderRow {
    id: Uuid,
    order_number: String,
    client_id: Uuid,
    items: sqlx::types::Json<Vec<WorkOrderItem>>,
    status: String,
    notes: Option<String>,
    purchase_order: Option<String>,
    quote_id: Option<Uuid>,
    quote_number: Option<String>,
    completion_reason: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkOrderRow> for WorkOrder {
    type Error = AppError;

    fn try_from(row: WorkOrderRow) -> Result<Self, Self::Error> {
        let status = super::parse_status(OrderStatus::parse(&row.status), "status", &row.status)?;
        Ok(WorkOrder {
            id: row.id,
            order_number: row.order_number,
            client_id: row.client_id,
            items: row.items.0,
            status,
            notes: row.notes,
            purchase_order: row.purchase_order,
            quote_id: row.quote_id,
            quote_number: row.quote_number,
            completion_reason: row.completion_reason,
            created_at: row.created_at,
            completed_at: row.completed_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) const ORDER_COLUMNS: &str = "id, order_number, client_id, items, status, notes, purchase_order, quote_id, quote_number, completion_reason, created_at, completed_at, updated_at";

/// One line of a new work order
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    /// Product line when set; otherwise a service line
    pub product_id: Option<Uuid>,
    /// Catalog service for a service line; free-text lines set
    /// `service_name` and `unit_price` instead
    pub service_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub quantity: i32,
    pub width_mm: Decimal,
    pub height_mm: Decimal,
    /// Overrides the computed price per piece when set
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for creating a work order
#[derive(Debug, Deserialize)]
pub struct CreateWorkOrderInput {
    pub client_id: Uuid,
    pub items: Vec<OrderItemInput>,
    pub notes: Option<String>,
    pub purchase_order: Option<String>,
}

/// Input for updating a draft work order. Items are supplied in full; the
/// service re-asserts the mandatory process steps of each product.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkOrderInput {
    pub client_id: Option<Uuid>,
    pub items: Option<Vec<WorkOrderItem>>,
    pub notes: Option<String>,
    pub purchase_order: Option<String>,
}

/// Input for changing the status of one process step
#[derive(Debug, Deserialize)]
pub struct UpdateStepInput {
    pub status: StepStatus,
}

/// Result of an issuance attempt. Insufficient stock is a first-class
/// outcome with the per-material shortfall, not an error: the caller needs
/// the full breakdown to render a decision, and nothing was persisted.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IssueOutcome {
    Issued {
        order: WorkOrder,
        requirements: Vec<MaterialRequirement>,
        material_summary: String,
    },
    InsufficientStock {
        requirements: Vec<MaterialRequirement>,
    },
}

/// Result of archiving a work order
#[derive(Debug, Serialize)]
pub struct ArchiveOutcome {
    pub order: WorkOrder,
    pub restored: Vec<RestoredMaterial>,
    pub delivery_note_archived: bool,
    pub quote_archived: bool,
}

/// Result of generating a delivery note
#[derive(Debug, Serialize)]
pub struct DispatchOutcome {
    pub delivery_note: DeliveryNote,
    pub order: WorkOrder,
}

impl From<StockflowError> for AppError {
    fn from(error: StockflowError) -> Self {
        AppError::InvalidStateTransition(error.to_string())
    }
}

impl WorkOrderService {
    /// Create a new WorkOrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all work orders, newest first
    pub async fn list_orders(&self) -> AppResult<Vec<WorkOrder>> {
        let rows = sqlx::query_as::<_, WorkOrderRow>(&format!(
            "SELECT {} FROM work_orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(WorkOrder::try_from).collect()
    }

    /// Get a work order by ID
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<WorkOrder> {
        let row = sqlx::query_as::<_, WorkOrderRow>(&format!(
            "SELECT {} FROM work_orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Work order".to_string()))?;

        row.try_into()
    }

    /// Create a draft work order. Product lines snapshot the product's
    /// materials and process attachments at this moment.
    pub async fn create_order(&self, input: CreateWorkOrderInput) -> AppResult<WorkOrder> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A work order needs at least one item".to_string(),
                message_hr: "Radni nalog mora imati barem jednu stavku".to_string(),
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

        let items = self.build_items(&input.items).await?;

        let mut tx = self.db.begin().await?;
        let order_number = generate_order_number(&mut tx).await?;

        let row = sqlx::query_as::<_, WorkOrderRow>(&format!(
            r#"
            INSERT INTO work_orders (order_number, client_id, items, status, notes, purchase_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&order_number)
        .bind(input.client_id)
        .bind(sqlx::types::Json(&items))
        .bind(OrderStatus::Draft.as_str())
        .bind(&input.notes)
        .bind(&input.purchase_order)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Created work order {}", order_number);
        row.try_into()
    }

    /// Update a draft work order
    pub async fn update_order(
        &self,
        order_id: Uuid,
        input: UpdateWorkOrderInput,
    ) -> AppResult<WorkOrder> {
        let existing = self.get_order(order_id).await?;
        if existing.status != OrderStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "work order {} is {}, only drafts can be edited",
                existing.order_number, existing.status
            )));
        }

        let items = match input.items {
            Some(items) => {
                self.validate_replacement_items(&items).await?;
                items
            }
            None => existing.items,
        };

        let row = sqlx::query_as::<_, WorkOrderRow>(&format!(
            r#"
            UPDATE work_orders
            SET client_id = $1, items = $2, notes = $3, purchase_order = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(input.client_id.unwrap_or(existing.client_id))
        .bind(sqlx::types::Json(&items))
        .bind(input.notes.or(existing.notes))
        .bind(input.purchase_order.or(existing.purchase_order))
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Delete a draft work order
    pub async fn delete_order(&self, order_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM work_orders WHERE id = $1 AND status = 'draft'")
            .bind(order_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing order from a non-draft one
            let order = self.get_order(order_id).await?;
            return Err(AppError::InvalidStateTransition(format!(
                "work order {} is {}, only drafts can be deleted",
                order.order_number, order.status
            )));
        }

        Ok(())
    }

    /// Cancel a draft work order. Issued orders hold deducted stock and go
    /// through archival instead.
    pub async fn cancel_order(&self, order_id: Uuid) -> AppResult<WorkOrder> {
        let order = self.get_order(order_id).await?;
        if order.status != OrderStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "work order {} is {}, archive it to reverse its stock",
                order.order_number, order.status
            )));
        }

        let row = sqlx::query_as::<_, WorkOrderRow>(&format!(
            r#"
            UPDATE work_orders SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(OrderStatus::Cancelled.as_str())
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Dry-run requirement check against current stock, for display
    pub async fn get_requirements(&self, order_id: Uuid) -> AppResult<Vec<MaterialRequirement>> {
        let order = self.get_order(order_id).await?;
        let products = self.load_products(&order.items).await?;
        let inventory = self.load_inventory_snapshot(&order.items).await?;

        Ok(compute_requirements(&order.items, &products, &inventory))
    }

    /// Issue a draft work order: check sufficiency against locked inventory
    /// rows, deduct stock, append ledger entries and move the order to
    /// pending, all in one transaction.
    pub async fn issue_order(&self, order_id: Uuid) -> AppResult<IssueOutcome> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let order = lock_order(&mut tx, order_id).await?;
        if order.status != OrderStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "work order {} is {}, only drafts can be issued",
                order.order_number, order.status
            )));
        }

        let products = load_products_tx(&mut tx, &order.items).await?;
        let inventory = lock_inventory(&mut tx, material_item_ids(&order.items)).await?;

        let prep = prepare_issue(&order, &products, &inventory, now);

        if !prep.sufficient {
            tx.rollback().await?;
            return Ok(IssueOutcome::InsufficientStock {
                requirements: prep.requirements,
            });
        }

        for item in &prep.updated_inventory {
            sqlx::query(
                "UPDATE inventory_items SET quantity = $1, updated_at = $2 WHERE id = $3",
            )
            .bind(item.quantity)
            .bind(now)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
        }

        for entry in &prep.new_transactions {
            insert_transaction(&mut tx, entry).await?;
        }

        sqlx::query("UPDATE work_orders SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(prep.updated_order.status.as_str())
            .bind(now)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Issued work order {} ({} materials deducted)",
            prep.updated_order.order_number,
            prep.new_transactions.len()
        );

        Ok(IssueOutcome::Issued {
            order: prep.updated_order,
            requirements: prep.requirements,
            material_summary: prep.material_summary,
        })
    }

    /// Archive a work order: credit consumed materials back, append the
    /// reversal ledger entries and cascade the archived status to the
    /// order's delivery note and originating quote, atomically.
    pub async fn archive_order(&self, order_id: Uuid) -> AppResult<ArchiveOutcome> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let order = lock_order(&mut tx, order_id).await?;

        let transactions = load_order_transactions(&mut tx, order_id).await?;
        let item_ids: Vec<Uuid> = transactions
            .iter()
            .map(|t| t.inventory_item_id)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        let inventory = lock_inventory(&mut tx, item_ids).await?;

        let delivery_note = lock_delivery_note(&mut tx, order_id).await?;
        let quote = match order.quote_id {
            Some(quote_id) => lock_quote(&mut tx, quote_id).await?,
            None => None,
        };

        let prep = prepare_archive(
            &order,
            &transactions,
            &inventory,
            delivery_note.as_ref(),
            quote.as_ref(),
            now,
        )?;

        for item in &prep.updated_inventory {
            sqlx::query(
                "UPDATE inventory_items SET quantity = $1, updated_at = $2 WHERE id = $3",
            )
            .bind(item.quantity)
            .bind(now)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
        }

        for entry in &prep.new_transactions {
            insert_transaction(&mut tx, entry).await?;
        }

        sqlx::query("UPDATE work_orders SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(OrderStatus::Archived.as_str())
            .bind(now)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        if let Some(note) = &prep.updated_delivery_note {
            sqlx::query("UPDATE delivery_notes SET status = $1 WHERE id = $2")
                .bind(note.status.as_str())
                .bind(note.id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(archived_quote) = &prep.updated_quote {
            sqlx::query("UPDATE quotes SET status = $1, updated_at = $2 WHERE id = $3")
                .bind(archived_quote.status.as_str())
                .bind(now)
                .bind(archived_quote.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Archived work order {} ({} materials restored)",
            prep.updated_order.order_number,
            prep.restored.len()
        );

        Ok(ArchiveOutcome {
            order: prep.updated_order,
            restored: prep.restored,
            delivery_note_archived: prep.updated_delivery_note.is_some(),
            quote_archived: prep.updated_quote.is_some(),
        })
    }

    /// Classify every process step of the order as complete or incomplete,
    /// for the confirmation dialog shown before dispatch. Read only.
    pub async fn get_process_completion(&self, order_id: Uuid) -> AppResult<ProcessCompletionReport> {
        let order = self.get_order(order_id).await?;
        Ok(analyze_process_completion(&order))
    }

    /// Generate the delivery note for an issued order and finalize the
    /// order: every process step is forced to completed and the order moves
    /// to completed. Workshop business rule, preserved as-is.
    pub async fn generate_delivery_note(
        &self,
        order_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<DispatchOutcome> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let order = lock_order(&mut tx, order_id).await?;

        let existing: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM delivery_notes WHERE work_order_id = $1)",
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;
        if existing {
            return Err(AppError::Conflict {
                resource: "delivery_note".to_string(),
                message: format!(
                    "work order {} already has a delivery note",
                    order.order_number
                ),
                message_hr: "Radni nalog već ima otpremnicu".to_string(),
            });
        }

        let delivery_number = generate_delivery_number(&mut tx).await?;
        let prep = prepare_dispatch(&order, &delivery_number, now)?;

        let mut delivery_note = prep.delivery_note;
        delivery_note.notes = notes;

        sqlx::query(
            r#"
            INSERT INTO delivery_notes
                (id, delivery_number, work_order_id, client_id, items, status, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(delivery_note.id)
        .bind(&delivery_note.delivery_number)
        .bind(delivery_note.work_order_id)
        .bind(delivery_note.client_id)
        .bind(sqlx::types::Json(&delivery_note.items))
        .bind(delivery_note.status.as_str())
        .bind(&delivery_note.notes)
        .bind(delivery_note.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::Conflict {
                    resource: "delivery_number".to_string(),
                    message: "delivery number collision, please retry".to_string(),
                    message_hr: "Kolizija broja otpremnice, pokušajte ponovno".to_string(),
                }
            } else {
                AppError::from(e)
            }
        })?;

        sqlx::query(
            r#"
            UPDATE work_orders
            SET items = $1, status = $2, completed_at = $3, completion_reason = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(sqlx::types::Json(&prep.updated_order.items))
        .bind(prep.updated_order.status.as_str())
        .bind(prep.updated_order.completed_at)
        .bind(&prep.updated_order.completion_reason)
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Generated delivery note {} for work order {}",
            delivery_note.delivery_number,
            prep.updated_order.order_number
        );

        Ok(DispatchOutcome {
            delivery_note,
            order: prep.updated_order,
        })
    }

    /// Change the status of one process step on an issued order. Starting
    /// the first step moves a pending order to in-progress.
    pub async fn update_step_status(
        &self,
        order_id: Uuid,
        item_index: usize,
        material_index: usize,
        step_index: usize,
        input: UpdateStepInput,
    ) -> AppResult<WorkOrder> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let mut order = lock_order(&mut tx, order_id).await?;
        if !matches!(order.status, OrderStatus::Pending | OrderStatus::InProgress) {
            return Err(AppError::InvalidStateTransition(format!(
                "work order {} is {}, steps are tracked on issued orders",
                order.order_number, order.status
            )));
        }

        let step = order
            .items
            .get_mut(item_index)
            .and_then(|item| item.materials.get_mut(material_index))
            .and_then(|material| material.steps.get_mut(step_index))
            .ok_or_else(|| AppError::NotFound("Process step".to_string()))?;

        step.status = input.status;
        step.completed_at = match input.status {
            StepStatus::Completed => step.completed_at.or(Some(now)),
            _ => None,
        };

        if order.status == OrderStatus::Pending && input.status != StepStatus::Pending {
            order.status = OrderStatus::InProgress;
        }
        order.updated_at = now;

        sqlx::query(
            "UPDATE work_orders SET items = $1, status = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(sqlx::types::Json(&order.items))
        .bind(order.status.as_str())
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(order)
    }

    // ------------------------------------------------------------------
    // Item construction and validation
    // ------------------------------------------------------------------

    pub(crate) async fn build_items(
        &self,
        inputs: &[OrderItemInput],
    ) -> AppResult<Vec<WorkOrderItem>> {
        let mut items = Vec::with_capacity(inputs.len());

        for input in inputs {
            validate_piece_count(input.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
                message_hr: "Količina nije ispravna".to_string(),
            })?;

            let dimensions =
                shared::types::Dimensions::new(input.width_mm, input.height_mm);

            let item = if let Some(product_id) = input.product_id {
                validate_dimensions(&dimensions).map_err(|e| AppError::Validation {
                    field: "dimensions".to_string(),
                    message: e.to_string(),
                    message_hr: "Dimenzije nisu ispravne".to_string(),
                })?;

                let product = self.load_product(product_id).await?;
                let inventory = self
                    .load_inventory_for_materials(&product.materials)
                    .await?;
                let processes = self.load_processes_for_product(&product).await?;

                let materials: Vec<ItemMaterial> = product
                    .materials
                    .iter()
                    .map(|m| ItemMaterial::from_product_material(m, &inventory))
                    .collect();

                let unit_price = match input.unit_price {
                    Some(price) => price,
                    None => default_unit_price(&product, &dimensions, &processes, &inventory),
                };

                WorkOrderItem {
                    reference: LineRef::Product {
                        product_id,
                        name: product.name.clone(),
                    },
                    quantity: input.quantity,
                    dimensions,
                    unit_price,
                    materials,
                    notes: input.notes.clone(),
                }
            } else {
                let (service_id, name, price) = match input.service_id {
                    Some(service_id) => {
                        let row = sqlx::query_as::<_, (String, Decimal)>(
                            "SELECT name, price FROM services WHERE id = $1",
                        )
                        .bind(service_id)
                        .fetch_optional(&self.db)
                        .await?
                        .ok_or_else(|| AppError::NotFound("Service".to_string()))?;
                        (Some(service_id), row.0, row.1)
                    }
                    None => {
                        let name = input.service_name.clone().filter(|n| !n.trim().is_empty());
                        let Some(name) = name else {
                            return Err(AppError::Validation {
                                field: "items".to_string(),
                                message: "A line needs a product, a service or a name"
                                    .to_string(),
                                message_hr: "Stavka mora imati proizvod, uslugu ili naziv"
                                    .to_string(),
                            });
                        };
                        let Some(price) = input.unit_price else {
                            return Err(AppError::Validation {
                                field: "unit_price".to_string(),
                                message: "A free-text service line needs a price".to_string(),
                                message_hr: "Slobodna stavka mora imati cijenu".to_string(),
                            });
                        };
                        (None, name, price)
                    }
                };

                WorkOrderItem {
                    reference: LineRef::Service { service_id, name },
                    quantity: input.quantity,
                    dimensions,
                    unit_price: input.unit_price.unwrap_or(price),
                    materials: Vec::new(),
                    notes: input.notes.clone(),
                }
            };

            items.push(item);
        }

        Ok(items)
    }

    /// Validate a full item replacement from the order editor: product
    /// lines must still resolve, and every mandatory process attachment of
    /// the product must be present on the matching material. Missing
    /// mandatory steps are rejected, not silently repaired.
    pub(crate) async fn validate_replacement_items(
        &self,
        items: &[WorkOrderItem],
    ) -> AppResult<()> {
        for item in items {
            validate_piece_count(item.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
                message_hr: "Količina nije ispravna".to_string(),
            })?;

            let Some(product_id) = item.reference.product_id() else {
                continue;
            };

            validate_dimensions(&item.dimensions).map_err(|e| AppError::Validation {
                field: "dimensions".to_string(),
                message: e.to_string(),
                message_hr: "Dimenzije nisu ispravne".to_string(),
            })?;

            let product = self.load_product(product_id).await?;

            for product_material in &product.materials {
                let material = item
                    .materials
                    .iter()
                    .find(|m| m.inventory_item_id == product_material.inventory_item_id)
                    .ok_or_else(|| AppError::Validation {
                        field: "materials".to_string(),
                        message: format!(
                            "material of product {} is missing from the line",
                            product.code
                        ),
                        message_hr: "Stavci nedostaje materijal proizvoda".to_string(),
                    })?;

                for attachment in &product_material.process_steps {
                    if !attachment.is_mandatory() {
                        continue;
                    }
                    let present = material.steps.iter().any(|s| {
                        s.process_id == attachment.process_id() && s.mandatory
                    });
                    if !present {
                        return Err(AppError::Validation {
                            field: "materials".to_string(),
                            message: format!(
                                "mandatory process step removed from material on product {}",
                                product.code
                            ),
                            message_hr: "Obavezna obrada ne smije se ukloniti sa stavke"
                                .to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Loading helpers
    // ------------------------------------------------------------------

    async fn load_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    async fn load_products(&self, items: &[WorkOrderItem]) -> AppResult<Vec<Product>> {
        let ids: Vec<Uuid> = items.iter().filter_map(|i| i.reference.product_id()).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = ANY($1)",
            PRODUCT_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn load_inventory_snapshot(
        &self,
        items: &[WorkOrderItem],
    ) -> AppResult<Vec<InventoryItem>> {
        let ids = material_item_ids(items);
        let rows = sqlx::query_as::<_, InventoryItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE id = ANY($1)",
            ITEM_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    async fn load_inventory_for_materials(
        &self,
        materials: &[shared::models::ProductMaterial],
    ) -> AppResult<Vec<InventoryItem>> {
        let ids: Vec<Uuid> = materials.iter().map(|m| m.inventory_item_id).collect();
        let rows = sqlx::query_as::<_, InventoryItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE id = ANY($1)",
            ITEM_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    async fn load_processes_for_product(
        &self,
        product: &Product,
    ) -> AppResult<Vec<shared::models::Process>> {
        let ids: Vec<Uuid> = product
            .materials
            .iter()
            .flat_map(|m| m.process_steps.iter().map(|a| a.process_id()))
            .collect();
        let rows = sqlx::query_as::<_, crate::services::processes::ProcessRow>(&format!(
            "SELECT {} FROM processes WHERE id = ANY($1)",
            crate::services::processes::PROCESS_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(shared::models::Process::from).collect())
    }
}

/// Default price per piece for a product line: base product price billed
/// per m², plus the cost of every attached process.
fn default_unit_price(
    product: &Product,
    dimensions: &shared::types::Dimensions,
    processes: &[shared::models::Process],
    inventory: &[InventoryItem],
) -> Decimal {
    let mut price = product.price * dimensions.area_m2();

    for material in &product.materials {
        let thickness = inventory
            .iter()
            .find(|i| i.id == material.inventory_item_id)
            .and_then(|i| i.glass_thickness_mm);

        for attachment in &material.process_steps {
            let Some(process) = processes.iter().find(|p| p.id == attachment.process_id())
            else {
                continue;
            };
            if let Some(cost) = process.cost_for_piece(dimensions, thickness) {
                price += cost;
            }
        }
    }

    price
}

/// Inventory item ids referenced by the items' materials, deduplicated
fn material_item_ids(items: &[WorkOrderItem]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::new();
    for item in items {
        for material in &item.materials {
            if !ids.contains(&material.inventory_item_id) {
                ids.push(material.inventory_item_id);
            }
        }
    }
    ids
}

// ----------------------------------------------------------------------
// Transaction-scoped helpers
// ----------------------------------------------------------------------

async fn lock_order(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> AppResult<WorkOrder> {
    let row = sqlx::query_as::<_, WorkOrderRow>(&format!(
        "SELECT {} FROM work_orders WHERE id = $1 FOR UPDATE",
        ORDER_COLUMNS
    ))
    .bind(order_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Work order".to_string()))?;

    row.try_into()
}

/// Lock inventory rows in a stable order so concurrent issuances touching
/// the same items cannot deadlock.
async fn lock_inventory(
    tx: &mut Transaction<'_, Postgres>,
    ids: Vec<Uuid>,
) -> AppResult<Vec<InventoryItem>> {
    let rows = sqlx::query_as::<_, InventoryItemRow>(&format!(
        "SELECT {} FROM inventory_items WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        ITEM_COLUMNS
    ))
    .bind(&ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().map(InventoryItem::from).collect())
}

async fn load_products_tx(
    tx: &mut Transaction<'_, Postgres>,
    items: &[WorkOrderItem],
) -> AppResult<Vec<Product>> {
    let ids: Vec<Uuid> = items.iter().filter_map(|i| i.reference.product_id()).collect();
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {} FROM products WHERE id = ANY($1)",
        PRODUCT_COLUMNS
    ))
    .bind(&ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}

async fn load_order_transactions(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> AppResult<Vec<StockTransaction>> {
    let rows = sqlx::query_as::<_, StockTransactionRow>(&format!(
        "SELECT {} FROM stock_transactions WHERE work_order_id = $1 ORDER BY created_at",
        TRANSACTION_COLUMNS
    ))
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?;

    rows.into_iter().map(StockTransaction::try_from).collect()
}

async fn lock_delivery_note(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> AppResult<Option<DeliveryNote>> {
    let row = sqlx::query_as::<_, DeliveryNoteRow>(&format!(
        "SELECT {} FROM delivery_notes WHERE work_order_id = $1 FOR UPDATE",
        DELIVERY_NOTE_COLUMNS
    ))
    .bind(order_id)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(DeliveryNote::try_from).transpose()
}

async fn lock_quote(
    tx: &mut Transaction<'_, Postgres>,
    quote_id: Uuid,
) -> AppResult<Option<Quote>> {
    let row = sqlx::query_as::<_, QuoteRow>(&format!(
        "SELECT {} FROM quotes WHERE id = $1 FOR UPDATE",
        QUOTE_COLUMNS
    ))
    .bind(quote_id)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(Quote::try_from).transpose()
}

async fn insert_transaction(
    tx: &mut Transaction<'_, Postgres>,
    entry: &StockTransaction,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_transactions
            (id, inventory_item_id, work_order_id, kind, quantity,
             previous_quantity, new_quantity, notes, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(entry.id)
    .bind(entry.inventory_item_id)
    .bind(entry.work_order_id)
    .bind(entry.kind.as_str())
    .bind(entry.quantity)
    .bind(entry.previous_quantity)
    .bind(entry.new_quantity)
    .bind(&entry.notes)
    .bind(entry.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Generate an unused work-order number, retrying on the unlikely
/// collision of the random suffix
pub(crate) async fn generate_order_number(
    tx: &mut Transaction<'_, Postgres>,
) -> AppResult<String> {
    let today = Utc::now().date_naive();
    for _ in 0..super::NUMBER_RETRIES {
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
        let candidate = format_order_number(today, suffix);
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM work_orders WHERE order_number = $1)",
        )
        .bind(&candidate)
        .fetch_one(&mut **tx)
        .await?;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(AppError::Conflict {
        resource: "order_number".to_string(),
        message: "could not generate a free order number".to_string(),
        message_hr: "Nije moguće dodijeliti broj radnog naloga".to_string(),
    })
}

/// Generate an unused delivery-note number
async fn generate_delivery_number(tx: &mut Transaction<'_, Postgres>) -> AppResult<String> {
    let today = Utc::now().date_naive();
    for _ in 0..super::NUMBER_RETRIES {
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
        let candidate = format_delivery_number(today, suffix);
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM delivery_notes WHERE delivery_number = $1)",
        )
        .bind(&candidate)
        .fetch_one(&mut **tx)
        .await?;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(AppError::Conflict {
        resource: "delivery_number".to_string(),
        message: "could not generate a free delivery number".to_string(),
        message_hr: "Nije moguće dodijeliti broj otpremnice".to_string(),
    })
}
