//! Inventory management service for stock items and the movement ledger
//!
//! Stock quantities are only ever changed together with an appended ledger
//! entry, inside one database transaction. Work-order issuance and archival
//! write their entries through the work-order service; this service covers
//! manual movements (goods receipt, stocktake corrections).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{InventoryItem, InventoryKind, StockTransaction, TransactionKind};
use shared::types::Unit;
use shared::validation::{validate_glass_thickness, validate_item_code};

/// Inventory service for stock items and transactions
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Database row for an inventory item
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct InventoryItemRow {
    id: Uuid,
    name: String,
    code: String,
    unit: sqlx::types::Json<Unit>,
    quantity: Decimal,
    kind: Option<sqlx::types::Json<InventoryKind>>,
    glass_thickness_mm: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryItemRow> for InventoryItem {
    fn from(row: InventoryItemRow) -> Self {
        InventoryItem {
            id: row.id,
            name: row.name,
            code: row.code,
            unit: row.unit.0,
            quantity: row.quantity,
            kind: row.kind.map(|k| k.0),
            glass_thickness_mm: row.glass_thickness_mm,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a stock transaction
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StockTransactionRow {
    id: Uuid,
    inventory_item_id: Uuid,
    work_order_id: Option<Uuid>,
    kind: String,
    quantity: Decimal,
    previous_quantity: Decimal,
    new_quantity: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<StockTransactionRow> for StockTransaction {
    type Error = AppError;

    fn try_from(row: StockTransactionRow) -> Result<Self, Self::Error> {
        let kind = super::parse_status(TransactionKind::parse(&row.kind), "kind", &row.kind)?;
        Ok(StockTransaction {
            id: row.id,
            inventory_item_id: row.inventory_item_id,
            work_order_id: row.work_order_id,
            kind,
            quantity: row.quantity,
            previous_quantity: row.previous_quantity,
            new_quantity: row.new_quantity,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// Input for creating an inventory item
#[derive(Debug, Deserialize)]
pub struct CreateInventoryItemInput {
    pub name: String,
    pub code: String,
    pub unit: Unit,
    /// Opening stock; recorded as a receipt when positive
    pub quantity: Option<Decimal>,
    pub kind: Option<InventoryKind>,
    pub glass_thickness_mm: Option<Decimal>,
}

/// Input for updating an inventory item's master data. Quantity is not
/// editable here; stock moves only through transactions.
#[derive(Debug, Deserialize)]
pub struct UpdateInventoryItemInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub unit: Option<Unit>,
    pub kind: Option<InventoryKind>,
    pub glass_thickness_mm: Option<Decimal>,
}

/// Input for a manual stock movement
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub kind: TransactionKind,
    /// Receipt: positive quantity received. Adjustment: signed delta.
    pub quantity: Decimal,
    pub notes: Option<String>,
}

pub(crate) const ITEM_COLUMNS: &str =
    "id, name, code, unit, quantity, kind, glass_thickness_mm, created_at, updated_at";

pub(crate) const TRANSACTION_COLUMNS: &str = "id, inventory_item_id, work_order_id, kind, quantity, previous_quantity, new_quantity, notes, created_at";

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn validate_master_data(
        name: &str,
        code: &str,
        glass_thickness_mm: Option<Decimal>,
    ) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Item name cannot be empty".to_string(),
                message_hr: "Naziv materijala ne smije biti prazan".to_string(),
            });
        }
        validate_item_code(code).map_err(|e| AppError::Validation {
            field: "code".to_string(),
            message: e.to_string(),
            message_hr: "Šifra materijala nije ispravna".to_string(),
        })?;
        if let Some(thickness) = glass_thickness_mm {
            validate_glass_thickness(thickness).map_err(|e| AppError::Validation {
                field: "glass_thickness_mm".to_string(),
                message: e.to_string(),
                message_hr: "Debljina stakla nije ispravna".to_string(),
            })?;
        }
        Ok(())
    }

    /// List all inventory items
    pub async fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, InventoryItemRow>(&format!(
            "SELECT {} FROM inventory_items ORDER BY name",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    /// Get an inventory item by ID
    pub async fn get_item(&self, item_id: Uuid) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, InventoryItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        Ok(row.into())
    }

    /// Create an inventory item. Opening stock is recorded as a receipt
    /// transaction so the ledger accounts for every unit from day one.
    pub async fn create_item(&self, input: CreateInventoryItemInput) -> AppResult<InventoryItem> {
        Self::validate_master_data(&input.name, &input.code, input.glass_thickness_mm)?;

        let opening = input.quantity.unwrap_or(Decimal::ZERO);
        if opening < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Opening stock cannot be negative".to_string(),
                message_hr: "Početna zaliha ne smije biti negativna".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, InventoryItemRow>(&format!(
            r#"
            INSERT INTO inventory_items (name, code, unit, quantity, kind, glass_thickness_mm)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.code)
        .bind(sqlx::types::Json(input.unit))
        .bind(opening)
        .bind(input.kind.map(sqlx::types::Json))
        .bind(input.glass_thickness_mm)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::DuplicateEntry("code".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        if opening > Decimal::ZERO {
            sqlx::query(
                r#"
                INSERT INTO stock_transactions
                    (inventory_item_id, kind, quantity, previous_quantity, new_quantity, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.id)
            .bind(TransactionKind::Receipt.as_str())
            .bind(opening)
            .bind(Decimal::ZERO)
            .bind(opening)
            .bind("Početno stanje zalihe")
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Update an inventory item's master data
    pub async fn update_item(
        &self,
        item_id: Uuid,
        input: UpdateInventoryItemInput,
    ) -> AppResult<InventoryItem> {
        let existing = self.get_item(item_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let code = input.code.unwrap_or(existing.code);
        let glass_thickness_mm = input.glass_thickness_mm.or(existing.glass_thickness_mm);
        Self::validate_master_data(&name, &code, glass_thickness_mm)?;

        let row = sqlx::query_as::<_, InventoryItemRow>(&format!(
            r#"
            UPDATE inventory_items
            SET name = $1, code = $2, unit = $3, kind = $4, glass_thickness_mm = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&name)
        .bind(&code)
        .bind(sqlx::types::Json(input.unit.unwrap_or(existing.unit)))
        .bind(input.kind.or(existing.kind).map(sqlx::types::Json))
        .bind(glass_thickness_mm)
        .bind(item_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::DuplicateEntry("code".to_string())
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        Ok(row.into())
    }

    /// Delete an inventory item
    pub async fn delete_item(&self, item_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inventory item".to_string()));
        }

        Ok(())
    }

    /// Record a manual stock movement (receipt or adjustment) and apply it
    /// to the item's quantity in one transaction
    pub async fn adjust_stock(
        &self,
        item_id: Uuid,
        input: AdjustStockInput,
    ) -> AppResult<StockTransaction> {
        let delta = match input.kind {
            TransactionKind::Receipt => {
                if input.quantity <= Decimal::ZERO {
                    return Err(AppError::Validation {
                        field: "quantity".to_string(),
                        message: "Receipt quantity must be positive".to_string(),
                        message_hr: "Primljena količina mora biti pozitivna".to_string(),
                    });
                }
                input.quantity
            }
            TransactionKind::Adjustment => {
                if input.quantity == Decimal::ZERO {
                    return Err(AppError::Validation {
                        field: "quantity".to_string(),
                        message: "Adjustment delta cannot be zero".to_string(),
                        message_hr: "Korekcija ne smije biti nula".to_string(),
                    });
                }
                input.quantity
            }
            TransactionKind::Out | TransactionKind::Return => {
                return Err(AppError::Validation {
                    field: "kind".to_string(),
                    message: "Issue and return movements are recorded through work orders"
                        .to_string(),
                    message_hr: "Izdavanje i povrat knjiže se preko radnih naloga".to_string(),
                });
            }
        };

        let mut tx = self.db.begin().await?;

        let previous: Decimal =
            sqlx::query_scalar("SELECT quantity FROM inventory_items WHERE id = $1 FOR UPDATE")
                .bind(item_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let new_quantity = previous + delta;

        sqlx::query("UPDATE inventory_items SET quantity = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_quantity)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, StockTransactionRow>(&format!(
            r#"
            INSERT INTO stock_transactions
                (inventory_item_id, kind, quantity, previous_quantity, new_quantity, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(item_id)
        .bind(input.kind.as_str())
        .bind(delta.abs())
        .bind(previous)
        .bind(new_quantity)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Get the ledger for one inventory item, newest first
    pub async fn get_item_transactions(&self, item_id: Uuid) -> AppResult<Vec<StockTransaction>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM inventory_items WHERE id = $1)",
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Inventory item".to_string()));
        }

        let rows = sqlx::query_as::<_, StockTransactionRow>(&format!(
            r#"
            SELECT {}
            FROM stock_transactions
            WHERE inventory_item_id = $1
            ORDER BY created_at DESC
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockTransaction::try_from).collect()
    }

    /// List the whole ledger, newest first
    pub async fn list_transactions(&self) -> AppResult<Vec<StockTransaction>> {
        let rows = sqlx::query_as::<_, StockTransactionRow>(&format!(
            "SELECT {} FROM stock_transactions ORDER BY created_at DESC",
            TRANSACTION_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockTransaction::try_from).collect()
    }
}
