//! Work-order archival preparation
//!
//! Archiving reverses a committed order: consumed materials are credited
//! back to stock through `return` ledger entries, and the status change
//! cascades to the order's delivery note and originating quote. Archiving
//! a draft is a pure status flip, never a credit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    DeliveryNote, DeliveryNoteStatus, InventoryItem, OrderStatus, Quote, QuoteStatus,
    StockTransaction, TransactionKind, WorkOrder,
};
use crate::stockflow::StockflowError;
use crate::types::Unit;

/// A material credited back by the reversal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestoredMaterial {
    pub inventory_item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
}

/// Result of preparing an archival. The caller persists the whole set as
/// one unit: inventory credit, reversal ledger entries, the archived order
/// and the cascaded delivery-note/quote statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivePreparation {
    pub updated_inventory: Vec<InventoryItem>,
    pub new_transactions: Vec<StockTransaction>,
    pub updated_order: WorkOrder,
    pub updated_delivery_note: Option<DeliveryNote>,
    pub updated_quote: Option<Quote>,
    pub restored: Vec<RestoredMaterial>,
}

/// Prepare the archival of a work order.
///
/// Rejects an already-archived order before anything else, so a double
/// archive can never produce a double credit. The order's consumption is
/// located through the `work_order_id` link on its `out` ledger entries.
pub fn prepare_archive(
    order: &WorkOrder,
    transactions: &[StockTransaction],
    inventory: &[InventoryItem],
    delivery_note: Option<&DeliveryNote>,
    quote: Option<&Quote>,
    now: DateTime<Utc>,
) -> Result<ArchivePreparation, StockflowError> {
    if order.status == OrderStatus::Archived {
        return Err(StockflowError::AlreadyArchived {
            order_number: order.order_number.clone(),
        });
    }

    let mut updated_order = order.clone();
    updated_order.status = OrderStatus::Archived;
    updated_order.updated_at = now;

    let updated_delivery_note = delivery_note.map(|note| {
        let mut archived = note.clone();
        archived.status = DeliveryNoteStatus::Archived;
        archived
    });

    let updated_quote = quote.map(|q| {
        let mut archived = q.clone();
        archived.status = QuoteStatus::Archived;
        archived.updated_at = now;
        archived
    });

    // Nothing was ever deducted for a draft; the reversal must not invent
    // a credit.
    if order.status == OrderStatus::Draft {
        return Ok(ArchivePreparation {
            updated_inventory: inventory.to_vec(),
            new_transactions: Vec::new(),
            updated_order,
            updated_delivery_note,
            updated_quote,
            restored: Vec::new(),
        });
    }

    // Sum this order's consumption per inventory item, in first-encounter
    // order for deterministic output.
    let mut credits: Vec<(Uuid, Decimal)> = Vec::new();
    for tx in transactions {
        if tx.kind != TransactionKind::Out || tx.work_order_id != Some(order.id) {
            continue;
        }
        match credits.iter_mut().find(|(id, _)| *id == tx.inventory_item_id) {
            Some((_, total)) => *total += tx.quantity,
            None => credits.push((tx.inventory_item_id, tx.quantity)),
        }
    }

    let mut updated_inventory = inventory.to_vec();
    let mut new_transactions = Vec::new();
    let mut restored = Vec::new();

    for (inventory_item_id, quantity) in credits {
        // A credit for an item deleted in the meantime has nowhere to go;
        // skip it rather than resurrect the row.
        let Some(item) = updated_inventory
            .iter_mut()
            .find(|i| i.id == inventory_item_id)
        else {
            continue;
        };

        let previous_quantity = item.quantity;
        item.quantity += quantity;
        item.updated_at = now;

        new_transactions.push(StockTransaction {
            id: Uuid::new_v4(),
            inventory_item_id,
            work_order_id: Some(order.id),
            kind: TransactionKind::Return,
            quantity,
            previous_quantity,
            new_quantity: previous_quantity + quantity,
            notes: Some(format!(
                "Povrat materijala, arhiviran radni nalog {}",
                order.order_number
            )),
            created_at: now,
        });

        restored.push(RestoredMaterial {
            inventory_item_id,
            name: item.name.clone(),
            quantity,
            unit: item.unit,
        });
    }

    Ok(ArchivePreparation {
        updated_inventory,
        new_transactions,
        updated_order,
        updated_delivery_note,
        updated_quote,
        restored,
    })
}
