//! Work-order issuance preparation
//!
//! Converting a draft order into a production order: compute requirements,
//! check sufficiency, and when sufficient produce the deducted inventory
//! snapshot, the `out` ledger entries and the order with its status moved
//! to pending. The caller persists all of it as one unit, or nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    InventoryItem, OrderStatus, Product, StockTransaction, TransactionKind, WorkOrder,
};
use crate::stockflow::requirements::{aggregate_requirements, MaterialRequirement, RequirementAccum};

/// Result of preparing an issuance. When `sufficient` is false nothing may
/// be persisted: the inventory snapshot equals the input, the transaction
/// list is empty and the order keeps its draft status. The requirement
/// breakdown is always present so the caller can show the shortfall per
/// material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePreparation {
    pub sufficient: bool,
    pub requirements: Vec<MaterialRequirement>,
    pub updated_inventory: Vec<InventoryItem>,
    pub new_transactions: Vec<StockTransaction>,
    pub updated_order: WorkOrder,
    /// Formatted per-material movement summary for confirmation dialogs
    pub material_summary: String,
}

/// Prepare the issuance of a draft work order.
///
/// The caller guarantees `order.status == Draft`; this function only
/// computes. Inputs are never mutated: the returned inventory is a new
/// snapshot and the input remains intact for rollback and testing.
pub fn prepare_issue(
    order: &WorkOrder,
    products: &[Product],
    inventory: &[InventoryItem],
    now: DateTime<Utc>,
) -> IssuePreparation {
    let accums = aggregate_requirements(&order.items, products, inventory);
    let sufficient = accums.iter().all(|a| a.sufficient());

    let requirements: Vec<MaterialRequirement> = accums
        .iter()
        .map(|a| MaterialRequirement {
            inventory_item_id: a.inventory_item_id,
            name: a.name.clone(),
            required: a.required,
            available: a.available,
            unit: a.unit,
            sufficient: a.sufficient(),
        })
        .collect();

    if !sufficient {
        return IssuePreparation {
            sufficient: false,
            requirements,
            updated_inventory: inventory.to_vec(),
            new_transactions: Vec::new(),
            updated_order: order.clone(),
            material_summary: String::new(),
        };
    }

    let updated_inventory: Vec<InventoryItem> = inventory
        .iter()
        .map(|item| {
            match accums.iter().find(|a| a.inventory_item_id == item.id) {
                Some(accum) => {
                    let mut updated = item.clone();
                    updated.quantity = item.quantity - accum.required;
                    updated.updated_at = now;
                    updated
                }
                None => item.clone(),
            }
        })
        .collect();

    let new_transactions: Vec<StockTransaction> = accums
        .iter()
        .map(|accum| StockTransaction {
            id: Uuid::new_v4(),
            inventory_item_id: accum.inventory_item_id,
            work_order_id: Some(order.id),
            kind: TransactionKind::Out,
            quantity: accum.required,
            previous_quantity: accum.available,
            new_quantity: accum.available - accum.required,
            notes: Some(issue_notes(&order.order_number, accum)),
            created_at: now,
        })
        .collect();

    let material_summary = accums
        .iter()
        .map(|a| {
            format!(
                "{}: -{} {} ({} -> {})",
                a.name,
                a.required,
                a.unit,
                a.available,
                a.available - a.required
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut updated_order = order.clone();
    updated_order.status = OrderStatus::Pending;
    updated_order.updated_at = now;

    IssuePreparation {
        sufficient: true,
        requirements,
        updated_inventory,
        new_transactions,
        updated_order,
        material_summary,
    }
}

/// Human-readable ledger note with the per-line breakdown. Display only,
/// generated deterministically from the order content.
fn issue_notes(order_number: &str, accum: &RequirementAccum) -> String {
    let breakdown = accum
        .contributions
        .iter()
        .map(|c| {
            format!(
                "{} ({} kom × {} m²) = {} {}",
                c.line_name, c.pieces, c.area_m2, c.required, accum.unit
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("Izdano po radnom nalogu {}: {}", order_number, breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemMaterial, LineRef, WorkOrderItem};
    use crate::types::{Dimensions, Unit};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn fixture() -> (WorkOrder, Vec<Product>, Vec<InventoryItem>) {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let now = Utc::now();

        let inventory = vec![InventoryItem {
            id: stock_id,
            name: "Float staklo 4mm".to_string(),
            code: "FLT-4".to_string(),
            unit: Unit::SquareMeter,
            quantity: dec("100"),
            kind: None,
            glass_thickness_mm: Some(dec("4")),
            created_at: now,
            updated_at: now,
        }];

        let products = vec![Product {
            id: product_id,
            name: "Staklo 4mm".to_string(),
            code: "ST-4".to_string(),
            description: None,
            price: dec("20"),
            materials: vec![],
            created_at: now,
            updated_at: now,
        }];

        let order = WorkOrder {
            id: Uuid::new_v4(),
            order_number: "WO250307-000001".to_string(),
            client_id: Uuid::new_v4(),
            items: vec![WorkOrderItem {
                reference: LineRef::Product {
                    product_id,
                    name: "Staklo 4mm".to_string(),
                },
                quantity: 2,
                dimensions: Dimensions::new(dec("1000"), dec("500")),
                unit_price: dec("10"),
                materials: vec![ItemMaterial {
                    inventory_item_id: stock_id,
                    name: "Float staklo 4mm".to_string(),
                    quantity_per_unit: dec("0.5"),
                    unit: Unit::SquareMeter,
                    show_on_delivery_note: true,
                    steps: vec![],
                }],
                notes: None,
            }],
            status: OrderStatus::Draft,
            notes: None,
            purchase_order: None,
            quote_id: None,
            quote_number: None,
            completion_reason: None,
            created_at: now,
            completed_at: None,
            updated_at: now,
        };

        (order, products, inventory)
    }

    #[test]
    fn test_sufficient_issue_deducts_stock() {
        let (order, products, inventory) = fixture();
        let now = Utc::now();

        let prep = prepare_issue(&order, &products, &inventory, now);

        assert!(prep.sufficient);
        assert_eq!(prep.updated_inventory[0].quantity, dec("99.5"));
        assert_eq!(prep.new_transactions.len(), 1);

        let tx = &prep.new_transactions[0];
        assert_eq!(tx.kind, TransactionKind::Out);
        assert_eq!(tx.quantity, dec("0.5"));
        assert_eq!(tx.previous_quantity, dec("100"));
        assert_eq!(tx.new_quantity, dec("99.5"));
        assert_eq!(tx.work_order_id, Some(order.id));

        assert_eq!(prep.updated_order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_input_inventory_not_mutated() {
        let (order, products, inventory) = fixture();
        let before = inventory.clone();

        let _ = prepare_issue(&order, &products, &inventory, Utc::now());

        assert_eq!(inventory, before);
    }

    #[test]
    fn test_insufficient_issue_changes_nothing() {
        let (order, products, mut inventory) = fixture();
        inventory[0].quantity = dec("0.3");

        let prep = prepare_issue(&order, &products, &inventory, Utc::now());

        assert!(!prep.sufficient);
        assert_eq!(prep.updated_inventory, inventory);
        assert!(prep.new_transactions.is_empty());
        assert_eq!(prep.updated_order.status, OrderStatus::Draft);
        assert_eq!(prep.requirements.len(), 1);
        assert!(!prep.requirements[0].sufficient);
        assert_eq!(prep.requirements[0].required, dec("0.5"));
        assert_eq!(prep.requirements[0].available, dec("0.3"));
    }

    #[test]
    fn test_issue_is_deterministic() {
        let (order, products, inventory) = fixture();
        let now = Utc::now();

        let first = prepare_issue(&order, &products, &inventory, now);
        let second = prepare_issue(&order, &products, &inventory, now);

        assert_eq!(first.updated_inventory, second.updated_inventory);
        assert_eq!(first.material_summary, second.material_summary);
        // Ledger entries are identical except for their generated ids
        assert_eq!(
            first.new_transactions[0].quantity,
            second.new_transactions[0].quantity
        );
        assert_eq!(
            first.new_transactions[0].notes,
            second.new_transactions[0].notes
        );
        assert_ne!(first.new_transactions[0].id, second.new_transactions[0].id);
    }

    #[test]
    fn test_ledger_note_references_order() {
        let (order, products, inventory) = fixture();
        let prep = prepare_issue(&order, &products, &inventory, Utc::now());

        let notes = prep.new_transactions[0].notes.as_deref().unwrap();
        assert!(notes.contains("WO250307-000001"));
        assert!(notes.contains("Staklo 4mm"));
    }

    #[test]
    fn test_material_summary_lists_movement() {
        let (order, products, inventory) = fixture();
        let prep = prepare_issue(&order, &products, &inventory, Utc::now());

        assert!(prep.material_summary.contains("Float staklo 4mm"));
        assert!(prep.material_summary.contains("100 -> 99.5"));
    }
}
