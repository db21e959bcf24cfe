//! Delivery-note generation and order auto-completion
//!
//! Generating a delivery note always finalizes the order: every process
//! step is forced to completed and the order itself moves to completed,
//! regardless of actual production progress. That is a business rule of the
//! workshop, not a technical necessity. The analysis step exists so the
//! caller can ask for confirmation first when steps are still open.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    DeliveryNote, DeliveryNoteItem, DeliveryNoteStatus, OrderStatus, StepStatus, WorkOrder,
};
use crate::stockflow::StockflowError;
use crate::types::Unit;

/// A process step not yet completed, with display context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncompleteStep {
    pub item_index: usize,
    pub item_name: String,
    pub material_name: String,
    pub process_id: Uuid,
    pub status: StepStatus,
}

/// Pre-dispatch analysis of process completion. Pure, no writes; feeds the
/// confirmation dialog shown before generating a delivery note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCompletionReport {
    pub incomplete: Vec<IncompleteStep>,
    pub total_incomplete: usize,
    pub all_processes: usize,
}

/// Classify every process step across every item and material of the order.
pub fn analyze_process_completion(order: &WorkOrder) -> ProcessCompletionReport {
    let mut incomplete = Vec::new();
    let mut all_processes = 0;

    for (item_index, item) in order.items.iter().enumerate() {
        for material in &item.materials {
            for step in &material.steps {
                all_processes += 1;
                if step.status != StepStatus::Completed {
                    incomplete.push(IncompleteStep {
                        item_index,
                        item_name: item.reference.name().to_string(),
                        material_name: material.name.clone(),
                        process_id: step.process_id,
                        status: step.status,
                    });
                }
            }
        }
    }

    ProcessCompletionReport {
        total_incomplete: incomplete.len(),
        incomplete,
        all_processes,
    }
}

/// Result of preparing a dispatch: the delivery-note snapshot and the
/// finalized order. Persisted together by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPreparation {
    pub delivery_note: DeliveryNote,
    pub updated_order: WorkOrder,
}

/// Prepare a delivery note for an issued work order.
///
/// The note snapshots the order's lines (plus materials flagged for the
/// delivery note); the order is finalized: all steps completed, status
/// completed, completion reason naming the delivery number.
pub fn prepare_dispatch(
    order: &WorkOrder,
    delivery_number: &str,
    now: DateTime<Utc>,
) -> Result<DispatchPreparation, StockflowError> {
    if !matches!(order.status, OrderStatus::Pending | OrderStatus::InProgress) {
        return Err(StockflowError::NotDispatchable {
            order_number: order.order_number.clone(),
            status: order.status,
        });
    }

    let mut items = Vec::new();
    for item in &order.items {
        items.push(DeliveryNoteItem {
            description: item.reference.name().to_string(),
            quantity: Decimal::from(item.quantity),
            unit: Unit::Piece,
            dimensions: if item.is_service() {
                None
            } else {
                Some(item.dimensions)
            },
        });

        let area = item.dimensions.area_m2();
        for material in &item.materials {
            if !material.show_on_delivery_note {
                continue;
            }
            items.push(DeliveryNoteItem {
                description: material.name.clone(),
                quantity: material.quantity_per_unit * Decimal::from(item.quantity) * area,
                unit: material.unit,
                dimensions: None,
            });
        }
    }

    let delivery_note = DeliveryNote {
        id: Uuid::new_v4(),
        delivery_number: delivery_number.to_string(),
        work_order_id: order.id,
        client_id: order.client_id,
        items,
        status: DeliveryNoteStatus::Generated,
        notes: None,
        created_at: now,
    };

    let mut updated_order = order.clone();
    for item in &mut updated_order.items {
        for material in &mut item.materials {
            for step in &mut material.steps {
                if step.status != StepStatus::Completed {
                    step.status = StepStatus::Completed;
                    step.completed_at = Some(now);
                }
            }
        }
    }
    updated_order.status = OrderStatus::Completed;
    updated_order.completed_at = Some(now);
    updated_order.completion_reason =
        Some(format!("Izdana otpremnica {}", delivery_number));
    updated_order.updated_at = now;

    Ok(DispatchPreparation {
        delivery_note,
        updated_order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemMaterial, ItemProcessStep, LineRef, WorkOrderItem};
    use crate::types::Dimensions;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn step(status: StepStatus) -> ItemProcessStep {
        ItemProcessStep {
            process_id: Uuid::new_v4(),
            mandatory: false,
            status,
            completed_at: if status == StepStatus::Completed {
                Some(Utc::now())
            } else {
                None
            },
        }
    }

    fn order_with_steps(statuses: &[&[StepStatus]]) -> WorkOrder {
        let now = Utc::now();
        let items = statuses
            .iter()
            .map(|material_steps| WorkOrderItem {
                reference: LineRef::Product {
                    product_id: Uuid::new_v4(),
                    name: "Staklo 4mm".to_string(),
                },
                quantity: 2,
                dimensions: Dimensions::new(dec("1000"), dec("500")),
                unit_price: dec("10"),
                materials: vec![ItemMaterial {
                    inventory_item_id: Uuid::new_v4(),
                    name: "Float staklo 4mm".to_string(),
                    quantity_per_unit: dec("1"),
                    unit: Unit::SquareMeter,
                    show_on_delivery_note: true,
                    steps: material_steps.iter().map(|s| step(*s)).collect(),
                }],
                notes: None,
            })
            .collect();

        WorkOrder {
            id: Uuid::new_v4(),
            order_number: "WO250307-000001".to_string(),
            client_id: Uuid::new_v4(),
            items,
            status: OrderStatus::Pending,
            notes: None,
            purchase_order: None,
            quote_id: None,
            quote_number: None,
            completion_reason: None,
            created_at: now,
            completed_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn test_analysis_counts_incomplete_steps() {
        // 5 steps total, 3 not yet completed
        let order = order_with_steps(&[
            &[
                StepStatus::Completed,
                StepStatus::Pending,
                StepStatus::InProgress,
            ],
            &[StepStatus::Completed, StepStatus::Pending],
        ]);

        let report = analyze_process_completion(&order);

        assert_eq!(report.all_processes, 5);
        assert_eq!(report.total_incomplete, 3);
        assert_eq!(report.incomplete.len(), 3);
    }

    #[test]
    fn test_analysis_is_read_only() {
        let order = order_with_steps(&[&[StepStatus::Pending]]);
        let before = order.clone();

        let _ = analyze_process_completion(&order);

        assert_eq!(order, before);
    }

    #[test]
    fn test_dispatch_completes_everything() {
        let order = order_with_steps(&[
            &[StepStatus::Pending, StepStatus::InProgress],
            &[StepStatus::Completed],
        ]);
        let now = Utc::now();

        let prep = prepare_dispatch(&order, "DN250307-000042", now).unwrap();

        assert_eq!(prep.updated_order.status, OrderStatus::Completed);
        assert_eq!(prep.updated_order.completed_at, Some(now));
        for (_, _, step) in prep.updated_order.all_steps() {
            assert_eq!(step.status, StepStatus::Completed);
        }
        assert!(prep
            .updated_order
            .completion_reason
            .as_deref()
            .unwrap()
            .contains("DN250307-000042"));
    }

    #[test]
    fn test_dispatch_keeps_existing_completion_timestamps() {
        let earlier = Utc::now();
        let mut order = order_with_steps(&[&[StepStatus::Completed, StepStatus::Pending]]);
        order.items[0].materials[0].steps[0].completed_at = Some(earlier);

        let later = Utc::now();
        let prep = prepare_dispatch(&order, "DN250307-000042", later).unwrap();

        let steps = &prep.updated_order.items[0].materials[0].steps;
        assert_eq!(steps[0].completed_at, Some(earlier));
        assert_eq!(steps[1].completed_at, Some(later));
    }

    #[test]
    fn test_dispatch_snapshots_items() {
        let order = order_with_steps(&[&[StepStatus::Completed]]);

        let prep = prepare_dispatch(&order, "DN250307-000042", Utc::now()).unwrap();

        // One product line plus one visible material line
        assert_eq!(prep.delivery_note.items.len(), 2);
        assert_eq!(prep.delivery_note.items[0].description, "Staklo 4mm");
        assert_eq!(prep.delivery_note.items[0].quantity, dec("2"));
        assert_eq!(
            prep.delivery_note.items[1].description,
            "Float staklo 4mm"
        );
        // 1 per m² × 2 kom × 0.5 m²
        assert_eq!(prep.delivery_note.items[1].quantity, dec("1.0"));
        assert_eq!(prep.delivery_note.work_order_id, order.id);
        assert_eq!(prep.delivery_note.status, DeliveryNoteStatus::Generated);
    }

    #[test]
    fn test_dispatch_requires_issued_order() {
        for status in [
            OrderStatus::Draft,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Archived,
        ] {
            let mut order = order_with_steps(&[&[StepStatus::Completed]]);
            order.status = status;

            let result = prepare_dispatch(&order, "DN250307-000042", Utc::now());
            assert!(result.is_err(), "status {:?} must not dispatch", status);
        }
    }

    #[test]
    fn test_hidden_materials_stay_off_note() {
        let mut order = order_with_steps(&[&[StepStatus::Completed]]);
        order.items[0].materials[0].show_on_delivery_note = false;

        let prep = prepare_dispatch(&order, "DN250307-000042", Utc::now()).unwrap();

        assert_eq!(prep.delivery_note.items.len(), 1);
    }
}
