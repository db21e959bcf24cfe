//! Work order models
//!
//! A work order is a production job for one client. Its line items carry a
//! per-line snapshot of the product's materials and attached processes,
//! taken when the product was selected, so later product edits never change
//! jobs already on the shop floor.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{InventoryItem, ProductMaterial};
use crate::types::{Dimensions, Unit};

/// Work order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Archived,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(OrderStatus::Draft),
            "pending" => Some(OrderStatus::Pending),
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "archived" => Some(OrderStatus::Archived),
            _ => None,
        }
    }

    /// Normal-flow transitions are one-directional; archiving is reachable
    /// from every state except archived itself.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Draft, Pending) | (Draft, Cancelled) | (Draft, Archived) => true,
            (Pending, InProgress) | (Pending, Completed) => true,
            (Pending, Cancelled) | (Pending, Archived) => true,
            (InProgress, Completed) | (InProgress, Cancelled) | (InProgress, Archived) => true,
            (Completed, Archived) => true,
            (Cancelled, Archived) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Completion status of one process step on an order line material
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
}

/// A process step attached to a material on an order line, tracked through
/// production
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemProcessStep {
    pub process_id: Uuid,
    /// Mandatory steps come from the product definition and cannot be
    /// removed by the order editor.
    pub mandatory: bool,
    pub status: StepStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ItemProcessStep {
    pub fn new(process_id: Uuid, mandatory: bool) -> Self {
        Self {
            process_id,
            mandatory,
            status: StepStatus::Pending,
            completed_at: None,
        }
    }
}

/// Per-line instantiation of a product material, copied from the product
/// definition at the time the product was selected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemMaterial {
    pub inventory_item_id: Uuid,
    /// Display-name snapshot of the inventory item
    pub name: String,
    /// Consumption per m² (or per piece) of product
    pub quantity_per_unit: Decimal,
    pub unit: Unit,
    pub show_on_delivery_note: bool,
    pub steps: Vec<ItemProcessStep>,
}

impl ItemMaterial {
    /// Instantiate a line material from the product definition, snapshotting
    /// the current inventory item name.
    pub fn from_product_material(
        material: &ProductMaterial,
        inventory: &[InventoryItem],
    ) -> Self {
        let name = inventory
            .iter()
            .find(|i| i.id == material.inventory_item_id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "Unknown material".to_string());

        Self {
            inventory_item_id: material.inventory_item_id,
            name,
            quantity_per_unit: material.quantity_per_unit,
            unit: material.unit,
            show_on_delivery_note: material.show_on_delivery_note,
            steps: material
                .process_steps
                .iter()
                .map(|a| ItemProcessStep::new(a.process_id(), a.is_mandatory()))
                .collect(),
        }
    }
}

/// What an order line refers to: a fabricated product or a billed service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineRef {
    Product { product_id: Uuid, name: String },
    Service { service_id: Option<Uuid>, name: String },
}

impl LineRef {
    pub fn name(&self) -> &str {
        match self {
            LineRef::Product { name, .. } => name,
            LineRef::Service { name, .. } => name,
        }
    }

    pub fn product_id(&self) -> Option<Uuid> {
        match self {
            LineRef::Product { product_id, .. } => Some(*product_id),
            LineRef::Service { .. } => None,
        }
    }
}

/// One line of a work order or quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkOrderItem {
    pub reference: LineRef,
    /// Piece count
    pub quantity: i32,
    pub dimensions: Dimensions,
    /// Price per piece, captured when the line was created
    pub unit_price: Decimal,
    pub materials: Vec<ItemMaterial>,
    pub notes: Option<String>,
}

impl WorkOrderItem {
    pub fn is_service(&self) -> bool {
        matches!(self.reference, LineRef::Service { .. })
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A production job for one client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkOrder {
    pub id: Uuid,
    /// Human-facing number, format WOyymmdd-NNNNNN
    pub order_number: String,
    pub client_id: Uuid,
    pub items: Vec<WorkOrderItem>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// Client's purchase-order reference
    pub purchase_order: Option<String>,
    /// Provenance link when the order was converted from a quote
    pub quote_id: Option<Uuid>,
    pub quote_number: Option<String>,
    pub completion_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl WorkOrder {
    /// Iterate every process step across all items and materials, with the
    /// item index and material name for display.
    pub fn all_steps(&self) -> impl Iterator<Item = (usize, &ItemMaterial, &ItemProcessStep)> {
        self.items.iter().enumerate().flat_map(|(idx, item)| {
            item.materials
                .iter()
                .flat_map(move |m| m.steps.iter().map(move |s| (idx, m, s)))
        })
    }
}

/// Format a work order number: WOyymmdd-NNNNNN
pub fn format_order_number(date: NaiveDate, suffix: u32) -> String {
    format!(
        "WO{:02}{:02}{:02}-{:06}",
        date.year() % 100,
        date.month(),
        date.day(),
        suffix % 1_000_000
    )
}
