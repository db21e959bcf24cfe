//! Inventory and stock ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Unit;

/// A raw material held on stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub unit: Unit,
    /// Current on-hand quantity. Changed only together with a recorded
    /// stock transaction.
    pub quantity: Decimal,
    pub kind: Option<InventoryKind>,
    pub glass_thickness_mm: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category of an inventory item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InventoryKind {
    Glass,
    Hardware,
    Consumable,
}

/// Stock transaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Consumption on work-order issuance
    Out,
    /// Credit from archiving an issued work order
    Return,
    /// Goods received from a supplier
    Receipt,
    /// Manual correction (stocktake, breakage)
    Adjustment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Out => "out",
            TransactionKind::Return => "return",
            TransactionKind::Receipt => "receipt",
            TransactionKind::Adjustment => "adjustment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "out" => Some(TransactionKind::Out),
            "return" => Some(TransactionKind::Return),
            "receipt" => Some(TransactionKind::Receipt),
            "adjustment" => Some(TransactionKind::Adjustment),
            _ => None,
        }
    }

    /// Sign of the inventory change this kind records
    pub fn signum(&self) -> i32 {
        match self {
            TransactionKind::Out => -1,
            TransactionKind::Return | TransactionKind::Receipt => 1,
            // Adjustments carry their direction in the quantity delta itself
            TransactionKind::Adjustment => 1,
        }
    }
}

/// Append-only stock ledger entry. Never mutated, only ever added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockTransaction {
    pub id: Uuid,
    pub inventory_item_id: Uuid,
    /// Set when the movement was caused by a work order
    pub work_order_id: Option<Uuid>,
    pub kind: TransactionKind,
    /// Absolute magnitude moved
    pub quantity: Decimal,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
    /// Human-readable breakdown per product/material; display only
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_round_trip() {
        for kind in [
            TransactionKind::Out,
            TransactionKind::Return,
            TransactionKind::Receipt,
            TransactionKind::Adjustment,
        ] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::parse("transfer"), None);
    }

    #[test]
    fn test_out_is_negative_movement() {
        assert_eq!(TransactionKind::Out.signum(), -1);
        assert_eq!(TransactionKind::Return.signum(), 1);
        assert_eq!(TransactionKind::Receipt.signum(), 1);
    }
}
