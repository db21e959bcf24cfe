//! Product and bill-of-material models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Unit;

/// A sellable product assembled from raw materials (e.g. "Tempered glass 8mm")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    /// Base price per m² of finished product
    pub price: Decimal,
    pub materials: Vec<ProductMaterial>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One raw material consumed when producing the product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMaterial {
    pub inventory_item_id: Uuid,
    /// Consumption per m² (or per piece, depending on `unit`) of product
    pub quantity_per_unit: Decimal,
    pub unit: Unit,
    /// Whether this material appears as a line on delivery notes
    pub show_on_delivery_note: bool,
    /// Processes attached to this material when an order line is created
    pub process_steps: Vec<ProcessAttachment>,
}

/// A process attached to a product material. Mandatory attachments are
/// production policy and cannot be removed from an order line; optional
/// attachments are a default the order editor may drop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessAttachment {
    Mandatory { process_id: Uuid },
    Optional { process_id: Uuid },
}

impl ProcessAttachment {
    pub fn process_id(&self) -> Uuid {
        match self {
            ProcessAttachment::Mandatory { process_id } => *process_id,
            ProcessAttachment::Optional { process_id } => *process_id,
        }
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(self, ProcessAttachment::Mandatory { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_accessors() {
        let id = Uuid::new_v4();
        let mandatory = ProcessAttachment::Mandatory { process_id: id };
        let optional = ProcessAttachment::Optional { process_id: id };

        assert_eq!(mandatory.process_id(), id);
        assert_eq!(optional.process_id(), id);
        assert!(mandatory.is_mandatory());
        assert!(!optional.is_mandatory());
    }

    #[test]
    fn test_attachment_serde_tagged() {
        let attachment = ProcessAttachment::Mandatory {
            process_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["kind"], "mandatory");
    }
}
