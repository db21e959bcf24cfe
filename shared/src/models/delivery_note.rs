//! Delivery note models

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Dimensions, Unit};

/// Delivery note status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryNoteStatus {
    Generated,
    Archived,
}

impl DeliveryNoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryNoteStatus::Generated => "generated",
            DeliveryNoteStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "generated" => Some(DeliveryNoteStatus::Generated),
            "archived" => Some(DeliveryNoteStatus::Archived),
            _ => None,
        }
    }
}

/// One printed line of a delivery note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryNoteItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub dimensions: Option<Dimensions>,
}

/// Shipping document derived from a work order's items. The items are a
/// snapshot, not a live link back to the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryNote {
    pub id: Uuid,
    /// Human-facing number, format DNyymmdd-NNNNNN
    pub delivery_number: String,
    pub work_order_id: Uuid,
    pub client_id: Uuid,
    pub items: Vec<DeliveryNoteItem>,
    pub status: DeliveryNoteStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Format a delivery note number: DNyymmdd-NNNNNN
pub fn format_delivery_number(date: NaiveDate, suffix: u32) -> String {
    format!(
        "DN{:02}{:02}{:02}-{:06}",
        date.year() % 100,
        date.month(),
        date.day(),
        suffix % 1_000_000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_number_format() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(format_delivery_number(date, 987654), "DN250601-987654");
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(
            DeliveryNoteStatus::parse("generated"),
            Some(DeliveryNoteStatus::Generated)
        );
        assert_eq!(
            DeliveryNoteStatus::parse("archived"),
            Some(DeliveryNoteStatus::Archived)
        );
        assert_eq!(DeliveryNoteStatus::parse("draft"), None);
    }
}
