//! Quote models
//!
//! Quote line items share the work-order line shape; only the header
//! semantics differ (validity, VAT totals, payment details).

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::WorkOrderItem;

/// Croatian standard VAT rate, percent
pub const DEFAULT_VAT_RATE: u32 = 25;

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Converted,
    Archived,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Converted => "converted",
            QuoteStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(QuoteStatus::Draft),
            "sent" => Some(QuoteStatus::Sent),
            "accepted" => Some(QuoteStatus::Accepted),
            "rejected" => Some(QuoteStatus::Rejected),
            "converted" => Some(QuoteStatus::Converted),
            "archived" => Some(QuoteStatus::Archived),
            _ => None,
        }
    }

    /// Only accepted quotes become work orders; archiving is reachable from
    /// every state except archived itself.
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        match (self, next) {
            (Draft, Sent) | (Draft, Archived) => true,
            (Sent, Accepted) | (Sent, Rejected) | (Sent, Archived) => true,
            (Accepted, Converted) | (Accepted, Rejected) | (Accepted, Archived) => true,
            (Rejected, Archived) => true,
            (Converted, Archived) => true,
            _ => false,
        }
    }
}

/// An offer to a client, convertible into a work order once accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    /// Human-facing number, format QT-yymmdd-NNNN
    pub quote_number: String,
    pub client_id: Uuid,
    pub items: Vec<WorkOrderItem>,
    pub status: QuoteStatus,
    /// VAT percentage applied to the subtotal
    pub vat_rate: Decimal,
    pub valid_until: Option<NaiveDate>,
    /// Bank account printed in the payment section
    pub payment_bank_account_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Computed money totals for a quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
}

/// Compute subtotal, VAT and total over a set of line items
pub fn compute_totals(items: &[WorkOrderItem], vat_rate: Decimal) -> QuoteTotals {
    let subtotal: Decimal = items.iter().map(|i| i.line_total()).sum();
    let vat_amount = subtotal * vat_rate / Decimal::from(100);
    QuoteTotals {
        subtotal,
        vat_amount,
        total: subtotal + vat_amount,
    }
}

/// Format a quote number: QT-yymmdd-NNNN
pub fn format_quote_number(date: NaiveDate, suffix: u32) -> String {
    format!(
        "QT-{:02}{:02}{:02}-{:04}",
        date.year() % 100,
        date.month(),
        date.day(),
        suffix % 10_000
    )
}
