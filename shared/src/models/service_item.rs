//! Service catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Unit;

/// A billable service without material consumption (delivery, installation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub unit: Unit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
