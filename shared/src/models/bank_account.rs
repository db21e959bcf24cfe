//! Bank account models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workshop bank account, printed in the payment section of quotes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: Uuid,
    pub bank_name: String,
    pub iban: String,
    pub swift: Option<String>,
    /// The primary account is preselected on new quotes
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
