//! Business logic services for the Glass Workshop Management Platform

pub mod bank_accounts;
pub mod clients;
pub mod delivery_notes;
pub mod documents;
pub mod inventory;
pub mod processes;
pub mod products;
pub mod quotes;
pub mod service_items;
pub mod work_orders;

pub use bank_accounts::BankAccountService;
pub use clients::ClientService;
pub use delivery_notes::DeliveryNoteService;
pub use documents::DocumentService;
pub use inventory::InventoryService;
pub use processes::ProcessService;
pub use products::ProductService;
pub use quotes::QuoteService;
pub use service_items::ServiceItemService;
pub use work_orders::WorkOrderService;

/// Whether a database error is a unique-constraint violation, used by the
/// document-number generators to retry on a number collision.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// Attempts made to generate a colliding document number before giving up
pub(crate) const NUMBER_RETRIES: u32 = 5;

/// Parse a status column value that the schema constrains to known values.
/// A mismatch means corrupted data, not caller error.
pub(crate) fn parse_status<T>(
    parsed: Option<T>,
    column: &str,
    value: &str,
) -> Result<T, crate::error::AppError> {
    parsed.ok_or_else(|| {
        crate::error::AppError::Internal(format!("unknown {} value: {}", column, value))
    })
}
