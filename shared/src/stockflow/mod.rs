//! Pure material-flow engines
//!
//! Everything in this module is side-effect free: the functions take the
//! current state of an order and the stock, and return the prepared next
//! state (new inventory snapshot, ledger entries, updated documents). The
//! backend applies a preparation in a single database transaction; these
//! functions never persist anything themselves.

mod archival;
mod dispatch;
mod issuance;
mod requirements;

pub use archival::*;
pub use dispatch::*;
pub use issuance::*;
pub use requirements::*;

use thiserror::Error;

use crate::models::OrderStatus;

/// Errors from material-flow preparation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockflowError {
    #[error("work order {order_number} is already archived")]
    AlreadyArchived { order_number: String },

    #[error("work order {order_number} is {status}, a delivery note needs an issued order")]
    NotDispatchable {
        order_number: String,
        status: OrderStatus,
    },
}
