//! HTTP handlers for the Glass Workshop Management Platform

mod bank_accounts;
mod clients;
mod delivery_notes;
mod documents;
mod health;
mod inventory;
mod processes;
mod products;
mod quotes;
mod service_items;
mod work_orders;

pub use bank_accounts::*;
pub use clients::*;
pub use delivery_notes::*;
pub use documents::*;
pub use health::*;
pub use inventory::*;
pub use processes::*;
pub use products::*;
pub use quotes::*;
pub use service_items::*;
pub use work_orders::*;
