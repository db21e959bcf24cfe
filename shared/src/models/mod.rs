//! Domain models for the Glass Workshop Management Platform

mod bank_account;
mod client;
mod delivery_note;
mod inventory;
mod process;
mod product;
mod quote;
mod service_item;
mod work_order;

pub use bank_account::*;
pub use client::*;
pub use delivery_note::*;
pub use inventory::*;
pub use process::*;
pub use product::*;
pub use quote::*;
pub use service_item::*;
pub use work_order::*;
