//! Shared types and domain logic for the Glass Workshop Management Platform
//!
//! This crate contains types shared between the backend, frontend (via WASM),
//! and other components of the system, plus the pure material-flow engines
//! (requirement calculation, issuance, archival, dispatch).

pub mod models;
pub mod stockflow;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
