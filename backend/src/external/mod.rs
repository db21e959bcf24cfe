//! External service integrations

pub mod documents;

pub use documents::DocumentRenderClient;
