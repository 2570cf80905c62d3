pub mod configuration;
pub mod constant;
pub mod error;
pub mod order;
pub mod route;

/// A record stored as one document, addressed by its `_id`.
pub trait Document {
    fn document_id(&self) -> &str;
}
