pub mod memory;

use crate::{filter::Filter, serde_document::Fields};
use async_trait::async_trait;

pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone, Debug, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

/// The primitives a document store has to provide.
///
/// Every method is a single request against the store. Implementations own
/// their session; `Database` only holds them behind an `Arc`.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Creates the document or replaces all of its fields.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), BackendError>;

    /// Returns `None` when the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Fields>, BackendError>;

    /// Returns the documents of a collection ordered by id, narrowed by `filter`.
    async fn list(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, BackendError>;
}
