//! Document store boundary.
//!
//! Two collections (`authors`, `posts`) behind one async trait, with an
//! in-memory backend for tests/dev and a MongoDB backend for production.

pub mod in_memory;
pub mod mongo;
pub mod r#trait;

use std::sync::Arc;

pub use in_memory::InMemoryDocumentStore;
pub use mongo::MongoDocumentStore;
pub use r#trait::{DocumentStore, StoreError};

/// URL scheme selecting the in-memory backend.
pub const MEMORY_SCHEME: &str = "memory://";

/// Connect the backend named by `database_url`.
///
/// `mongodb://` and `mongodb+srv://` select MongoDB; `memory://` selects a fresh
/// in-memory store. Anything else is rejected.
pub async fn connect(database_url: &str) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if database_url.starts_with(MEMORY_SCHEME) {
        tracing::info!("using in-memory document store");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    }

    if database_url.starts_with("mongodb://") || database_url.starts_with("mongodb+srv://") {
        let store = MongoDocumentStore::connect(database_url).await?;
        return Ok(Arc::new(store));
    }

    Err(StoreError::Connect(format!(
        "unsupported database url scheme: {}",
        database_url.split("://").next().unwrap_or(database_url)
    )))
}
