//! Infrastructure layer: document store adapters, entity operations and config.

pub mod config;
pub mod model;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use model::{BlogModel, ModelError};
pub use store::{DocumentStore, InMemoryDocumentStore, MongoDocumentStore, StoreError};
