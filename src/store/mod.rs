//! Document store backends
//!
//! The service talks to its collection through [`DocumentStore`]. Two backends
//! ship with the crate:
//!
//! - [`RedisStore`] keeps every document as a JSON object inside one Redis hash.
//!   This is the production backend.
//! - [`MemoryStore`] keeps documents in process. Handy for development and tests,
//!   data is gone when the process exits.
//!
//! Both report a missing document as `None`/`false` and reserve `Err` for
//! real failures.

pub mod document;
pub mod memory;
pub mod redis;

pub use self::redis::RedisStore;
pub use document::{Document, DocumentId, FieldValue, Fields, Filter};
pub use memory::MemoryStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Document>>;

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// First document matching the filter
    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>>;

    /// Store a new document and return its generated id
    async fn insert_one(&self, fields: Fields) -> Result<DocumentId>;

    /// Replace all fields of a document. `false` when no document has that id.
    async fn replace_by_id(&self, id: &DocumentId, fields: Fields) -> Result<bool>;

    /// `false` when no document has that id
    async fn delete_by_id(&self, id: &DocumentId) -> Result<bool>;

    fn backend_name(&self) -> &'static str;
}

/// Build the configured backend. Redis connections are checked with a PING.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => {
            log::warn!("Using in-memory document store, data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let store = RedisStore::from_url(
                &config.url,
                &config.prefix,
                config.pool_size,
                Duration::from_millis(config.command_timeout_ms),
            )
            .await?;
            log::info!("Connected to Redis document store at {}", config.url);
            Ok(Arc::new(store))
        }
    }
}
