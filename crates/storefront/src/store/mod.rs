//! Record Store access.
//!
//! # Architecture
//!
//! - [`RecordStore`] is the only way the storefront reads or writes data
//! - [`HttpRecordStore`] talks to the remote REST backend and caches reads
//!   with `moka` (TTL from config, invalidated on writes)
//! - [`MemoryRecordStore`] keeps collections in process; used for local
//!   development (seed file) and tests
//!
//! # Example
//!
//! ```rust,ignore
//! use toyshop_core::Collection;
//! use toyshop_storefront::store::{ListQuery, RecordStore};
//!
//! let page = store
//!     .get_all(Collection::ToyCategories, &ListQuery::new().sort("display_order"))
//!     .await?;
//! ```

mod cache;
pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use toyshop_core::{Collection, Fields, Record, RecordId};

pub use http::HttpRecordStore;
pub use memory::MemoryRecordStore;

use crate::config::RecordStoreConfig;

/// Errors that can occur when talking to the Record Store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("record store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Record does not exist.
    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: RecordId },

    /// Store is temporarily unavailable.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// Seed data could not be loaded.
    #[error("seed error: {0}")]
    Seed(String),

    /// Store URL could not be built.
    #[error("invalid record store URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Options for [`RecordStore::get_all`].
///
/// Filters are exact field equality; `sort` names a field, with a leading
/// `-` for descending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Fields,
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.insert(field.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, field: &str) -> Self {
        self.sort = Some(field.to_string());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Stable string form, used as part of cache keys.
    fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            Value::Object(self.filters.clone()),
            self.sort.as_deref().unwrap_or(""),
            self.limit.map(|l| l.to_string()).unwrap_or_default()
        )
    }
}

/// One page of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub items: Vec<Record>,
}

/// Generic create/read/list/update access to named collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List records in `collection` matching `query`.
    async fn get_all(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<RecordPage, StoreError>;

    /// Fetch one record; `Ok(None)` when it does not exist.
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &RecordId,
    ) -> Result<Option<Record>, StoreError>;

    /// Create a record. The store assigns the id.
    async fn create(&self, collection: Collection, fields: Fields) -> Result<Record, StoreError>;

    /// Merge `fields` into an existing record.
    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: Fields,
    ) -> Result<Record, StoreError>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError> {
        self.get_all(Collection::StoreInformation, &ListQuery::new().limit(1))
            .await
            .map(|_| ())
    }
}

/// Build the store selected by configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the seed file
/// cannot be read.
pub fn connect(config: &RecordStoreConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    match config {
        RecordStoreConfig::Http(http) => Ok(Arc::new(HttpRecordStore::new(http)?)),
        RecordStoreConfig::Memory { seed: Some(path) } => {
            Ok(Arc::new(MemoryRecordStore::from_seed_file(path)?))
        }
        RecordStoreConfig::Memory { seed: None } => Ok(Arc::new(MemoryRecordStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_builder() {
        let query = ListQuery::new()
            .filter("is_featured", true)
            .sort("-display_order")
            .limit(8);
        assert_eq!(query.filters["is_featured"], Value::Bool(true));
        assert_eq!(query.sort.as_deref(), Some("-display_order"));
        assert_eq!(query.limit, Some(8));
        assert_eq!(query.cache_key(), r#"{"is_featured":true}|-display_order|8"#);
    }

    #[test]
    fn test_default_query_cache_key() {
        assert_eq!(ListQuery::new().cache_key(), "{}||");
    }
}
