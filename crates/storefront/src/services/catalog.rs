//! Typed catalog reads on top of the Record Store.
//!
//! List reads never fail the page: errors are logged and an empty list (or
//! default store info) is returned. Every toy record decodes; categories
//! that cannot be decoded are skipped with a warning.

use std::sync::Arc;

use toyshop_core::catalog::{Category, Product};
use toyshop_core::store_info::StoreInfo;
use toyshop_core::{Collection, CurrencyCode, RecordId};
use tracing::instrument;

use crate::store::{ListQuery, RecordStore, StoreError};

/// Catalog reads for page handlers.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    currency: CurrencyCode,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, currency: CurrencyCode) -> Self {
        Self { store, currency }
    }

    /// Every toy, in store order. Empty on failure.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Vec<Product> {
        match self.store.get_all(Collection::Toys, &ListQuery::new()).await {
            Ok(page) => page
                .items
                .iter()
                .map(|record| Product::from_record(record, self.currency))
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch toys");
                Vec::new()
            }
        }
    }

    /// Every category, active or not. Empty on failure.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Vec<Category> {
        match self
            .store
            .get_all(Collection::ToyCategories, &ListQuery::new())
            .await
        {
            Ok(page) => page
                .items
                .iter()
                .filter_map(|record| match Category::from_record(record) {
                    Ok(category) => Some(category),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping undecodable category record");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch categories");
                Vec::new()
            }
        }
    }

    /// Store contact details from the first `storeinformation` record.
    /// Defaults on failure or when there is none.
    #[instrument(skip(self))]
    pub async fn store_info(&self) -> StoreInfo {
        match self
            .store
            .get_all(Collection::StoreInformation, &ListQuery::new().limit(1))
            .await
        {
            Ok(page) => page
                .items
                .first()
                .map(StoreInfo::from_record)
                .unwrap_or_default(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch store information");
                StoreInfo::default()
            }
        }
    }

    /// One toy by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let record = self
            .store
            .get_by_id(Collection::Toys, &RecordId::new(id))
            .await?;

        Ok(record.map(|record| Product::from_record(&record, self.currency)))
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }
}
