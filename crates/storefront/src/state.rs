//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};
use crate::services::{CatalogService, CheckoutLedger, GatewayError, PaymentGateway};
use crate::store::RecordStore;

/// Errors building [`AppState`].
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to load content: {0}")]
    Content(#[from] ContentError),
    #[error("Failed to build payment client: {0}")]
    Payment(#[from] GatewayError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the record store, loaded content and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn RecordStore>,
    catalog: CatalogService,
    content: ContentStore,
    checkout: CheckoutLedger,
    payments: Option<PaymentGateway>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Markdown pages are loaded from `config.content_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content directory cannot be read or the
    /// payment client cannot be built.
    pub fn new(config: StorefrontConfig, store: Arc<dyn RecordStore>) -> Result<Self, StateError> {
        let content = ContentStore::load(&config.content_dir)?;
        let catalog = CatalogService::new(store.clone(), config.currency);
        let payments = match &config.payment {
            Some(payment) => PaymentGateway::from_config(payment)?,
            None => None,
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
                content,
                checkout: CheckoutLedger::default(),
                payments,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Raw record store, for writes and health checks.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutLedger {
        &self.inner.checkout
    }

    /// Provider orders client; `None` when outcomes are client-reported.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentGateway> {
        self.inner.payments.as_ref()
    }
}
