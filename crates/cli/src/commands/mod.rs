//! CLI subcommands.
//!
//! # Environment Variables
//!
//! - `RECORD_STORE_URL` - Record store base URL, or `memory:`
//! - `RECORD_STORE_API_KEY` - Bearer token for the HTTP store
//! - `RECORD_STORE_SEED` - Seed file for the in-memory store
//! - `PAYMENT_CURRENCY` - Currency for printed prices (default INR)

pub mod products;
pub mod variants;

use std::sync::Arc;

use thiserror::Error;
use toyshop_storefront::config::{ConfigError, RecordStoreConfig};
use toyshop_storefront::store::{self, RecordStore, StoreError};

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("refusing to run without --yes: every run creates new variant records")]
    ConfirmationRequired,

    #[error("{failed} of {expected} variants could not be created")]
    IncompleteBatch { failed: usize, expected: usize },

    #[error("unsupported currency '{0}'")]
    Currency(String),
}

/// Connect to the record store named by the environment.
fn connect() -> Result<Arc<dyn RecordStore>, CommandError> {
    let config = RecordStoreConfig::from_env()?;
    tracing::info!(store = ?config, "Connecting to record store");
    Ok(store::connect(&config)?)
}
