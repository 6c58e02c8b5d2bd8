//! In-memory ledger of checkout attempts.
//!
//! Attempts live in a `moka` cache and expire an hour after they were
//! started. Each entry sits behind its own mutex so that two completions of
//! the same attempt are serialized and only the first one wins.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use thiserror::Error;
use toyshop_core::payment::{CheckoutAttempt, CheckoutError, PaymentOutcome};
use uuid::Uuid;

use crate::error::AppError;

/// How long an attempt can be completed after it was started.
pub const ATTEMPT_TTL: Duration = Duration::from_secs(60 * 60);

const LEDGER_CAPACITY: u64 = 10_000;

/// Errors from [`CheckoutLedger::complete`].
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("checkout attempt {0} not found or expired")]
    NotFound(Uuid),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Checkout(e) => Self::Checkout(e),
        }
    }
}

/// Pending and finished checkout attempts, keyed by attempt id.
#[derive(Clone)]
pub struct CheckoutLedger {
    attempts: Cache<Uuid, Arc<Mutex<CheckoutAttempt>>>,
}

impl Default for CheckoutLedger {
    fn default() -> Self {
        Self::new(ATTEMPT_TTL)
    }
}

impl CheckoutLedger {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            attempts: Cache::builder()
                .max_capacity(LEDGER_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Store a freshly started attempt.
    pub async fn insert(&self, attempt: CheckoutAttempt) {
        self.attempts
            .insert(attempt.id, Arc::new(Mutex::new(attempt)))
            .await;
    }

    /// Snapshot of an attempt.
    pub async fn get(&self, id: Uuid) -> Option<CheckoutAttempt> {
        let entry = self.attempts.get(&id).await?;
        let attempt = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Some(attempt.clone())
    }

    /// Apply a provider outcome to an attempt and return the updated attempt.
    ///
    /// `key_secret` verifies signed successes; see [`CheckoutAttempt::complete`].
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] for unknown or expired ids, otherwise the
    /// [`CheckoutError`] from [`CheckoutAttempt::complete`].
    pub async fn complete(
        &self,
        id: Uuid,
        outcome: PaymentOutcome,
        key_secret: Option<&str>,
    ) -> Result<CheckoutAttempt, LedgerError> {
        let entry = self.attempts.get(&id).await.ok_or(LedgerError::NotFound(id))?;
        let mut attempt = entry.lock().unwrap_or_else(PoisonError::into_inner);
        attempt.complete(outcome, key_secret, Utc::now())?;
        Ok(attempt.clone())
    }
}
