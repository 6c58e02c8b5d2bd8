//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Typed reads of toys, categories and store info, degrading
//!   to empty/default values when the Record Store fails
//! - `checkout` - In-memory ledger of checkout attempts
//! - `payments` - Provider orders API, used when a key secret is configured
//! - `variants` - Color variant batch job

pub mod catalog;
pub mod checkout;
pub mod payments;
pub mod variants;

pub use catalog::CatalogService;
pub use checkout::{CheckoutLedger, LedgerError};
pub use payments::{GatewayError, PaymentGateway};
pub use variants::generate_color_variants;
