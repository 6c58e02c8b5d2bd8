//! Toyshop Core - domain types and catalog logic.
//!
//! Shared by the `storefront` server and the `cli` tools.
//!
//! # Architecture
//!
//! No I/O lives here: no HTTP clients, no record store access. Everything is
//! a pure function of its inputs, so the catalog rules can be tested and
//! reused anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, emails
//! - [`record`] - loosely-typed backend records and collection names
//! - [`catalog`] - products, categories, filtering and variant resolution
//! - [`messaging`] - WhatsApp deep links
//! - [`store_info`] - store contact details
//! - [`seo`] - page metadata
//! - [`inquiry`] - contact form validation
//! - [`payment`] - checkout requests and attempt lifecycle
//! - [`variants`] - color variant batch rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod inquiry;
pub mod messaging;
pub mod payment;
pub mod record;
pub mod seo;
pub mod store_info;
pub mod types;
pub mod variants;

pub use record::{Collection, Fields, Record, RecordError};
pub use types::*;
