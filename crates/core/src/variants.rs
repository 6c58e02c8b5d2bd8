//! Color variant generation: the pure half of the batch job.
//!
//! Each source toy gets one copy per palette color. The I/O loop lives with
//! the record store; this module decides what each copy contains and how the
//! run is reported.

use serde::Serialize;
use serde_json::Value;

use crate::record::{Fields, Record};

/// Colors every toy is duplicated into.
pub const COLOR_PALETTE: [&str; 4] = ["Blue", "Black", "Red", "Yellow"];

/// Fields for the `color` copy of `source`.
///
/// Everything is copied except store-managed keys (the store assigns a new
/// id and timestamps). Only `color` is overwritten; a `colors` list is kept
/// as entered.
#[must_use]
pub fn variant_fields(source: &Record, color: &str) -> Fields {
    let mut fields = source.copyable_fields();
    fields.insert("color".into(), Value::String(color.to_string()));
    fields
}

/// Summary of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariantReport {
    pub source_products: usize,
    pub variants_created: usize,
    pub expected_variants: usize,
    pub errors: Vec<String>,
}

impl VariantReport {
    /// Empty report for `source_products` toys.
    #[must_use]
    pub const fn for_sources(source_products: usize) -> Self {
        Self {
            source_products,
            variants_created: 0,
            expected_variants: source_products * COLOR_PALETTE.len(),
            errors: Vec::new(),
        }
    }

    pub fn record_created(&mut self) {
        self.variants_created += 1;
    }

    pub fn record_failure(&mut self, source: &Record, color: &str, error: impl std::fmt::Display) {
        let name = source.text("name").unwrap_or("unnamed");
        self.errors
            .push(format!("{name} ({}) in {color}: {error}", source.id));
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.variants_created == self.expected_variants
    }
}
