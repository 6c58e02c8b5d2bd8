//! Toy categories used to build the catalog filter pills.

use serde::Serialize;

use crate::record::{Collection, Record, RecordError};
use crate::types::CategoryId;

/// A category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub active: bool,
    pub display_order: i64,
}

impl Category {
    /// Decode a category from a `toycategories` record.
    ///
    /// Missing `is_active` means active; missing `display_order` means 0.
    ///
    /// # Errors
    ///
    /// Returns an error when the record has no name.
    pub fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(Self {
            id: record.id.clone().into(),
            name: record
                .require_text(Collection::ToyCategories, "name")?
                .to_string(),
            active: record.flag("is_active").unwrap_or(true),
            display_order: record.integer("display_order").unwrap_or(0),
        })
    }
}

/// Active categories sorted by display order, ties kept in input order.
#[must_use]
pub fn filter_pills(categories: &[Category]) -> Vec<&Category> {
    let mut pills: Vec<&Category> = categories.iter().filter(|c| c.active).collect();
    // sort_by_key is stable
    pills.sort_by_key(|c| c.display_order);
    pills
}
