//! Color descriptors.
//!
//! Toys store colors either as a comma-joined string (`"Red, Blue"`) in the
//! `color` field or as an explicit array in `colors`. Both are decoded here.

use serde_json::Value;

/// The raw shape of a `color` / `colors` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorField {
    /// Explicit array of color names.
    List(Vec<String>),
    /// Free text, possibly comma-separated.
    Text(String),
}

impl ColorField {
    /// Decode a JSON field value. Non-string array items are ignored.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::List(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            )),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Trimmed, non-empty color tokens in field order.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Text(text) => text.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Colors a customer can pick on the product page.
///
/// First non-empty source wins: the `colors` array, then the `color` field
/// split on commas (a single bare value yields one entry).
#[must_use]
pub fn selectable_colors(colors: Option<&ColorField>, color: Option<&ColorField>) -> Vec<String> {
    [colors, color]
        .into_iter()
        .flatten()
        .map(ColorField::tokens)
        .find(|tokens| !tokens.is_empty())
        .unwrap_or_default()
}
