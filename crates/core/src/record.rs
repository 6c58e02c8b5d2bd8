//! Generic Record Store records and collection names.
//!
//! The backend stores schemaless JSON documents. A [`Record`] is the opaque
//! `id` plus every other field as raw JSON; typed views such as
//! [`Product`](crate::catalog::Product) are decoded from it once on read.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::RecordId;

/// Raw record fields (everything except `id`).
pub type Fields = serde_json::Map<String, Value>;

/// Fields maintained by the Record Store itself. Never copied between records.
pub const STORE_MANAGED_FIELDS: &[&str] = &[
    "id",
    "created_date",
    "updated_date",
    "created_by",
    "created_at",
    "updated_at",
];

/// Named collections used by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Sellable toys.
    Toys,
    /// Category labels for the filter pills.
    ToyCategories,
    /// Singleton store contact record.
    StoreInformation,
    /// Contact form submissions.
    ContactInquiries,
}

impl Collection {
    /// Collection name as used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Toys => "toys",
            Self::ToyCategories => "toycategories",
            Self::StoreInformation => "storeinformation",
            Self::ContactInquiries => "contactinquiries",
        }
    }

    /// Every collection, in a stable order.
    pub const ALL: [Self; 4] = [
        Self::Toys,
        Self::ToyCategories,
        Self::StoreInformation,
        Self::ContactInquiries,
    ];

    /// Look up a collection by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors decoding a typed view from a raw record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A required field is absent or blank.
    #[error("{collection} record {id} is missing required field `{field}`")]
    MissingField {
        collection: Collection,
        id: RecordId,
        field: &'static str,
    },
}

/// A stored record: opaque identifier plus raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Create a record from an id and fields.
    #[must_use]
    pub fn new(id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Raw field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Trimmed, non-empty string field.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Boolean field, accepting `true`/`false` and their string forms.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.fields.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Integer field, accepting numbers and numeric strings.
    #[must_use]
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.fields.get(key)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Copy of the fields without store-managed keys, ready to create a new record.
    #[must_use]
    pub fn copyable_fields(&self) -> Fields {
        self.fields
            .iter()
            .filter(|(k, _)| !STORE_MANAGED_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Required text field or a [`RecordError::MissingField`].
    ///
    /// # Errors
    ///
    /// Returns an error when the field is absent, not a string, or blank.
    pub fn require_text(
        &self,
        collection: Collection,
        field: &'static str,
    ) -> Result<&str, RecordError> {
        self.text(field).ok_or_else(|| RecordError::MissingField {
            collection,
            id: self.id.clone(),
            field,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_record_flattens_fields() {
        let r = record(json!({"id": "t1", "name": "Rocket", "price": 499}));
        assert_eq!(r.id.as_str(), "t1");
        assert_eq!(r.text("name"), Some("Rocket"));
        assert!(!r.fields.contains_key("id"));

        let back = serde_json::to_value(&r).unwrap();
        assert_eq!(back["id"], "t1");
        assert_eq!(back["price"], 499);
    }

    #[test]
    fn test_text_ignores_blank() {
        let r = record(json!({"id": "t1", "category": "   "}));
        assert_eq!(r.text("category"), None);
    }

    #[test]
    fn test_flag_and_integer() {
        let r = record(json!({"id": "c", "is_active": "false", "display_order": "3", "n": 2.6}));
        assert_eq!(r.flag("is_active"), Some(false));
        assert_eq!(r.integer("display_order"), Some(3));
        assert_eq!(r.integer("n"), Some(3));
        assert_eq!(r.flag("missing"), None);
    }

    #[test]
    fn test_copyable_fields_drops_store_managed() {
        let r = record(json!({
            "id": "t1",
            "name": "Rocket",
            "created_date": "2024-01-01",
            "updated_date": "2024-01-02",
            "created_by": "admin@toys.in"
        }));
        let copy = r.copyable_fields();
        assert_eq!(copy.len(), 1);
        assert_eq!(copy["name"], "Rocket");
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::ToyCategories.as_str(), "toycategories");
        assert_eq!(
            Collection::from_name("contactinquiries"),
            Some(Collection::ContactInquiries)
        );
        assert_eq!(Collection::from_name("orders"), None);
    }

    #[test]
    fn test_require_text() {
        let r = record(json!({"id": "t9"}));
        let err = r.require_text(Collection::Toys, "name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "toys record t9 is missing required field `name`"
        );
    }
}
