//! In-process Record Store for local development and tests.
//!
//! Collections are kept in insertion order. Writes stamp `created_date` /
//! `updated_date` the way the remote store does.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use toyshop_core::{Collection, Fields, Record, RecordId};
use uuid::Uuid;

use super::{ListQuery, RecordPage, RecordStore, StoreError};

/// Record Store backed by a `HashMap` of collections.
#[derive(Default)]
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<Collection, Vec<Record>>>,
    unavailable: AtomicBool,
    create_calls: AtomicUsize,
    failing_creates: Mutex<HashSet<usize>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load collections from a JSON seed file.
    ///
    /// The file maps collection names to arrays of records:
    /// `{"toys": [{"id": "t1", "name": "..."}], "toycategories": [...]}`.
    /// Records without an `id` get one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid seed JSON.
    pub fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {e}", path.display())))?;
        let seed: Value = serde_json::from_str(&text)?;
        let store = Self::from_seed(&seed)?;
        tracing::info!(path = %path.display(), "Loaded record store seed");
        Ok(store)
    }

    /// Build a store from seed JSON (see [`MemoryRecordStore::from_seed_file`]).
    ///
    /// # Errors
    ///
    /// Returns an error for unknown collection names or non-object records.
    pub fn from_seed(seed: &Value) -> Result<Self, StoreError> {
        let Value::Object(map) = seed else {
            return Err(StoreError::Seed("seed must be a JSON object".to_string()));
        };

        let mut collections = HashMap::new();
        for (name, items) in map {
            let collection = Collection::from_name(name)
                .ok_or_else(|| StoreError::Seed(format!("unknown collection '{name}'")))?;
            let Value::Array(items) = items else {
                return Err(StoreError::Seed(format!("'{name}' must be an array")));
            };

            let records = items
                .iter()
                .map(|item| {
                    let Value::Object(fields) = item else {
                        return Err(StoreError::Seed(format!("'{name}' items must be objects")));
                    };
                    let mut fields = fields.clone();
                    let id = match fields.remove("id") {
                        Some(Value::String(id)) if !id.trim().is_empty() => id,
                        Some(Value::Number(n)) => n.to_string(),
                        _ => new_id(),
                    };
                    Ok(Record::new(id, fields))
                })
                .collect::<Result<Vec<_>, _>>()?;
            collections.insert(collection, records);
        }

        Ok(Self {
            collections: RwLock::new(collections),
            ..Self::default()
        })
    }

    /// Replace the contents of one collection.
    pub async fn insert_records(&self, collection: Collection, records: Vec<Record>) {
        self.collections.write().await.insert(collection, records);
    }

    /// Every record of a collection, in insertion order.
    pub async fn records(&self, collection: Collection) -> Vec<Record> {
        self.collections
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every call fail until switched back, simulating an outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Make the `n`th call to `create` (1-based, counted from now on) fail.
    pub fn fail_create_call(&self, n: usize) {
        let target = self.create_calls.load(AtomicOrdering::SeqCst) + n;
        if let Ok(mut failing) = self.failing_creates.lock() {
            failing.insert(target);
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn matches_filters(record: &Record, filters: &Fields) -> bool {
    filters.iter().all(|(key, expected)| {
        if key == "id" {
            return expected.as_str() == Some(record.id.as_str());
        }
        record.get(key) == Some(expected)
    })
}

/// Order two JSON values: numbers numerically, strings lexicographically.
/// Mixed types compare equal.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_all(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<RecordPage, StoreError> {
        self.check_available()?;
        let collections = self.collections.read().await;
        let mut items: Vec<Record> = collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches_filters(r, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = &query.sort {
            let (field, descending) = sort
                .strip_prefix('-')
                .map_or((sort.as_str(), false), |f| (f, true));
            // Stable sort: ties keep insertion order, records without the
            // field go last in either direction.
            items.sort_by(|a, b| match (a.get(field), b.get(field)) {
                (Some(x), Some(y)) if descending => compare_values(x, y).reverse(),
                (Some(x), Some(y)) => compare_values(x, y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        if let Some(limit) = query.limit {
            items.truncate(limit);
        }

        Ok(RecordPage { items })
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &RecordId,
    ) -> Result<Option<Record>, StoreError> {
        self.check_available()?;
        Ok(self
            .collections
            .read()
            .await
            .get(&collection)
            .and_then(|records| records.iter().find(|r| &r.id == id))
            .cloned())
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Record, StoreError> {
        self.check_available()?;
        let call = self.create_calls.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let should_fail = self
            .failing_creates
            .lock()
            .map(|mut failing| failing.remove(&call))
            .unwrap_or(false);
        if should_fail {
            return Err(StoreError::Unavailable(format!("create call {call} rejected")));
        }

        let mut fields = fields;
        fields.remove("id");
        let now = Value::String(Utc::now().to_rfc3339());
        fields.insert("created_date".into(), now.clone());
        fields.insert("updated_date".into(), now);

        let record = Record::new(new_id(), fields);
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| &r.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.clone(),
            })?;

        for (key, value) in fields {
            if key != "id" {
                record.fields.insert(key, value);
            }
        }
        record
            .fields
            .insert("updated_date".into(), Value::String(Utc::now().to_rfc3339()));
        Ok(record.clone())
    }
}
