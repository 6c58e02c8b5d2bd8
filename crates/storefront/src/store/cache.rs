//! Cache types for Record Store reads.

use toyshop_core::{Collection, Record, RecordId};

use super::RecordPage;

/// Cache key: every entry belongs to exactly one collection so writes can
/// invalidate just that collection.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub collection: Collection,
    pub kind: CacheKind,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKind {
    List(String),
    Record(RecordId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Page(RecordPage),
    /// `None` caches a 404 so repeated misses stay cheap.
    Record(Option<Box<Record>>),
}
