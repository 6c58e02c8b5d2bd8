//! Color variant batch job.
//!
//! For every toy and every palette color, create one copy of the toy in that
//! color. Creates run one at a time. A failed create is recorded in the report
//! and the loop moves on. There is no duplicate check: running the job twice
//! creates the variants twice.

use toyshop_core::Collection;
use toyshop_core::variants::{COLOR_PALETTE, VariantReport, variant_fields};
use tracing::instrument;

use crate::store::{ListQuery, RecordStore, StoreError};

/// Run the batch against `store`.
///
/// # Errors
///
/// Only fails if the source toys cannot be listed. Individual create
/// failures are collected in [`VariantReport::errors`].
#[instrument(skip(store))]
pub async fn generate_color_variants(store: &dyn RecordStore) -> Result<VariantReport, StoreError> {
    let sources = store.get_all(Collection::Toys, &ListQuery::new()).await?.items;
    let mut report = VariantReport::for_sources(sources.len());
    tracing::info!(
        sources = report.source_products,
        expected = report.expected_variants,
        "Generating color variants"
    );

    for source in &sources {
        for color in COLOR_PALETTE {
            match store
                .create(Collection::Toys, variant_fields(source, color))
                .await
            {
                Ok(created) => {
                    tracing::debug!(source = %source.id, variant = %created.id, color, "Created variant");
                    report.record_created();
                }
                Err(e) => {
                    tracing::warn!(source = %source.id, color, error = %e, "Failed to create variant");
                    report.record_failure(source, color, &e);
                }
            }
        }
    }

    tracing::info!(
        created = report.variants_created,
        failed = report.errors.len(),
        "Color variant generation finished"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryRecordStore;

    fn two_toys() -> MemoryRecordStore {
        MemoryRecordStore::from_seed(&json!({
            "toys": [
                {"id": "t1", "name": "Rocket", "price": 499, "color": "White"},
                {"id": "t2", "name": "Kite", "price": 150}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_creates_one_copy_per_color() {
        let store = two_toys();
        let report = generate_color_variants(&store).await.unwrap();
        assert_eq!(report.source_products, 2);
        assert_eq!(report.expected_variants, 8);
        assert_eq!(report.variants_created, 8);
        assert!(report.is_complete());

        let toys = store.records(Collection::Toys).await;
        assert_eq!(toys.len(), 10);
        let rocket_colors: Vec<_> = toys
            .iter()
            .filter(|r| r.text("name") == Some("Rocket"))
            .filter_map(|r| r.text("color"))
            .collect();
        assert_eq!(rocket_colors, vec!["White", "Blue", "Black", "Red", "Yellow"]);
    }

    #[tokio::test]
    async fn test_single_failure_is_collected() {
        let store = two_toys();
        store.fail_create_call(3);
        let report = generate_color_variants(&store).await.unwrap();
        assert_eq!(report.expected_variants, 8);
        assert_eq!(report.variants_created, 7);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Rocket (t1) in Red:"));
    }

    #[tokio::test]
    async fn test_rerun_duplicates_again() {
        let store = two_toys();
        generate_color_variants(&store).await.unwrap();
        let second = generate_color_variants(&store).await.unwrap();
        assert_eq!(second.source_products, 10);
        assert_eq!(store.records(Collection::Toys).await.len(), 50);
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error() {
        let store = two_toys();
        store.set_unavailable(true);
        assert!(generate_color_variants(&store).await.is_err());
    }
}
