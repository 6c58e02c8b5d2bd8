//! `variants generate` - one copy of every toy per palette color.

use toyshop_core::variants::{COLOR_PALETTE, VariantReport};
use toyshop_storefront::services::generate_color_variants;
use toyshop_storefront::store::RecordStore;

use super::CommandError;

/// Run the batch and print its report.
///
/// # Errors
///
/// Fails without `--yes`, when the store cannot be reached, or when any
/// variant could not be created.
#[allow(clippy::print_stdout)]
pub async fn generate(confirmed: bool) -> Result<(), CommandError> {
    if !confirmed {
        return Err(CommandError::ConfirmationRequired);
    }

    let store = super::connect()?;
    let report = run(store.as_ref()).await?;

    for line in report_lines(&report) {
        println!("{line}");
    }

    check(&report)
}

async fn run(store: &dyn RecordStore) -> Result<VariantReport, CommandError> {
    tracing::info!(colors = ?COLOR_PALETTE, "Starting color variant batch");
    Ok(generate_color_variants(store).await?)
}

fn check(report: &VariantReport) -> Result<(), CommandError> {
    if report.is_complete() {
        Ok(())
    } else {
        Err(CommandError::IncompleteBatch {
            failed: report.expected_variants - report.variants_created,
            expected: report.expected_variants,
        })
    }
}

fn report_lines(report: &VariantReport) -> Vec<String> {
    let mut lines = vec![
        format!("Source toys:      {}", report.source_products),
        format!("Expected variants: {}", report.expected_variants),
        format!("Created variants:  {}", report.variants_created),
    ];
    if !report.errors.is_empty() {
        lines.push(format!("Failures ({}):", report.errors.len()));
        lines.extend(report.errors.iter().map(|e| format!("  - {e}")));
    }
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use toyshop_core::Collection;
    use toyshop_storefront::store::MemoryRecordStore;

    use super::*;

    fn store() -> MemoryRecordStore {
        MemoryRecordStore::from_seed(&json!({
            "toys": [{"id": "t1", "name": "Rocket", "price": 499}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_refuses_without_confirmation() {
        let err = generate(false).await.unwrap_err();
        assert!(matches!(err, CommandError::ConfirmationRequired));
    }

    #[tokio::test]
    async fn test_full_batch_passes_check() {
        let store = store();
        let report = run(&store).await.unwrap();
        assert!(check(&report).is_ok());
        assert_eq!(store.records(Collection::Toys).await.len(), 5);

        let lines = report_lines(&report);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with('4'));
    }

    #[tokio::test]
    async fn test_partial_batch_fails_check() {
        let store = store();
        store.fail_create_call(1);
        let report = run(&store).await.unwrap();

        let err = check(&report).unwrap_err();
        assert!(matches!(
            err,
            CommandError::IncompleteBatch { failed: 1, expected: 4 }
        ));

        let lines = report_lines(&report);
        assert_eq!(lines[3], "Failures (1):");
        assert!(lines[4].starts_with("  - Rocket (t1) in Blue:"));
    }
}
