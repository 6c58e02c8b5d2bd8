//! `products list` - the catalog filter engine from the command line.

use toyshop_core::CurrencyCode;
use toyshop_core::catalog::{AgeBucket, FilterQuery, FilterSelection, Product, filter_products};
use toyshop_storefront::services::CatalogService;

use super::CommandError;

/// Print every toy that passes the filters, one per line.
///
/// # Errors
///
/// Fails on a bad store or currency configuration. Store read errors are
/// logged and yield an empty list, as on the storefront.
#[allow(clippy::print_stdout)]
pub async fn list(
    category: Option<String>,
    age: Option<String>,
    color: Option<String>,
) -> Result<(), CommandError> {
    if let Some(id) = age.as_deref()
        && AgeBucket::from_id(id).is_none()
    {
        tracing::warn!(age = id, "Unknown age group; ignoring age filter");
    }

    let currency = currency_from_env()?;
    let catalog = CatalogService::new(super::connect()?, currency);
    let products = catalog.products().await;
    let selection = FilterSelection::from(&FilterQuery {
        category,
        age,
        color,
    });

    let matches = filter_products(&products, &selection);
    for product in &matches {
        println!("{}", product_line(product));
    }
    println!("{} of {} toys", matches.len(), products.len());
    Ok(())
}

fn currency_from_env() -> Result<CurrencyCode, CommandError> {
    let _ = dotenvy::dotenv();
    match std::env::var("PAYMENT_CURRENCY") {
        Ok(code) => CurrencyCode::parse(&code).ok_or(CommandError::Currency(code)),
        Err(_) => Ok(CurrencyCode::default()),
    }
}

/// `id  name  price  category  age  colors`, with `-` for gaps.
fn product_line(product: &Product) -> String {
    let colors = product.color_tokens().join(", ");
    [
        product.id.to_string(),
        product.name.clone(),
        product.price_label().unwrap_or_else(|| "-".to_string()),
        product.category.clone().unwrap_or_else(|| "-".to_string()),
        product.age_group.clone().unwrap_or_else(|| "-".to_string()),
        if colors.is_empty() { "-".to_string() } else { colors },
    ]
    .join("\t")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use toyshop_core::Record;

    use super::*;

    fn product(fields: serde_json::Value) -> Product {
        let serde_json::Value::Object(fields) = fields else {
            panic!("fields must be an object");
        };
        Product::from_record(&Record::new("t1", fields), CurrencyCode::INR)
    }

    #[test]
    fn test_line_with_all_fields() {
        let line = product_line(&product(json!({
            "name": "Rag Doll",
            "price": 350,
            "category": "Dolls",
            "age_group": "3-5",
            "color": "Red, Blue"
        })));
        let cols: Vec<_> = line.split('\t').collect();
        assert_eq!(cols[0], "t1");
        assert_eq!(cols[1], "Rag Doll");
        assert!(cols[2].contains("350"));
        assert_eq!(&cols[3..], ["Dolls", "3-5", "Red, Blue"]);
    }

    #[test]
    fn test_line_marks_missing_fields() {
        let line = product_line(&product(json!({"name": "Mystery Box"})));
        assert_eq!(line, "t1\tMystery Box\t-\t-\t-\t-");
    }
}
