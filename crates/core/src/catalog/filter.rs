//! Catalog filter engine.
//!
//! Filtering is a pure function of the product list and a [`FilterSelection`].
//! Category, age and color act only as predicates (combined with AND), so the
//! result keeps the input order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::age::AgeBucket;
use crate::catalog::product::Product;

/// Raw `category` / `age` / `color` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// The active catalog filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub category: Option<String>,
    pub age: Option<AgeBucket>,
    pub color: Option<String>,
}

impl From<&FilterQuery> for FilterSelection {
    fn from(query: &FilterQuery) -> Self {
        Self {
            category: specific(query.category.as_deref()),
            age: specific(query.age.as_deref()).and_then(|id| AgeBucket::from_id(&id)),
            color: specific(query.color.as_deref()),
        }
    }
}

/// `None` for absent, blank, or "all".
fn specific(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(str::to_string)
}

impl FilterSelection {
    /// True when no filter is applied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.age.is_none() && self.color.is_none()
    }

    /// Whether `product` passes every active predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_category(product) && self.matches_age(product) && self.matches_color(product)
    }

    fn matches_category(&self, product: &Product) -> bool {
        let Some(selected) = &self.category else {
            return true;
        };
        product
            .category
            .as_deref()
            .is_some_and(|c| c.trim().to_lowercase() == selected.trim().to_lowercase())
    }

    fn matches_age(&self, product: &Product) -> bool {
        self.age.is_none_or(|bucket| product.age.matches(bucket))
    }

    fn matches_color(&self, product: &Product) -> bool {
        let Some(selected) = &self.color else {
            return true;
        };
        let selected = selected.trim().to_lowercase();
        product
            .color_tokens()
            .iter()
            .any(|token| token.to_lowercase() == selected)
    }

    /// Query parameters for this selection, in `category`, `age`, `color` order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(age) = self.age {
            pairs.push(("age", age.id().to_string()));
        }
        if let Some(color) = &self.color {
            pairs.push(("color", color.clone()));
        }
        pairs
    }

    /// URL-encoded query string including the leading `?`, or empty.
    #[must_use]
    pub fn query_string(&self) -> String {
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let encoded: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect();
        format!("?{}", encoded.join("&"))
    }

    /// Selection with the category toggled: picking the current one clears it.
    #[must_use]
    pub fn toggle_category(&self, name: &str) -> Self {
        let same = self
            .category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(name.trim()));
        Self {
            category: (!same).then(|| name.trim().to_string()),
            ..self.clone()
        }
    }

    /// Selection with the age bucket toggled.
    #[must_use]
    pub fn toggle_age(&self, bucket: AgeBucket) -> Self {
        Self {
            age: (self.age != Some(bucket)).then_some(bucket),
            ..self.clone()
        }
    }

    /// Selection with the color toggled.
    #[must_use]
    pub fn toggle_color(&self, color: &str) -> Self {
        let same = self
            .color
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(color.trim()));
        Self {
            color: (!same).then(|| color.trim().to_string()),
            ..self.clone()
        }
    }
}

/// Products passing `selection`, in input order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], selection: &FilterSelection) -> Vec<&'a Product> {
    products.iter().filter(|p| selection.matches(p)).collect()
}

/// Every distinct color token across `products`, sorted.
///
/// Dedup is case-sensitive: `"Red"` and `"red"` are separate entries.
#[must_use]
pub fn available_colors(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .flat_map(Product::color_tokens)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::types::CurrencyCode;
    use serde_json::{Value, json};

    fn product(value: Value) -> Product {
        let record: Record = serde_json::from_value(value).unwrap();
        Product::from_record(&record, CurrencyCode::INR)
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(json!({"id": "1", "name": "Rag Doll", "category": " Dolls ", "age_group": "3-5", "color": "Red, Blue"})),
            product(json!({"id": "2", "name": "Robot", "category": "Robots", "age_group": "6+", "color": "Black"})),
            product(json!({"id": "3", "name": "Rattle", "category": "Baby", "age_group": "6 months-2 years", "color": "yellow"})),
            product(json!({"id": "4", "name": "Mystery Box", "age_group": "ask us"})),
            product(json!({"id": "5", "name": "Doll House", "category": "dolls", "age_group": "6-8", "color": "Pink,red"})),
        ]
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    fn select(category: Option<&str>, age: Option<&str>, color: Option<&str>) -> FilterSelection {
        FilterSelection::from(&FilterQuery {
            category: category.map(str::to_string),
            age: age.map(str::to_string),
            color: color.map(str::to_string),
        })
    }

    #[test]
    fn test_no_filters_keeps_everything_in_order() {
        let products = catalog();
        let result = filter_products(&products, &FilterSelection::default());
        assert_eq!(ids(&result), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_category_exact_case_and_whitespace_insensitive() {
        let products = catalog();
        let result = filter_products(&products, &select(Some("dolls"), None, None));
        assert_eq!(ids(&result), vec!["1", "5"]);

        // No partial matches
        let result = filter_products(&products, &select(Some("doll"), None, None));
        assert!(result.is_empty());
    }

    #[test]
    fn test_age_bucket() {
        let products = catalog();
        let result = filter_products(&products, &select(None, Some("6-8"), None));
        // "3-5" excluded, "6+" and "6-8" included, unparseable fails open
        assert_eq!(ids(&result), vec!["2", "4", "5"]);

        let result = filter_products(&products, &select(None, Some("0-2"), None));
        assert_eq!(ids(&result), vec!["3", "4"]);
    }

    #[test]
    fn test_color_token_match() {
        let products = catalog();
        let result = filter_products(&products, &select(None, None, Some("blue")));
        assert_eq!(ids(&result), vec!["1"]);

        let result = filter_products(&products, &select(None, None, Some("RED")));
        assert_eq!(ids(&result), vec!["1", "5"]);
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let products = catalog();
        let result = filter_products(&products, &select(Some("Dolls"), Some("6-8"), Some("red")));
        assert_eq!(ids(&result), vec!["5"]);
    }

    #[test]
    fn test_all_and_unknown_values_mean_no_filter() {
        let selection = select(Some("All"), Some("4-7"), Some(" "));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let products = catalog();
        let selection = select(Some("dolls"), None, Some("red"));
        let first = ids(&filter_products(&products, &selection));
        let second = ids(&filter_products(&products, &selection));
        assert_eq!(first, second);
    }

    #[test]
    fn test_available_colors_sorted_case_sensitive() {
        let products = catalog();
        assert_eq!(
            available_colors(&products),
            vec!["Black", "Blue", "Pink", "Red", "red", "yellow"]
        );
    }

    #[test]
    fn test_query_string_round_trip() {
        let selection = select(Some("Soft Toys"), Some("13+"), Some("Sky Blue"));
        assert_eq!(
            selection.query_string(),
            "?category=Soft%20Toys&age=13%2B&color=Sky%20Blue"
        );
        assert_eq!(FilterSelection::default().query_string(), "");
    }

    #[test]
    fn test_toggles() {
        let selection = select(Some("Dolls"), Some("3-5"), None);
        assert_eq!(selection.toggle_category("dolls").category, None);
        assert_eq!(
            selection.toggle_category("Robots").category.as_deref(),
            Some("Robots")
        );
        assert_eq!(selection.toggle_age(AgeBucket::Preschool).age, None);
        assert_eq!(
            selection.toggle_color("Red").color.as_deref(),
            Some("Red")
        );
        // Other filters are kept
        assert_eq!(selection.toggle_color("Red").age, Some(AgeBucket::Preschool));
    }
}
