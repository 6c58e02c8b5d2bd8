//! Catalog domain: products, categories, age buckets, filtering and variant
//! resolution.

pub mod age;
pub mod category;
pub mod color;
pub mod filter;
pub mod product;
pub mod variant;

pub use age::{AgeBucket, AgeDescriptor};
pub use category::{Category, filter_pills};
pub use color::ColorField;
pub use filter::{FilterQuery, FilterSelection, available_colors, filter_products};
pub use product::{PLACEHOLDER_IMAGE_URL, Product};
pub use variant::{
    ColorImageMatcher, DisplayResolution, UrlSubstringMatcher, resolve_display,
    resolve_display_with,
};

/// Toys sharing `product`'s category, excluding the product itself.
#[must_use]
pub fn related_products<'a>(
    products: &'a [Product],
    product: &Product,
    limit: usize,
) -> Vec<&'a Product> {
    let Some(category) = product.category.as_deref() else {
        return Vec::new();
    };
    let selection = FilterSelection {
        category: Some(category.to_string()),
        ..FilterSelection::default()
    };
    filter_products(products, &selection)
        .into_iter()
        .filter(|p| p.id != product.id)
        .take(limit)
        .collect()
}

/// Featured toys for the home page; the first `limit` toys when none are flagged.
#[must_use]
pub fn featured_products(products: &[Product], limit: usize) -> Vec<&Product> {
    let featured: Vec<&Product> = products.iter().filter(|p| p.featured).take(limit).collect();
    if featured.is_empty() {
        products.iter().take(limit).collect()
    } else {
        featured
    }
}
