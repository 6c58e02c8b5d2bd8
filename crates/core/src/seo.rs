//! Declarative page metadata.
//!
//! Each page produces a [`PageMetadata`] value; the base template renders it
//! into `<title>`, description, canonical and Open Graph tags.

use serde::Serialize;

use crate::catalog::{FilterSelection, Product};

const DESCRIPTION_MAX_CHARS: usize = 160;

/// Title, description, canonical URL and share image for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub image: Option<String>,
}

impl PageMetadata {
    /// Metadata for a page at `path` under `base_url`.
    ///
    /// The title becomes `"{page_title} | {store_name}"`, or just the store
    /// name when `page_title` is empty.
    #[must_use]
    pub fn new(
        store_name: &str,
        page_title: &str,
        description: &str,
        base_url: &str,
        path: &str,
    ) -> Self {
        let title = if page_title.is_empty() {
            store_name.to_string()
        } else {
            format!("{page_title} | {store_name}")
        };
        Self {
            title,
            description: truncate(description, DESCRIPTION_MAX_CHARS),
            canonical: canonical_url(base_url, path),
            image: None,
        }
    }

    /// Attach a share image. Relative URLs are made absolute.
    #[must_use]
    pub fn with_image(mut self, base_url: &str, image: &str) -> Self {
        self.image = Some(if image.starts_with("http://") || image.starts_with("https://") {
            image.to_string()
        } else {
            canonical_url(base_url, image)
        });
        self
    }

    /// Metadata for a product detail page.
    #[must_use]
    pub fn for_product(store_name: &str, base_url: &str, product: &Product) -> Self {
        let description = product.description.clone().unwrap_or_else(|| {
            let mut text = format!("Buy {} online", product.name);
            if let Some(age) = &product.age_group {
                text.push_str(&format!(", for ages {age}"));
            }
            text.push('.');
            text
        });
        Self::new(
            store_name,
            &product.name,
            &description,
            base_url,
            &format!("/products/{}", product.id),
        )
        .with_image(base_url, product.primary_image())
    }

    /// Metadata for the catalog, describing the active filters.
    #[must_use]
    pub fn for_catalog(store_name: &str, base_url: &str, selection: &FilterSelection) -> Self {
        let mut parts = Vec::new();
        if let Some(category) = &selection.category {
            parts.push(category.clone());
        }
        if let Some(age) = selection.age {
            parts.push(format!("ages {}", age.label()));
        }
        if let Some(color) = &selection.color {
            parts.push(color.clone());
        }

        let title = if parts.is_empty() {
            "Shop All Toys".to_string()
        } else {
            format!("Shop {}", parts.join(", "))
        };
        let path = format!("/shop{}", selection.query_string());
        Self::new(
            store_name,
            &title,
            "Browse our toys by category, age and color.",
            base_url,
            &path,
        )
    }
}

/// Join `base_url` and `path` with exactly one slash.
fn canonical_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Truncate on a character boundary, adding an ellipsis when shortened.
fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
