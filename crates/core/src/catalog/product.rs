//! Typed toy product decoded from a raw `toys` record.

use serde::Serialize;
use serde_json::Value;

use crate::catalog::age::AgeDescriptor;
use crate::catalog::color::{ColorField, selectable_colors};
use crate::record::Record;
use crate::types::{CurrencyCode, Price, ToyId};

/// Image shown when a product has no usable image reference.
pub const PLACEHOLDER_IMAGE_URL: &str = "/static/images/placeholder-toy.svg";

/// Display name for a toy record without a usable `name`.
pub const UNTITLED_TOY_NAME: &str = "Untitled toy";

/// A sellable toy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ToyId,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    /// Age descriptor as entered, for display.
    pub age_group: Option<String>,
    pub age: AgeDescriptor,
    /// The `color` field (usually comma-joined text).
    #[serde(skip)]
    pub color: Option<ColorField>,
    /// The explicit `colors` array, when the record has one.
    #[serde(skip)]
    pub colors: Option<ColorField>,
    /// Resolved image URLs. Empty when the record has none.
    pub images: Vec<String>,
    pub featured: bool,
    pub in_stock: bool,
}

impl Product {
    /// Decode a product from a `toys` record. Never fails: a missing name
    /// becomes [`UNTITLED_TOY_NAME`] so the toy still reaches the filters.
    #[must_use]
    pub fn from_record(record: &Record, currency: CurrencyCode) -> Self {
        let name = record.text("name").unwrap_or(UNTITLED_TOY_NAME).to_string();

        Self {
            id: record.id.clone().into(),
            name,
            description: record.text("description").map(str::to_string),
            price: record
                .get("price")
                .and_then(|v| Price::from_json(v, currency)),
            category: record.text("category").map(str::to_string),
            age_group: record.text("age_group").map(str::to_string),
            age: AgeDescriptor::parse(record.text("age_group")),
            color: record.get("color").and_then(ColorField::from_json),
            colors: record.get("colors").and_then(ColorField::from_json),
            images: resolve_images(record),
            featured: record.flag("is_featured").unwrap_or(false),
            in_stock: record.flag("in_stock").unwrap_or(true),
        }
    }

    /// Tokens of the `color` field, as used by the catalog color filter.
    #[must_use]
    pub fn color_tokens(&self) -> Vec<String> {
        self.color.as_ref().map(ColorField::tokens).unwrap_or_default()
    }

    /// Colors selectable on the product page.
    #[must_use]
    pub fn selectable_colors(&self) -> Vec<String> {
        selectable_colors(self.colors.as_ref(), self.color.as_ref())
    }

    /// First image, or the placeholder.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images
            .first()
            .map_or(PLACEHOLDER_IMAGE_URL, String::as_str)
    }

    /// Formatted price, or `None` when the product has no price.
    #[must_use]
    pub fn price_label(&self) -> Option<String> {
        self.price.map(|p| p.to_string())
    }
}

/// Resolve a record's images from the legacy shapes.
///
/// First non-empty source wins: `images` gallery, `media_gallery`, the legacy
/// `image_url` string, then the single `image` field.
fn resolve_images(record: &Record) -> Vec<String> {
    ["images", "media_gallery", "image_url", "image"]
        .into_iter()
        .filter_map(|key| record.get(key))
        .map(image_urls)
        .find(|urls| !urls.is_empty())
        .unwrap_or_default()
}

/// Flatten one image field into URL strings.
fn image_urls(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(image_url).collect(),
        other => image_url(other).into_iter().collect(),
    }
}

/// A bare string or an object with `src` / `url`.
fn image_url(value: &Value) -> Option<String> {
    let url = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("src")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| map.get("url").and_then(Value::as_str))?,
        _ => return None,
    };
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}
