//! Variant resolution for the product page.
//!
//! Given a product and the color requested through the `?color=` query
//! parameter, decide which images to show, which one is selected, and which
//! colors can be picked.

use serde::Serialize;

use crate::catalog::product::{PLACEHOLDER_IMAGE_URL, Product};

/// Maps a requested color to one of the product's images.
pub trait ColorImageMatcher {
    /// Index into `images` for `color`, if any image belongs to it.
    fn match_image(&self, images: &[String], color: &str) -> Option<usize>;
}

/// Picks the first image whose URL contains the color name, ignoring case.
///
/// Purely textual: `".../blue-car.png"` matches `"Blue"`, but so would
/// `".../blueberry.png"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlSubstringMatcher;

impl ColorImageMatcher for UrlSubstringMatcher {
    fn match_image(&self, images: &[String], color: &str) -> Option<usize> {
        let needle = color.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        images
            .iter()
            .position(|url| url.to_lowercase().contains(&needle))
    }
}

/// What the product page should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayResolution {
    /// Never empty; the placeholder stands in when the product has no images.
    pub images: Vec<String>,
    pub selected_index: usize,
    pub available_colors: Vec<String>,
}

impl DisplayResolution {
    /// URL of the selected image.
    #[must_use]
    pub fn selected_image(&self) -> &str {
        self.images
            .get(self.selected_index)
            .map_or(PLACEHOLDER_IMAGE_URL, String::as_str)
    }
}

/// Resolve the display with the default URL substring heuristic.
#[must_use]
pub fn resolve_display(product: &Product, requested_color: Option<&str>) -> DisplayResolution {
    resolve_display_with(&UrlSubstringMatcher, product, requested_color)
}

/// Resolve the display with a custom color-to-image matcher.
#[must_use]
pub fn resolve_display_with(
    matcher: &impl ColorImageMatcher,
    product: &Product,
    requested_color: Option<&str>,
) -> DisplayResolution {
    let images = if product.images.is_empty() {
        vec![PLACEHOLDER_IMAGE_URL.to_string()]
    } else {
        product.images.clone()
    };

    let selected_index = requested_color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .and_then(|color| matcher.match_image(&images, color))
        .unwrap_or(0);

    DisplayResolution {
        images,
        selected_index,
        available_colors: product.selectable_colors(),
    }
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

    #[test]
    fn test_requested_color_selects_matching_image() {
        let p = product(json!({
            "id": "car",
            "name": "Race Car",
            "images": ["http://x/red-car.png", "http://x/blue-car.png"],
            "color": "Red, Blue"
        }));
        let display = resolve_display(&p, Some("blue"));
        assert_eq!(display.selected_index, 1);
        assert_eq!(display.selected_image(), "http://x/blue-car.png");
        assert_eq!(display.available_colors, vec!["Red", "Blue"]);
    }

    #[test]
    fn test_match_ignores_case() {
        let p = product(json!({
            "id": "car",
            "name": "Race Car",
            "images": ["http://x/car-RED.png", "http://x/car-GREEN.png"]
        }));
        assert_eq!(resolve_display(&p, Some("Green")).selected_index, 1);
    }

    #[test]
    fn test_no_match_or_no_color_defaults_to_first() {
        let p = product(json!({
            "id": "car",
            "name": "Race Car",
            "images": ["http://x/red-car.png", "http://x/blue-car.png"]
        }));
        assert_eq!(resolve_display(&p, Some("purple")).selected_index, 0);
        assert_eq!(resolve_display(&p, Some("   ")).selected_index, 0);
        assert_eq!(resolve_display(&p, None).selected_index, 0);
    }

    #[test]
    fn test_no_images_yields_placeholder() {
        let p = product(json!({"id": "car", "name": "Race Car"}));
        let display = resolve_display(&p, Some("blue"));
        assert_eq!(display.images, vec![PLACEHOLDER_IMAGE_URL]);
        assert_eq!(display.selected_index, 0);
        assert!(display.available_colors.is_empty());
    }

    #[test]
    fn test_custom_matcher() {
        struct LastImage;
        impl ColorImageMatcher for LastImage {
            fn match_image(&self, images: &[String], _color: &str) -> Option<usize> {
                images.len().checked_sub(1)
            }
        }

        let p = product(json!({
            "id": "car",
            "name": "Race Car",
            "images": ["a.png", "b.png", "c.png"]
        }));
        assert_eq!(resolve_display_with(&LastImage, &p, Some("x")).selected_index, 2);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let p = product(json!({
            "id": "car",
            "name": "Race Car",
            "images": ["http://x/red-car.png", "http://x/blue-car.png"]
        }));
        assert_eq!(resolve_display(&p, Some("blue")), resolve_display(&p, Some("blue")));
    }
}
