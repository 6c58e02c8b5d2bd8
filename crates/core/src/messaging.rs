//! WhatsApp deep links.
//!
//! Links have the form `https://wa.me/<digits>[?text=<url-encoded message>]`.
//! Opening them is up to the page; building them has no side effects.

use crate::catalog::Product;

/// Number used when the store has not configured one.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "919025398147";

const WA_ME_BASE: &str = "https://wa.me/";

/// Strip a leading `+`, whitespace and hyphens from a phone number.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    let without_plus = trimmed.strip_prefix('+').unwrap_or(trimmed);
    without_plus
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Build a WhatsApp chat link, optionally with a prefilled message.
///
/// ```
/// use toyshop_core::messaging::build_messaging_link;
///
/// assert_eq!(
///     build_messaging_link(Some("+91 90253-98147"), Some("Hi")),
///     "https://wa.me/919025398147?text=Hi"
/// );
/// ```
#[must_use]
pub fn build_messaging_link(phone: Option<&str>, message: Option<&str>) -> String {
    let number = phone
        .map(normalize_phone)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string());

    let base = format!("{WA_ME_BASE}{number}");
    match message {
        Some(text) if !text.is_empty() => format!("{base}?text={}", urlencoding::encode(text)),
        _ => base,
    }
}

/// Prefilled order message for a product, naming the chosen color and price.
#[must_use]
pub fn order_message(product: &Product, color: Option<&str>) -> String {
    let mut message = format!("Hi! I'd like to order the {}", product.name);
    if let Some(color) = color.map(str::trim).filter(|c| !c.is_empty()) {
        message.push_str(&format!(" in {color}"));
    }
    if let Some(price) = product.price_label() {
        message.push_str(&format!(" ({price})"));
    }
    message.push('.');
    message
}

/// Generic enquiry message used by the floating chat button.
pub const GENERAL_ENQUIRY_MESSAGE: &str = "Hi! I have a question about your toys.";

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::types::CurrencyCode;
    use serde_json::json;

    #[test]
    fn test_normalizes_number_and_encodes_text() {
        assert_eq!(
            build_messaging_link(Some("+91 90253-98147"), Some("Hi")),
            "https://wa.me/919025398147?text=Hi"
        );
        assert_eq!(
            build_messaging_link(Some("98765 43210"), Some("Is this in stock? 50% off & more")),
            "https://wa.me/9876543210?text=Is%20this%20in%20stock%3F%2050%25%20off%20%26%20more"
        );
    }

    #[test]
    fn test_missing_number_uses_default() {
        assert_eq!(
            build_messaging_link(None, None),
            format!("https://wa.me/{DEFAULT_WHATSAPP_NUMBER}")
        );
        assert_eq!(
            build_messaging_link(Some(" + "), None),
            format!("https://wa.me/{DEFAULT_WHATSAPP_NUMBER}")
        );
    }

    #[test]
    fn test_no_message_means_no_text_param() {
        assert_eq!(build_messaging_link(Some("12345"), None), "https://wa.me/12345");
        assert_eq!(build_messaging_link(Some("12345"), Some("")), "https://wa.me/12345");
    }

    #[test]
    fn test_order_message() {
        let record: Record = serde_json::from_value(json!({
            "id": "t1", "name": "Teddy Bear", "price": 650
        }))
        .unwrap();
        let product = Product::from_record(&record, CurrencyCode::INR);
        assert_eq!(
            order_message(&product, Some("Brown")),
            "Hi! I'd like to order the Teddy Bear in Brown (₹650.00)."
        );
        assert_eq!(
            order_message(&product, None),
            "Hi! I'd like to order the Teddy Bear (₹650.00)."
        );
    }
}
