//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::Datelike;
use toyshop_core::messaging::normalize_phone;

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Footer copyright line for the store name, dated this year.
///
/// Usage in templates: `{{ layout.store_name|copyright }}`
#[askama::filter_fn]
pub fn copyright(store_name: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(copyright_line(&store_name.to_string(), chrono::Utc::now().year()))
}

/// Result count with the right noun.
///
/// Usage in templates: `{{ count|pluralize_toys }}` renders "1 toy" or "3 toys".
#[askama::filter_fn]
pub fn pluralize_toys(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(toy_count(&count.to_string()))
}

/// `tel:` link target for a display phone number.
///
/// Usage in templates: `<a href="{{ layout.phone|tel_href }}">`
#[askama::filter_fn]
pub fn tel_href(phone: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(tel_uri(&phone.to_string()))
}

fn copyright_line(store_name: &str, year: i32) -> String {
    format!("\u{a9} {year} {}", store_name.trim())
}

fn toy_count(count: &str) -> String {
    let noun = if count.trim() == "1" { "toy" } else { "toys" };
    format!("{count} {noun}")
}

/// Empty when the number has no digits. A leading `+` is kept.
fn tel_uri(phone: &str) -> String {
    let digits = normalize_phone(phone);
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return String::new();
    }
    let plus = if phone.trim_start().starts_with('+') { "+" } else { "" };
    format!("tel:{plus}{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toy_count() {
        assert_eq!(toy_count("0"), "0 toys");
        assert_eq!(toy_count("1"), "1 toy");
        assert_eq!(toy_count("12"), "12 toys");
    }

    #[test]
    fn test_tel_uri() {
        assert_eq!(tel_uri("+91 98400-12345"), "tel:+919840012345");
        assert_eq!(tel_uri("044 2434 5678"), "tel:04424345678");
        assert_eq!(tel_uri("   "), "");
    }

    #[test]
    fn test_copyright_line() {
        assert_eq!(copyright_line(" Toyshop ", 2026), "\u{a9} 2026 Toyshop");
    }
}
