//! Contact form submissions (`contactinquiries` collection).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Fields;
use crate::types::{Email, EmailError};

const NAME_MAX_CHARS: usize = 100;
const MESSAGE_MAX_CHARS: usize = 2000;
const PHONE_MAX_CHARS: usize = 20;

/// Why a contact form submission was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InquiryError {
    #[error("please tell us your name")]
    MissingName,
    #[error("name must be at most {NAME_MAX_CHARS} characters")]
    NameTooLong,
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error("phone number can only contain digits, spaces, `+` and `-`")]
    InvalidPhone,
    #[error("please include a message")]
    MissingMessage,
    #[error("message must be at most {MESSAGE_MAX_CHARS} characters")]
    MessageTooLong,
}

/// Raw form body as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// A validated inquiry, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInquiry {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactInquiry {
    /// Validate a submitted form.
    ///
    /// # Errors
    ///
    /// Returns the first failing field check.
    pub fn from_form(form: &ContactForm) -> Result<Self, InquiryError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(InquiryError::MissingName);
        }
        if name.chars().count() > NAME_MAX_CHARS {
            return Err(InquiryError::NameTooLong);
        }

        let email = Email::parse(&form.email)?;

        let phone = non_empty(&form.phone);
        if let Some(phone) = &phone
            && (phone.chars().count() > PHONE_MAX_CHARS
                || !phone
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ')))
        {
            return Err(InquiryError::InvalidPhone);
        }

        let message = form.message.trim();
        if message.is_empty() {
            return Err(InquiryError::MissingMessage);
        }
        if message.chars().count() > MESSAGE_MAX_CHARS {
            return Err(InquiryError::MessageTooLong);
        }

        Ok(Self {
            name: name.to_string(),
            email,
            phone,
            subject: non_empty(&form.subject),
            message: message.to_string(),
        })
    }

    /// Record fields for the store, stamped with `submitted_at` and status `new`.
    #[must_use]
    pub fn into_fields(self, submitted_at: DateTime<Utc>) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), Value::String(self.name));
        fields.insert("email".into(), Value::String(self.email.into_inner()));
        if let Some(phone) = self.phone {
            fields.insert("phone".into(), Value::String(phone));
        }
        if let Some(subject) = self.subject {
            fields.insert("subject".into(), Value::String(subject));
        }
        fields.insert("message".into(), Value::String(self.message));
        fields.insert("status".into(), Value::String("new".into()));
        fields.insert("submitted_at".into(), Value::String(submitted_at.to_rfc3339()));
        fields
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: " Asha ".into(),
            email: "Asha@Example.com".into(),
            phone: "+91 98400-12345".into(),
            subject: String::new(),
            message: "Do you ship to Madurai?".into(),
        }
    }

    #[test]
    fn test_valid_form() {
        let inquiry = ContactInquiry::from_form(&form()).unwrap();
        assert_eq!(inquiry.name, "Asha");
        assert_eq!(inquiry.email.as_str(), "asha@example.com");
        assert_eq!(inquiry.subject, None);
    }

    #[test]
    fn test_rejections() {
        let mut f = form();
        f.name = "  ".into();
        assert_eq!(ContactInquiry::from_form(&f), Err(InquiryError::MissingName));

        let mut f = form();
        f.email = "nope".into();
        assert_eq!(
            ContactInquiry::from_form(&f),
            Err(InquiryError::Email(EmailError::Malformed))
        );

        let mut f = form();
        f.phone = "call me".into();
        assert_eq!(ContactInquiry::from_form(&f), Err(InquiryError::InvalidPhone));

        let mut f = form();
        f.message = String::new();
        assert_eq!(ContactInquiry::from_form(&f), Err(InquiryError::MissingMessage));

        let mut f = form();
        f.message = "x".repeat(MESSAGE_MAX_CHARS + 1);
        assert_eq!(ContactInquiry::from_form(&f), Err(InquiryError::MessageTooLong));
    }

    #[test]
    fn test_into_fields() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let fields = ContactInquiry::from_form(&form()).unwrap().into_fields(at);
        assert_eq!(fields["status"], "new");
        assert_eq!(fields["phone"], "+91 98400-12345");
        assert_eq!(fields["submitted_at"], "2026-03-01T10:00:00+00:00");
        assert!(!fields.contains_key("subject"));
    }
}
