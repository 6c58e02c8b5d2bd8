//! Store contact details (singleton `storeinformation` record).

use serde::Serialize;

use crate::messaging::{GENERAL_ENQUIRY_MESSAGE, build_messaging_link};
use crate::record::Record;

/// Contact details shown in the header, footer and contact page.
///
/// Every field is optional; pages render without them when the record is
/// missing or the fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreInfo {
    pub phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hours: Option<String>,
}

impl StoreInfo {
    /// Decode from the first `storeinformation` record.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let text = |key: &str| record.text(key).map(str::to_string);
        Self {
            phone: text("phone"),
            whatsapp_number: text("whatsapp_number").or_else(|| text("whatsapp")),
            email: text("email"),
            address: text("address"),
            hours: text("hours").or_else(|| text("business_hours")),
        }
    }

    /// Number for WhatsApp links: the dedicated number, else the phone.
    #[must_use]
    pub fn chat_number(&self) -> Option<&str> {
        self.whatsapp_number.as_deref().or(self.phone.as_deref())
    }

    /// Chat link with the general enquiry message.
    #[must_use]
    pub fn chat_link(&self) -> String {
        build_messaging_link(self.chat_number(), Some(GENERAL_ENQUIRY_MESSAGE))
    }

    /// Chat link with a custom message.
    #[must_use]
    pub fn chat_link_with(&self, message: &str) -> String {
        build_messaging_link(self.chat_number(), Some(message))
    }
}
