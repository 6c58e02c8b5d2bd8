//! Card checkout: payment requests and the attempt state machine.
//!
//! The payment provider is opaque. We hand it a [`PaymentRequest`] and it
//! reports back exactly one [`PaymentOutcome`]. A [`CheckoutAttempt`] moves
//! from `Pending` to one terminal status and never leaves it.
//!
//! Outcomes arrive from the buyer's browser. A success is only `verified`
//! when the backend pre-created a provider order and the response carries a
//! valid `razorpay_signature` (HMAC-SHA256 of `"{order_id}|{payment_id}"`
//! keyed with the provider secret). Anything else is client-reported.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::Sha256;
use uuid::Uuid;

use crate::catalog::Product;
use crate::types::{CurrencyCode, Email, EmailError, ToyId};

/// Largest quantity accepted in one checkout.
pub const MAX_QUANTITY: u32 = 10;

/// Reasons a checkout cannot be started or completed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("this toy has no price and can only be ordered on WhatsApp")]
    NotPayable,
    #[error("quantity must be between 1 and {MAX_QUANTITY}")]
    InvalidQuantity,
    #[error("order total is too large")]
    AmountOverflow,
    #[error("please tell us your name")]
    MissingName,
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error("payment response did not include a payment id")]
    MissingPaymentId,
    #[error("payment signature could not be verified")]
    InvalidSignature,
    #[error("checkout attempt is already {0}")]
    AlreadyCompleted(&'static str),
}

/// Checkout form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub color: String,
}

const fn default_quantity() -> u32 {
    1
}

/// Contact details the provider pre-fills in its payment sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// What is sent to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in minor units (paise for INR).
    pub amount: i64,
    pub currency: CurrencyCode,
    pub description: String,
    /// Pre-created provider order, when the backend made one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub prefill: Prefill,
}

impl PaymentRequest {
    /// Build a request for `quantity` units of `product`.
    ///
    /// # Errors
    ///
    /// Fails when the product has no price, the quantity is out of range,
    /// the buyer's name or email is missing/invalid, or the total overflows.
    pub fn for_product(product: &Product, form: &CheckoutForm) -> Result<Self, CheckoutError> {
        let price = product.price.ok_or(CheckoutError::NotPayable)?;
        if !(1..=MAX_QUANTITY).contains(&form.quantity) {
            return Err(CheckoutError::InvalidQuantity);
        }

        let name = form.name.trim();
        if name.is_empty() {
            return Err(CheckoutError::MissingName);
        }
        let email = Email::parse(&form.email)?;

        let amount = price
            .times(form.quantity)
            .minor_units()
            .ok_or(CheckoutError::AmountOverflow)?;

        let color = form.color.trim();
        let mut description = format!("{} x {}", form.quantity, product.name);
        if !color.is_empty() {
            description.push_str(&format!(" ({color})"));
        }

        let phone = form.phone.trim();
        Ok(Self {
            amount,
            currency: price.currency_code,
            description,
            order_id: None,
            prefill: Prefill {
                name: name.to_string(),
                email: email.into_inner(),
                contact: (!phone.is_empty()).then(|| phone.to_string()),
            },
        })
    }

    /// Options object for the provider's browser checkout script.
    #[must_use]
    pub fn provider_options(&self, key_id: &str, merchant_name: &str, attempt_id: Uuid) -> Value {
        let mut options = json!({
            "key": key_id,
            "amount": self.amount,
            "currency": self.currency.code(),
            "name": merchant_name,
            "description": self.description,
            "prefill": self.prefill,
            "notes": { "attempt_id": attempt_id.to_string() },
        });
        if let Some(order_id) = &self.order_id {
            options["order_id"] = Value::String(order_id.clone());
        }
        options
    }
}

/// What the provider reported for an attempt.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success {
        #[serde(default)]
        response: Value,
    },
    Failed {
        #[serde(default)]
        error: Value,
    },
    Cancelled,
}

/// Lifecycle of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AttemptStatus {
    Pending,
    Succeeded {
        /// Provider order, when one was pre-created or reported.
        order_id: Option<String>,
        payment_id: String,
        /// Whether the provider signature was checked.
        verified: bool,
    },
    Failed {
        error: Value,
    },
    Cancelled,
}

impl AttemptStatus {
    /// Lowercase name of the status.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Reference shown to the buyer: the order id, else the payment id.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Succeeded {
                order_id, payment_id, ..
            } => Some(order_id.as_deref().unwrap_or(payment_id)),
            _ => None,
        }
    }
}

/// One try at paying for a product.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutAttempt {
    pub id: Uuid,
    pub product_id: ToyId,
    pub product_name: String,
    pub color: Option<String>,
    pub quantity: u32,
    pub request: PaymentRequest,
    pub status: AttemptStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CheckoutAttempt {
    /// Start a pending attempt.
    #[must_use]
    pub fn start(
        product: &Product,
        form: &CheckoutForm,
        request: PaymentRequest,
        now: DateTime<Utc>,
    ) -> Self {
        let color = form.color.trim();
        Self {
            id: Uuid::new_v4(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            color: (!color.is_empty()).then(|| color.to_string()),
            quantity: form.quantity,
            request,
            status: AttemptStatus::Pending,
            created_at: now,
            completed_at: None,
        }
    }

    /// Apply the provider's outcome.
    ///
    /// `key_secret` is the provider secret. When the attempt has a
    /// pre-created order and a secret is given, a success must carry that
    /// order id and a matching signature. Without a pre-created order the
    /// success is recorded as unverified.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AlreadyCompleted`] if the attempt already has
    /// a terminal status, [`CheckoutError::MissingPaymentId`] for a success
    /// response without a payment id, and [`CheckoutError::InvalidSignature`]
    /// when verification fails. The attempt is unchanged on error.
    pub fn complete(
        &mut self,
        outcome: PaymentOutcome,
        key_secret: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&AttemptStatus, CheckoutError> {
        if self.status.is_terminal() {
            return Err(CheckoutError::AlreadyCompleted(self.status.name()));
        }

        self.status = match outcome {
            PaymentOutcome::Success { response } => self.success(&response, key_secret)?,
            PaymentOutcome::Failed { error } => AttemptStatus::Failed { error },
            PaymentOutcome::Cancelled => AttemptStatus::Cancelled,
        };
        self.completed_at = Some(now);
        Ok(&self.status)
    }

    fn success(
        &self,
        response: &Value,
        key_secret: Option<&str>,
    ) -> Result<AttemptStatus, CheckoutError> {
        let payment_id = response_text(response, &["payment_id", "razorpay_payment_id"])
            .ok_or(CheckoutError::MissingPaymentId)?;
        let reported_order = response_text(response, &["order_id", "razorpay_order_id"]);

        let (Some(order_id), Some(secret)) = (&self.request.order_id, key_secret) else {
            return Ok(AttemptStatus::Succeeded {
                order_id: self.request.order_id.clone().or(reported_order),
                payment_id,
                verified: false,
            });
        };

        if reported_order.as_deref() != Some(order_id.as_str()) {
            return Err(CheckoutError::InvalidSignature);
        }
        let signature = response_text(response, &["razorpay_signature", "signature"])
            .ok_or(CheckoutError::InvalidSignature)?;
        if !verify_signature(secret, order_id, &payment_id, &signature) {
            return Err(CheckoutError::InvalidSignature);
        }

        Ok(AttemptStatus::Succeeded {
            order_id: Some(order_id.clone()),
            payment_id,
            verified: true,
        })
    }
}

type HmacSha256 = Hmac<Sha256>;

fn signature_mac(secret: &str, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Some(mac)
}

/// Hex signature the provider attaches to a successful payment for a
/// pre-created order.
#[must_use]
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    signature_mac(secret, order_id, payment_id)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Constant-time check of a hex `signature`.
#[must_use]
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    signature_mac(secret, order_id, payment_id).is_some_and(|mac| mac.verify_slice(&provided).is_ok())
}

fn response_text(response: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| response.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
