//! Payment provider orders API.
//!
//! Creating an order server-side before the buyer opens the payment sheet
//! is what makes the provider sign its success response, so completions can
//! be verified instead of taken on the browser's word.
//!
//! ```text
//! POST {api_base}/v1/orders  (basic auth key_id:key_secret)
//!   {"amount": 70000, "currency": "INR", "receipt": "<attempt id>", "notes": {...}}
//!   -> {"id": "order_...", ...}
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use toyshop_core::payment::PaymentRequest;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::config::PaymentConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the orders API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

/// Server-side client for the payment provider.
#[derive(Clone)]
pub struct PaymentGateway {
    client: reqwest::Client,
    orders_url: Url,
    key_id: String,
    key_secret: SecretString,
}

impl PaymentGateway {
    /// Client for `config`, or `None` when no key secret is configured.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the API base URL
    /// cannot be joined.
    pub fn from_config(config: &PaymentConfig) -> Result<Option<Self>, GatewayError> {
        let Some(key_secret) = &config.key_secret else {
            return Ok(None);
        };

        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let orders_url = config
            .api_base
            .join("v1/orders")
            .map_err(|e| GatewayError::Parse(format!("Invalid API base: {e}")))?;

        Ok(Some(Self {
            client,
            orders_url,
            key_id: config.key_id.clone(),
            key_secret: key_secret.clone(),
        }))
    }

    /// Secret used to verify payment signatures.
    #[must_use]
    pub fn key_secret(&self) -> &str {
        self.key_secret.expose_secret()
    }

    /// Create a provider order for `request`; the attempt id is the receipt.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response has no id.
    #[instrument(skip(self, request), fields(amount = request.amount))]
    pub async fn create_order(
        &self,
        request: &PaymentRequest,
        attempt_id: Uuid,
    ) -> Result<String, GatewayError> {
        let body = serde_json::json!({
            "amount": request.amount,
            "currency": request.currency.code(),
            "receipt": attempt_id.to_string(),
            "notes": { "attempt_id": attempt_id.to_string() },
        });

        let response = self
            .client
            .post(self.orders_url.clone())
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %message.chars().take(500).collect::<String>(),
                "Payment provider rejected order"
            );
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        tracing::debug!(order_id = %order.id, "Payment order created");
        Ok(order.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use toyshop_core::catalog::Product;
    use toyshop_core::payment::CheckoutForm;
    use toyshop_core::{CurrencyCode, Record};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(api_base: &str, secret: Option<&str>) -> PaymentConfig {
        PaymentConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: secret.map(SecretString::from),
            api_base: Url::parse(api_base).unwrap(),
            checkout_script: "https://checkout.razorpay.com/v1/checkout.js".to_string(),
        }
    }

    fn request() -> PaymentRequest {
        let record: Record =
            serde_json::from_value(json!({"id": "t1", "name": "Rocket", "price": 350})).unwrap();
        let product = Product::from_record(&record, CurrencyCode::INR);
        let form = CheckoutForm {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            quantity: 2,
            ..CheckoutForm::default()
        };
        PaymentRequest::for_product(&product, &form).unwrap()
    }

    #[test]
    fn test_no_secret_means_no_gateway() {
        assert!(
            PaymentGateway::from_config(&config("https://api.razorpay.com", None))
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_order() {
        let server = MockServer::start().await;
        let attempt_id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            // base64("rzp_test_key:kQ7#vN2$pL9@xR4!")
            .and(header(
                "authorization",
                "Basic cnpwX3Rlc3Rfa2V5OmtRNyN2TjIkcEw5QHhSNCE=",
            ))
            .and(body_partial_json(json!({
                "amount": 70000,
                "currency": "INR",
                "receipt": attempt_id.to_string()
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "order_IluGWxBm9U8zJ8", "status": "created"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gateway = PaymentGateway::from_config(&config(&server.uri(), Some("kQ7#vN2$pL9@xR4!")))
            .unwrap()
            .unwrap();
        let order_id = gateway.create_order(&request(), attempt_id).await.unwrap();
        assert_eq!(order_id, "order_IluGWxBm9U8zJ8");
    }

    #[tokio::test]
    async fn test_create_order_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                json!({"error": {"code": "BAD_REQUEST_ERROR", "description": "Authentication failed"}}),
            ))
            .mount(&server)
            .await;

        let gateway = PaymentGateway::from_config(&config(&server.uri(), Some("kQ7#vN2$pL9@xR4!")))
            .unwrap()
            .unwrap();
        let err = gateway.create_order(&request(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Api { status: 401, .. }));
    }
}
