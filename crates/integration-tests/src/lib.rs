//! Integration tests for Toyshop.
//!
//! Each test starts the full storefront router on an ephemeral port, backed
//! by an in-memory record store, and talks to it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p toyshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_routes` - Home, shop filters, product pages, JSON catalog
//! - `contact_form` - Inquiry validation and storage
//! - `checkout_flow` - Card checkout attempts end to end
//! - `variant_generation` - Color variant batch against a seeded store
//! - `dev_seed` - The development fixture loads and renders

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::{Client, Url};
use secrecy::SecretString;
use serde_json::Value;
use tokio::task::JoinHandle;
use toyshop_storefront::build_app;
use toyshop_storefront::config::{PaymentConfig, StorefrontConfig};
use toyshop_storefront::state::AppState;
use toyshop_storefront::store::MemoryRecordStore;

/// A running storefront and a client pointed at it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub store: Arc<MemoryRecordStore>,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Storefront over `seed`, with card checkout disabled.
    pub async fn new(seed: &Value) -> Self {
        Self::start(store_from(seed), None).await
    }

    /// Storefront over `seed`, with a test payment key and no secret, so
    /// outcomes are client-reported.
    pub async fn with_payment(seed: &Value) -> Self {
        Self::start(
            store_from(seed),
            Some(payment_config("https://api.razorpay.com", None)),
        )
        .await
    }

    /// Storefront over `seed` that pre-creates orders at `api_base` and
    /// verifies signatures with `key_secret`.
    pub async fn with_verified_payment(seed: &Value, api_base: &str, key_secret: &str) -> Self {
        Self::start(
            store_from(seed),
            Some(payment_config(api_base, Some(key_secret))),
        )
        .await
    }

    /// Start a server over an existing store.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind or the app cannot be built.
    pub async fn start(store: MemoryRecordStore, payment: Option<PaymentConfig>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let base_url = format!("http://{addr}");

        let mut config = StorefrontConfig::development(&base_url);
        config.payment = payment;

        let store = Arc::new(store);
        let state = AppState::new(config, store.clone()).expect("Failed to build state");
        let app = build_app(state).expect("Failed to build router");

        let server = tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Self {
            client: Client::new(),
            base_url,
            store,
            server,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path`, returning status and body text.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> (u16, String) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        let status = resp.status().as_u16();
        (status, resp.text().await.expect("Failed to read body"))
    }

    /// POST an urlencoded form to `path`, returning status and body text.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> (u16, String) {
        let resp = self
            .client
            .post(self.url(path))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(form_body(fields))
            .send()
            .await
            .expect("POST failed");
        let status = resp.status().as_u16();
        (status, resp.text().await.expect("Failed to read body"))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn payment_config(api_base: &str, key_secret: Option<&str>) -> PaymentConfig {
    PaymentConfig {
        key_id: "rzp_test_key".to_string(),
        key_secret: key_secret.map(SecretString::from),
        api_base: Url::parse(api_base).expect("Invalid payment API base"),
        checkout_script: "https://checkout.razorpay.com/v1/checkout.js".to_string(),
    }
}

fn store_from(seed: &Value) -> MemoryRecordStore {
    MemoryRecordStore::from_seed(seed).expect("Invalid test seed")
}

/// `a=1&b=2`, percent-encoded.
#[must_use]
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Path to the development catalog fixture shipped with the storefront.
#[must_use]
pub fn dev_seed_path() -> PathBuf {
    PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../storefront/fixtures/dev-catalog.json"
    ))
}
