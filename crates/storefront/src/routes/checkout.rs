//! Card checkout.
//!
//! ```text
//! GET  /checkout/{product_id}?color=      - buyer details form
//! POST /checkout/{product_id}             - start an attempt, render the pay page
//! POST /api/checkout/{attempt_id}/complete - provider outcome from the browser
//! GET  /checkout/attempts/{attempt_id}    - result page
//! ```
//!
//! All routes answer 404 when no payment key is configured. With a key
//! secret, `start` pre-creates a provider order and `complete` checks the
//! provider signature. Without one, outcomes are recorded as reported by
//! the browser and the result page says so.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use toyshop_core::catalog::Product;
use toyshop_core::payment::{
    AttemptStatus, CheckoutAttempt, CheckoutError, CheckoutForm, MAX_QUANTITY, PaymentOutcome,
    PaymentRequest,
};
use tracing::instrument;
use uuid::Uuid;

use super::views::Layout;
use crate::config::PaymentConfig;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::services::PaymentGateway;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub product_name: String,
    pub product_url: String,
    pub product_image: String,
    pub unit_price: String,
    pub form_action: String,
    pub form: CheckoutForm,
    pub max_quantity: u32,
    pub error: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout_pay.html")]
pub struct PayTemplate {
    pub layout: Layout,
    pub description: String,
    pub total: String,
    pub script_url: String,
    /// Provider options as JSON, read by `checkout.js` from a data attribute.
    pub options_json: String,
    pub complete_url: String,
    pub result_url: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout_result.html")]
pub struct ResultTemplate {
    pub layout: Layout,
    pub status: String,
    pub heading: String,
    pub detail: String,
    pub product_name: String,
    pub product_url: String,
}

/// JSON answer to a completion.
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub attempt_id: Uuid,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Order id, else payment id, for a success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Whether a success was confirmed by the provider signature.
    pub verified: bool,
    pub redirect: String,
}

fn payment_config(state: &AppState) -> Result<&PaymentConfig> {
    state
        .config()
        .payment
        .as_ref()
        .ok_or_else(|| AppError::NotFound("checkout is not enabled".to_string()))
}

fn product_path(id: &str) -> String {
    format!("/products/{}", urlencoding::encode(id))
}

fn result_path(id: Uuid) -> String {
    format!("/checkout/attempts/{id}")
}

/// Load a product that can be paid for.
async fn payable_product(state: &AppState, id: &str) -> Result<Product> {
    let product = state
        .catalog()
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("toy {id}")))?;
    if product.price.is_none() {
        return Err(CheckoutError::NotPayable.into());
    }
    Ok(product)
}

async fn form_page(
    state: &AppState,
    product: &Product,
    form: CheckoutForm,
    error: String,
) -> CheckoutTemplate {
    let info = state.catalog().store_info().await;
    let layout = Layout::page(
        state,
        &info,
        &format!("Checkout: {}", product.name),
        &format!("Buy {} online.", product.name),
        &format!("/checkout/{}", urlencoding::encode(product.id.as_str())),
    );
    CheckoutTemplate {
        layout,
        product_name: product.name.clone(),
        product_url: product_path(product.id.as_str()),
        product_image: product.primary_image().to_string(),
        unit_price: product.price_label().unwrap_or_default(),
        form_action: format!("/checkout/{}", urlencoding::encode(product.id.as_str())),
        form,
        max_quantity: MAX_QUANTITY,
        error,
    }
}

/// Display the buyer details form.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<CheckoutQuery>,
) -> Result<impl IntoResponse> {
    payment_config(&state)?;
    let product = payable_product(&state, &product_id).await?;
    let form = CheckoutForm {
        quantity: 1,
        color: query.color.unwrap_or_default(),
        ..CheckoutForm::default()
    };
    Ok(form_page(&state, &product, form, String::new()).await)
}

/// Start a checkout attempt and render the pay page.
///
/// Invalid buyer details re-render the form with 422.
#[instrument(skip(state, form))]
pub async fn start(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let payment = payment_config(&state)?;
    let product = payable_product(&state, &product_id).await?;

    let request = match PaymentRequest::for_product(&product, &form) {
        Ok(request) => request,
        Err(e) => {
            let page = form_page(&state, &product, form, e.to_string()).await;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let mut attempt = CheckoutAttempt::start(&product, &form, request, Utc::now());
    let attempt_id = attempt.id;
    if let Some(gateway) = state.payments() {
        let order_id = gateway.create_order(&attempt.request, attempt_id).await?;
        attempt.request.order_id = Some(order_id);
    }
    let config = state.config();
    let options = attempt
        .request
        .provider_options(&payment.key_id, &config.store_name, attempt_id);
    let options_json = serde_json::to_string(&options)
        .map_err(|e| AppError::Internal(format!("serialize payment options: {e}")))?;
    let description = attempt.request.description.clone();
    let total = product
        .price
        .map(|p| p.times(attempt.quantity).to_string())
        .unwrap_or_default();

    state.checkout().insert(attempt).await;
    let attempt_ref = attempt_id.to_string();
    add_breadcrumb(
        "checkout",
        "Checkout attempt started",
        &[("attempt_id", attempt_ref.as_str()), ("toy", product.id.as_str())],
    );
    tracing::info!(%attempt_id, toy = %product.id, "Checkout attempt started");

    let info = state.catalog().store_info().await;
    let layout = Layout::page(
        &state,
        &info,
        "Complete your payment",
        &description,
        &result_path(attempt_id),
    );

    Ok(PayTemplate {
        layout,
        description,
        total,
        script_url: payment.checkout_script.clone(),
        options_json,
        complete_url: format!("/api/checkout/{attempt_id}/complete"),
        result_url: result_path(attempt_id),
    }
    .into_response())
}

/// Record the provider's outcome for an attempt.
///
/// # Errors
///
/// 404 for unknown or expired attempts, 409 when the attempt already has an
/// outcome, 400 for a success without a payment id or with a bad signature.
#[instrument(skip(state, outcome))]
pub async fn complete(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(outcome): Json<PaymentOutcome>,
) -> Result<Json<CompletionResponse>> {
    payment_config(&state)?;
    let key_secret = state.payments().map(PaymentGateway::key_secret);
    let attempt = state
        .checkout()
        .complete(attempt_id, outcome, key_secret)
        .await?;

    let (order_id, verified) = match &attempt.status {
        AttemptStatus::Succeeded {
            order_id, verified, ..
        } => (order_id.clone(), *verified),
        _ => (None, false),
    };
    tracing::info!(
        %attempt_id,
        status = attempt.status.name(),
        verified,
        "Checkout attempt completed"
    );

    Ok(Json(CompletionResponse {
        attempt_id,
        status: attempt.status.name(),
        order_id,
        reference: attempt.status.reference().map(str::to_string),
        verified,
        redirect: result_path(attempt_id),
    }))
}

fn describe(attempt: &CheckoutAttempt) -> (String, String) {
    match &attempt.status {
        AttemptStatus::Pending => (
            "Waiting for payment".to_string(),
            "We haven't heard back from the payment provider yet.".to_string(),
        ),
        AttemptStatus::Succeeded { verified: true, .. } => (
            "Thank you for your order!".to_string(),
            format!(
                "Payment received. Your order reference is {}.",
                attempt.status.reference().unwrap_or_default()
            ),
        ),
        AttemptStatus::Succeeded { .. } => (
            "Thank you for your order!".to_string(),
            format!(
                "Your browser reported a successful payment (reference {}). \
                 We'll confirm it with the payment provider before dispatching.",
                attempt.status.reference().unwrap_or_default()
            ),
        ),
        AttemptStatus::Failed { .. } => (
            "Payment failed".to_string(),
            "Your card was not charged. You can try again or order on WhatsApp.".to_string(),
        ),
        AttemptStatus::Cancelled => (
            "Payment cancelled".to_string(),
            "No payment was taken.".to_string(),
        ),
    }
}

/// Display the result of an attempt.
#[instrument(skip(state))]
pub async fn result(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    payment_config(&state)?;
    let attempt = state
        .checkout()
        .get(attempt_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("checkout attempt {attempt_id}")))?;

    let (heading, detail) = describe(&attempt);
    let info = state.catalog().store_info().await;
    let layout = Layout::page(&state, &info, &heading, &detail, &result_path(attempt_id));

    Ok(ResultTemplate {
        layout,
        status: attempt.status.name().to_string(),
        heading,
        detail,
        product_name: attempt.product_name.clone(),
        product_url: product_path(attempt.product_id.as_str()),
    })
}
