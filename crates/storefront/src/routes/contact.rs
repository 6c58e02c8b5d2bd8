//! Contact page and form submission.
//!
//! Every outcome re-renders the same page: the form with an error banner
//! (input kept) or a thank-you message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use toyshop_core::Collection;
use toyshop_core::inquiry::{ContactForm, ContactInquiry};
use tracing::instrument;

use super::views::Layout;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::state::AppState;

/// Shown when the record store rejects the write.
const STORE_FAILURE_MESSAGE: &str =
    "We couldn't send your message right now. Please try again, or reach us on WhatsApp.";

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub form: ContactForm,
    /// Empty when there is nothing to report.
    pub error: String,
    pub submitted: bool,
}

async fn render(state: &AppState, form: ContactForm, error: String, submitted: bool) -> ContactTemplate {
    let info = state.catalog().store_info().await;
    let layout = Layout::page(
        state,
        &info,
        "Contact Us",
        "Questions about a toy, an order or a delivery? Send us a message.",
        "/contact",
    );
    ContactTemplate {
        layout,
        form,
        error,
        submitted,
    }
}

/// Display the contact form.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    render(&state, ContactForm::default(), String::new(), false).await
}

/// Validate and store a contact inquiry.
///
/// Validation errors answer 422 and store failures 503, both with the
/// form re-rendered around the submitted values.
#[instrument(skip(state, form))]
pub async fn submit(State(state): State<AppState>, Form(form): Form<ContactForm>) -> Response {
    let inquiry = match ContactInquiry::from_form(&form) {
        Ok(inquiry) => inquiry,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected contact form");
            let page = render(&state, form, e.to_string(), false).await;
            return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
        }
    };

    add_breadcrumb("contact", "Contact form submitted", &[]);

    match state
        .store()
        .create(Collection::ContactInquiries, inquiry.into_fields(Utc::now()))
        .await
    {
        Ok(record) => {
            tracing::info!(inquiry_id = %record.id, "Stored contact inquiry");
            render(&state, ContactForm::default(), String::new(), true)
                .await
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store contact inquiry");
            let page = render(&state, form, STORE_FAILURE_MESSAGE.to_string(), false).await;
            (StatusCode::SERVICE_UNAVAILABLE, page).into_response()
        }
    }
}
