//! Static policy pages rendered from markdown.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use super::views::Layout;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub layout: Layout,
    pub title: String,
    pub content_html: String,
    /// "June 1, 2025", or empty.
    pub updated: String,
}

/// Display a content page by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let page = state
        .content()
        .get_page(&slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    let info = state.catalog().store_info().await;
    let description = page.meta.description.clone().unwrap_or_default();
    let layout = Layout::page(
        &state,
        &info,
        &page.meta.title,
        &description,
        &format!("/pages/{slug}"),
    );

    Ok(PageTemplate {
        layout,
        title: page.meta.title.clone(),
        content_html: page.content_html.clone(),
        updated: page
            .meta
            .updated_at
            .map(|d| d.format("%B %-d, %Y").to_string())
            .unwrap_or_default(),
    })
}
