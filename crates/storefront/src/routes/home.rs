//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use toyshop_core::catalog::{AgeBucket, featured_products, filter_pills};
use tracing::instrument;

use super::views::{FilterLink, Layout, ProductCard};
use crate::filters;
use crate::state::AppState;

/// Number of toys in the featured grid.
const FEATURED_LIMIT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    /// Flagged toys, or the first few when none are flagged.
    pub featured: Vec<ProductCard>,
    pub categories: Vec<FilterLink>,
    pub age_groups: Vec<FilterLink>,
}

/// Display the home page.
///
/// Store info, toys and categories are fetched concurrently; each one falls
/// back to an empty value on failure.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog();
    let (info, products, categories) =
        tokio::join!(catalog.store_info(), catalog.products(), catalog.categories());

    let featured = featured_products(&products, FEATURED_LIMIT)
        .into_iter()
        .map(ProductCard::from)
        .collect();

    let categories = filter_pills(&categories)
        .into_iter()
        .map(|c| FilterLink {
            label: c.name.clone(),
            url: format!("/shop?category={}", urlencoding::encode(&c.name)),
            active: false,
        })
        .collect();

    let age_groups = AgeBucket::ALL
        .into_iter()
        .map(|bucket| FilterLink {
            label: bucket.label().to_string(),
            url: format!("/shop?age={}", urlencoding::encode(bucket.id())),
            active: false,
        })
        .collect();

    let config = state.config();
    let layout = Layout::page(
        &state,
        &info,
        "",
        &format!(
            "{} - toys for every age, delivered to your door. Order online or on WhatsApp.",
            config.store_name
        ),
        "/",
    );

    HomeTemplate {
        layout,
        featured,
        categories,
        age_groups,
    }
}
