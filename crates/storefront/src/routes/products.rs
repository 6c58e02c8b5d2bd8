//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use toyshop_core::catalog::{DisplayResolution, Product, related_products, resolve_display};
use toyshop_core::messaging::order_message;
use toyshop_core::seo::PageMetadata;
use tracing::instrument;

use super::views::{FilterLink, Layout, ProductCard, age_label};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Related toys shown under the product.
const RELATED_LIMIT: usize = 4;

/// Query parameters for the product page.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub color: Option<String>,
}

/// One gallery image.
#[derive(Clone)]
pub struct GalleryImage {
    pub url: String,
    pub selected: bool,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub category_url: String,
    pub age_label: String,
    pub in_stock: bool,
    pub selected_image: String,
    pub gallery: Vec<GalleryImage>,
    pub color_options: Vec<FilterLink>,
    pub selected_color: String,
    pub order_link: String,
    /// Empty when checkout is disabled or the toy has no price.
    pub checkout_url: String,
    pub related: Vec<ProductCard>,
}

/// The requested color, spelled as the product spells it.
///
/// A color the product does not offer is ignored.
fn chosen_color(resolution: &DisplayResolution, requested: Option<&str>) -> Option<String> {
    let requested = requested.map(str::trim).filter(|c| !c.is_empty())?;
    resolution
        .available_colors
        .iter()
        .find(|c| c.eq_ignore_ascii_case(requested))
        .cloned()
}

fn product_url(product: &Product, color: Option<&str>) -> String {
    let base = format!("/products/{}", urlencoding::encode(product.id.as_str()));
    match color {
        Some(color) => format!("{base}?color={}", urlencoding::encode(color)),
        None => base,
    }
}

/// Display a product.
///
/// `?color=` selects the first gallery image whose URL names the color and
/// pre-selects that color in the order message.
///
/// # Errors
///
/// 404 for an unknown toy, 502 when the record store fails.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse> {
    let catalog = state.catalog();
    let product = catalog
        .product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("toy {id}")))?;

    let (info, products) = tokio::join!(catalog.store_info(), catalog.products());

    let resolution = resolve_display(&product, query.color.as_deref());
    let selected_color = chosen_color(&resolution, query.color.as_deref());

    let gallery = resolution
        .images
        .iter()
        .enumerate()
        .map(|(i, url)| GalleryImage {
            url: url.clone(),
            selected: i == resolution.selected_index,
        })
        .collect();

    let color_options = resolution
        .available_colors
        .iter()
        .map(|color| FilterLink {
            label: color.clone(),
            url: product_url(&product, Some(color)),
            active: selected_color.as_deref() == Some(color.as_str()),
        })
        .collect();

    let order_link = info.chat_link_with(&order_message(&product, selected_color.as_deref()));

    let checkout_url = if state.config().payment.is_some() && product.price.is_some() {
        let base = format!("/checkout/{}", urlencoding::encode(product.id.as_str()));
        match &selected_color {
            Some(color) => format!("{base}?color={}", urlencoding::encode(color)),
            None => base,
        }
    } else {
        String::new()
    };

    let related = related_products(&products, &product, RELATED_LIMIT)
        .into_iter()
        .map(ProductCard::from)
        .collect();

    let config = state.config();
    let meta = PageMetadata::for_product(&config.store_name, &config.base_url, &product);
    let category = product.category.clone().unwrap_or_default();

    Ok(ProductTemplate {
        layout: Layout::new(&state, &info, meta),
        name: product.name.clone(),
        description: product.description.clone().unwrap_or_default(),
        price: product.price_label().unwrap_or_default(),
        category_url: format!("/shop?category={}", urlencoding::encode(category.trim())),
        category,
        age_label: age_label(&product),
        in_stock: product.in_stock,
        selected_image: resolution.selected_image().to_string(),
        gallery,
        color_options,
        selected_color: selected_color.unwrap_or_default(),
        order_link,
        checkout_url,
        related,
    })
}
