//! Catalog page: category, age and color filters over the full toy list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use toyshop_core::catalog::{
    AgeBucket, Category, FilterQuery, FilterSelection, Product, available_colors, filter_pills,
    filter_products,
};
use toyshop_core::seo::PageMetadata;
use tracing::instrument;

use super::views::{FilterLink, Layout, ProductCard};
use crate::filters;
use crate::state::AppState;

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub layout: Layout,
    pub heading: String,
    pub products: Vec<ProductCard>,
    pub result_count: usize,
    pub categories: Vec<FilterLink>,
    pub age_groups: Vec<FilterLink>,
    pub colors: Vec<FilterLink>,
    pub has_filters: bool,
}

fn shop_url(selection: &FilterSelection) -> String {
    format!("/shop{}", selection.query_string())
}

/// "All" pill followed by the active categories in display order.
pub(crate) fn category_links(categories: &[Category], selection: &FilterSelection) -> Vec<FilterLink> {
    let all = FilterLink {
        label: "All".to_string(),
        url: shop_url(&FilterSelection {
            category: None,
            ..selection.clone()
        }),
        active: selection.category.is_none(),
    };

    std::iter::once(all)
        .chain(filter_pills(categories).into_iter().map(|c| FilterLink {
            label: c.name.clone(),
            url: shop_url(&selection.toggle_category(&c.name)),
            active: selection
                .category
                .as_deref()
                .is_some_and(|s| s.trim().eq_ignore_ascii_case(c.name.trim())),
        }))
        .collect()
}

pub(crate) fn age_links(selection: &FilterSelection) -> Vec<FilterLink> {
    AgeBucket::ALL
        .into_iter()
        .map(|bucket| FilterLink {
            label: bucket.label().to_string(),
            url: shop_url(&selection.toggle_age(bucket)),
            active: selection.age == Some(bucket),
        })
        .collect()
}

pub(crate) fn color_links(products: &[Product], selection: &FilterSelection) -> Vec<FilterLink> {
    available_colors(products)
        .into_iter()
        .map(|color| FilterLink {
            url: shop_url(&selection.toggle_color(&color)),
            active: selection
                .color
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(&color)),
            label: color,
        })
        .collect()
}

/// Display the filtered catalog.
///
/// Unknown or `all` filter values are ignored. The color list is built from
/// the whole catalog, not the filtered result, so a filter can always be
/// switched to another color.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let selection = FilterSelection::from(&query);
    let catalog = state.catalog();
    let (info, products, categories) =
        tokio::join!(catalog.store_info(), catalog.products(), catalog.categories());

    let filtered: Vec<ProductCard> = filter_products(&products, &selection)
        .into_iter()
        .map(ProductCard::from)
        .collect();

    let config = state.config();
    let meta = PageMetadata::for_catalog(&config.store_name, &config.base_url, &selection);
    let heading = meta
        .title
        .split(" | ")
        .next()
        .unwrap_or("Shop")
        .to_string();

    ShopTemplate {
        layout: Layout::new(&state, &info, meta),
        heading,
        result_count: filtered.len(),
        products: filtered,
        categories: category_links(&categories, &selection),
        age_groups: age_links(&selection),
        colors: color_links(&products, &selection),
        has_filters: !selection.is_empty(),
    }
}
