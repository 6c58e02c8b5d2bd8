//! `GET /api/catalog`: the filtered catalog plus the available filter values.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use toyshop_core::catalog::{
    AgeBucket, FilterQuery, FilterSelection, Product, available_colors, filter_pills,
    filter_products,
};
use tracing::instrument;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AgeOption {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub ages: Vec<AgeOption>,
    pub colors: Vec<String>,
}

/// Selection after unknown and `all` values were dropped.
#[derive(Debug, Serialize)]
pub struct AppliedFilters {
    pub category: Option<String>,
    pub age: Option<&'static str>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub count: usize,
    pub products: Vec<Product>,
    pub filters: AppliedFilters,
    pub options: FilterOptions,
}

/// Filtered catalog as JSON. Degrades to an empty catalog like the pages do.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Json<CatalogResponse> {
    let selection = FilterSelection::from(&query);
    let catalog = state.catalog();
    let (products, categories) = tokio::join!(catalog.products(), catalog.categories());

    let filtered: Vec<Product> = filter_products(&products, &selection)
        .into_iter()
        .cloned()
        .collect();

    Json(CatalogResponse {
        count: filtered.len(),
        products: filtered,
        filters: AppliedFilters {
            category: selection.category.clone(),
            age: selection.age.map(|bucket| bucket.id()),
            color: selection.color.clone(),
        },
        options: FilterOptions {
            categories: filter_pills(&categories)
                .into_iter()
                .map(|c| c.name.clone())
                .collect(),
            ages: AgeBucket::ALL
                .into_iter()
                .map(|bucket| AgeOption {
                    id: bucket.id(),
                    label: bucket.label(),
                })
                .collect(),
            colors: available_colors(&products),
        },
    })
}
