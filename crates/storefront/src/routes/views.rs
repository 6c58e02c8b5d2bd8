//! View models shared by page templates.
//!
//! Templates only see plain strings and booleans; every optional value is
//! resolved here so the templates need no `if let`.

use toyshop_core::catalog::{AgeDescriptor, Product};
use toyshop_core::seo::PageMetadata;
use toyshop_core::store_info::StoreInfo;

use crate::state::AppState;

/// Footer link to a policy page.
#[derive(Clone)]
pub struct NavLink {
    pub label: String,
    pub url: String,
}

/// Data every page passes to `base.html`.
#[derive(Clone)]
pub struct Layout {
    pub store_name: String,
    pub meta: PageMetadata,
    pub share_image: String,
    pub chat_link: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub hours: String,
    pub footer_links: Vec<NavLink>,
}

impl Layout {
    #[must_use]
    pub fn new(state: &AppState, info: &StoreInfo, meta: PageMetadata) -> Self {
        let footer_links = state
            .content()
            .slugs()
            .into_iter()
            .filter_map(|slug| {
                state.content().get_page(slug).map(|page| NavLink {
                    label: page.meta.title.clone(),
                    url: format!("/pages/{slug}"),
                })
            })
            .collect();

        Self {
            store_name: state.config().store_name.clone(),
            share_image: meta.image.clone().unwrap_or_default(),
            meta,
            chat_link: info.chat_link(),
            phone: info.phone.clone().unwrap_or_default(),
            email: info.email.clone().unwrap_or_default(),
            address: info.address.clone().unwrap_or_default(),
            hours: info.hours.clone().unwrap_or_default(),
            footer_links,
        }
    }

    /// Metadata for a simple page at `path`.
    #[must_use]
    pub fn page(state: &AppState, info: &StoreInfo, title: &str, description: &str, path: &str) -> Self {
        let config = state.config();
        let meta = PageMetadata::new(&config.store_name, title, description, &config.base_url, path);
        Self::new(state, info, meta)
    }
}

/// A toy in a grid.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub url: String,
    pub image: String,
    /// Empty when the toy has no price.
    pub price: String,
    pub category: String,
    pub age_label: String,
    pub in_stock: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            url: format!("/products/{}", urlencoding::encode(product.id.as_str())),
            image: product.primary_image().to_string(),
            price: product.price_label().unwrap_or_default(),
            category: product.category.clone().unwrap_or_default(),
            age_label: age_label(product),
            in_stock: product.in_stock,
        }
    }
}

/// "Ages 3-5" style label, empty when unknown.
#[must_use]
pub fn age_label(product: &Product) -> String {
    match (&product.age, product.age_group.as_deref()) {
        (AgeDescriptor::Unknown, _) | (_, None) => String::new(),
        (_, Some(raw)) => format!("Ages {}", raw.trim()),
    }
}

/// A filter pill or link that toggles one filter.
#[derive(Clone)]
pub struct FilterLink {
    pub label: String,
    pub url: String,
    pub active: bool,
}
