//! Markdown policy pages (about, shipping, returns, privacy, terms).
//!
//! Pages are loaded from `<content_dir>/pages/*.md` at startup. Each file
//! starts with YAML frontmatter:
//!
//! ```markdown
//! ---
//! title: Shipping Policy
//! description: How and when we deliver.
//! updated_at: 2025-06-01
//! ---
//! We ship across India...
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Frontmatter of a page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// All loaded pages, shared cheaply between handlers.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load every page under `content_dir/pages`.
    ///
    /// A missing directory yields an empty store; a single unreadable page is
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_page(&path) {
                    Ok(page) => {
                        tracing::info!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
            .to_string();

        let (meta, body) = parse_page(&content)?;

        Ok(Page {
            slug,
            meta,
            content_html: render_markdown(&body),
        })
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Slugs of every loaded page, sorted.
    #[must_use]
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }
}

/// Split frontmatter from the markdown body.
fn parse_page(content: &str) -> Result<(PageMeta, String), ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(content)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;
    Ok((meta, parsed.content))
}

/// Render markdown to HTML with GitHub Flavored Markdown tables and links.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_frontmatter() {
        let (meta, body) = parse_page(
            "---\ntitle: Returns\ndescription: Easy returns\nupdated_at: 2025-06-01\n---\n# Returns\n\nWithin 7 days.\n",
        )
        .unwrap();
        assert_eq!(meta.title, "Returns");
        assert_eq!(meta.description.as_deref(), Some("Easy returns"));
        assert_eq!(meta.updated_at, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert!(body.contains("Within 7 days."));
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        assert!(matches!(
            parse_page("# Just markdown"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_render_markdown() {
        let html = render_markdown("## Delivery\n\n| Zone | Days |\n|---|---|\n| Chennai | 2 |\n");
        assert!(html.contains("<h2"));
        assert!(html.contains("Delivery"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_load_bundled_pages() {
        let store = ContentStore::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("content").as_path()).unwrap();
        assert_eq!(
            store.slugs(),
            vec!["about", "privacy", "returns", "shipping", "terms"]
        );
        assert_eq!(store.get_page("shipping").unwrap().meta.title, "Shipping Policy");
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let store = ContentStore::load(Path::new("/nonexistent/content")).unwrap();
        assert!(store.get_page("about").is_none());
    }
}
