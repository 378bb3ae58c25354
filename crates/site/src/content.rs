//! Markdown content pages.
//!
//! Pages live in `content/pages/*.md` with YAML frontmatter and are rendered
//! to HTML once at startup. The slug is the file stem (`about.md` -> `about`).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// A titled card shown under a page body.
#[derive(Debug, Clone, Deserialize)]
pub struct Highlight {
    pub title: String,
    pub text: String,
}

/// Page frontmatter.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

/// A rendered page.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// All loaded pages, keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load every page under `<content_dir>/pages`.
    ///
    /// A missing directory yields an empty store; a page that fails to parse
    /// is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "Pages directory does not exist");
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;
        for path in entries.flatten().map(|entry| entry.path()) {
            if !path.extension().is_some_and(|ext| ext == "md") {
                continue;
            }
            let slug = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned);
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| ContentError::Io(e.to_string()))
                .and_then(|source| match slug {
                    Some(slug) => parse_page(slug, &source),
                    None => Err(ContentError::Parse("Invalid filename".to_string())),
                });
            match loaded {
                Ok(page) => {
                    tracing::info!(slug = %page.slug, "Loaded page");
                    pages.insert(page.slug.clone(), page);
                }
                Err(e) => tracing::error!(path = %path.display(), error = %e, "Failed to load page"),
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    #[must_use]
    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Parse frontmatter and render the body of one page.
fn parse_page(slug: String, source: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug,
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown with the GFM extensions the content uses.
///
/// Raw HTML in the source is escaped.
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

    const SAMPLE: &str = "---\ntitle: About Us\ndescription: Who we are\nhighlights:\n  - title: Our Mission\n    text: Promote safe disposal\n---\nWe handle **sharps** safely.\n";

    #[test]
    fn test_parse_page_reads_frontmatter() {
        let page = parse_page("about".to_string(), SAMPLE).unwrap();
        assert_eq!(page.meta.title, "About Us");
        assert_eq!(page.meta.description.as_deref(), Some("Who we are"));
        assert_eq!(page.meta.highlights.len(), 1);
        assert!(page.content_html.contains("<strong>sharps</strong>"));
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        assert!(parse_page("x".to_string(), "just text").is_err());
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let page = parse_page("x".to_string(), "---\ntitle: X\n---\n<script>alert(1)</script>\n").unwrap();
        assert!(!page.content_html.contains("<script>"));
    }

    #[test]
    fn test_bundled_about_page_loads() {
        let store = ContentStore::load(Path::new(crate::CONTENT_DIR)).unwrap();
        let about = store.page("about").unwrap();
        assert_eq!(about.meta.title, "About Us");
        assert_eq!(about.meta.highlights.len(), 3);
    }
}
