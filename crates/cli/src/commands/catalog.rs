//! Catalog commands.
//!
//! # Environment Variables
//!
//! - `SITE_CATALOG_DIR` - Directory with `products.json` and `resources.json`
//!   (same variable the site reads). Unset means the bundled feeds.

use std::io::{self, Write};
use std::path::Path;

use safe_disposal_core::{
    Catalog, CatalogError, Feed, HazardLevel, ProductFilter, ResourceFilter,
};
use thiserror::Error;

/// Errors that can occur while running a catalog command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A feed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A feed did not parse or repeated an id.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Validation found errors.
    #[error("Catalog has {0} error(s)")]
    Invalid(usize),

    /// Output could not be written.
    #[error("Output error: {0}")]
    Output(#[from] io::Error),

    /// Output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load feeds from `dir`, or the bundled feeds when `dir` is `None`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or a feed does not parse.
pub fn load(dir: Option<&Path>) -> Result<Catalog, CommandError> {
    let Some(dir) = dir else {
        tracing::info!("Using bundled catalog");
        return Ok(Catalog::bundled()?);
    };

    let read = |name: &str| {
        let path = dir.join(name);
        std::fs::read_to_string(&path).map_err(|source| CommandError::Read {
            path: path.display().to_string(),
            source,
        })
    };
    tracing::info!(dir = %dir.display(), "Loading catalog");
    Ok(Catalog::from_json(
        &read("products.json")?,
        &read("resources.json")?,
    )?)
}

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The site would show a broken card.
    Error,
    /// The site works but the record is incomplete.
    Warning,
}

/// One problem with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub feed: Feed,
    pub id: String,
    pub message: &'static str,
}

/// Result of [`validate`].
#[derive(Debug, Default)]
pub struct Report {
    pub products: usize,
    pub resources: usize,
    pub findings: Vec<Finding>,
}

impl Report {
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Write a human-readable summary.
    ///
    /// # Errors
    ///
    /// Returns an error if `out` fails.
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        for finding in &self.findings {
            let label = match finding.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            writeln!(
                out,
                "{label}: {} {}: {}",
                finding.feed, finding.id, finding.message
            )?;
        }
        writeln!(
            out,
            "{} products, {} resources, {} error(s), {} warning(s)",
            self.products,
            self.resources,
            self.error_count(),
            self.findings.len() - self.error_count()
        )
    }
}

/// Check every record for fields the site relies on.
///
/// Parse errors and duplicate ids are caught earlier by [`load`].
#[must_use]
pub fn validate(catalog: &Catalog) -> Report {
    let mut findings = Vec::new();
    let mut push = |severity, feed, id: &str, message| {
        findings.push(Finding {
            severity,
            feed,
            id: id.to_owned(),
            message,
        });
    };

    for p in catalog.products() {
        let id = p.id.as_str();
        if p.name.trim().is_empty() {
            push(Severity::Error, Feed::Products, id, "missing name");
        }
        if p.disposal_instructions.trim().is_empty() {
            push(Severity::Error, Feed::Products, id, "missing disposal instructions");
        }
        if p.hazard_level == HazardLevel::Unclassified {
            push(Severity::Warning, Feed::Products, id, "hazard level is not one of low/medium/high/critical");
        }
        if p.category.trim().is_empty() {
            push(Severity::Warning, Feed::Products, id, "missing category");
        }
        if p.image_url.trim().is_empty() {
            push(Severity::Warning, Feed::Products, id, "missing image, default will be shown");
        }
    }

    for r in catalog.resources() {
        let id = r.id.as_str();
        if r.title.trim().is_empty() {
            push(Severity::Error, Feed::Resources, id, "missing title");
        }
        if !r.video_url.starts_with("https://") {
            push(Severity::Error, Feed::Resources, id, "video URL must be https");
        }
        if r.category.trim().is_empty() {
            push(Severity::Warning, Feed::Resources, id, "missing category");
        }
        if r.thumbnail_url.trim().is_empty() {
            push(Severity::Warning, Feed::Resources, id, "missing thumbnail, default will be shown");
        }
    }

    Report {
        products: catalog.products().len(),
        resources: catalog.resources().len(),
        findings,
    }
}

/// Options for [`search`].
#[derive(Debug)]
pub struct Search<'a> {
    pub query: &'a str,
    pub category: &'a str,
    pub hazard: &'a str,
    pub resources: bool,
    pub json: bool,
}

/// Print products (or resources) matching the filter, in catalog order.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn search(catalog: &Catalog, search: &Search<'_>, out: &mut impl Write) -> Result<(), CommandError> {
    if search.resources {
        let filter = ResourceFilter::new(search.query, search.category);
        let found = catalog.search_resources(&filter);
        tracing::info!(matches = found.len(), "Resource search");
        if search.json {
            serde_json::to_writer_pretty(&mut *out, &found)?;
            writeln!(out)?;
        } else {
            for r in found {
                writeln!(out, "{}\t{}\t{}\t{}", r.id, r.category, r.duration, r.title)?;
            }
        }
        return Ok(());
    }

    let filter = ProductFilter::new(search.query, search.category, search.hazard);
    let found = catalog.search_products(&filter);
    tracing::info!(matches = found.len(), "Product search");
    if search.json {
        serde_json::to_writer_pretty(&mut *out, &found)?;
        writeln!(out)?;
    } else {
        for p in found {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                p.id,
                p.hazard_level.label(),
                p.category,
                p.name
            )?;
        }
    }
    Ok(())
}

/// Print distinct categories of both feeds.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn categories(catalog: &Catalog, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Products:")?;
    for category in catalog.product_categories() {
        writeln!(out, "  {category}")?;
    }
    writeln!(out, "Resources:")?;
    for category in catalog.resource_categories() {
        writeln!(out, "  {category}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const PRODUCTS: &str = r#"[
        {"id": "1", "name": "Bleach", "category": "Chemical", "hazard_level": "high",
         "disposal_instructions": "Neutralize first.", "image_url": "https://images.unsplash.com/a"},
        {"id": "2", "name": "Syringe", "category": "Sharps", "hazard_level": "critical",
         "disposal_instructions": "Sharps container only.", "image_url": "https://images.unsplash.com/b"}
    ]"#;

    fn sample() -> Catalog {
        Catalog::from_json(PRODUCTS, "[]").unwrap()
    }

    fn run_search(search: &Search<'_>) -> String {
        let mut out = Vec::new();
        super::search(&sample(), search, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bundled_catalog_validates() {
        let report = validate(&Catalog::bundled().unwrap());
        assert!(!report.has_errors(), "{:?}", report.findings);
    }

    #[test]
    fn test_validate_flags_incomplete_records() {
        let catalog = Catalog::from_json(
            r#"[{"id": "p1", "name": "", "hazard_level": "extreme"}]"#,
            r#"[{"id": "r1", "title": "Intro", "video_url": "http://example.org/v"}]"#,
        )
        .unwrap();
        let report = validate(&catalog);

        // missing name, missing instructions, insecure video URL
        assert_eq!(report.error_count(), 3);
        assert!(report.findings.iter().any(|f| f.id == "p1"
            && f.severity == Severity::Warning
            && f.message.starts_with("hazard level")));

        let mut out = Vec::new();
        report.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("error: resources r1: video URL must be https"));
        assert!(text.ends_with("1 products, 1 resources, 3 error(s), 5 warning(s)\n"));
    }

    #[test]
    fn test_search_by_category() {
        let text = run_search(&Search {
            query: "",
            category: "Sharps",
            hazard: "all",
            resources: false,
            json: false,
        });
        assert_eq!(text, "2\tCritical\tSharps\tSyringe\n");
    }

    #[test]
    fn test_search_json_output() {
        let text = run_search(&Search {
            query: "BLEACH",
            category: "all",
            hazard: "all",
            resources: false,
            json: true,
        });
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));
        assert_eq!(parsed[0]["name"], "Bleach");
    }

    #[test]
    fn test_load_missing_dir_reports_path() {
        let err = load(Some(Path::new("/nonexistent/catalog"))).unwrap_err();
        assert!(err.to_string().contains("products.json"));
    }
}
