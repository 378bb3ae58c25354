//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use safe_disposal_core::HazardLevel;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Badge class for a hazard level.
///
/// Usage in templates: `{{ product.hazard_level|hazard_class }}`
#[askama::filter_fn]
pub fn hazard_class(level: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    let level = level.to_string().parse().unwrap_or(HazardLevel::Unclassified);
    Ok(badge_class(level))
}

const fn badge_class(level: HazardLevel) -> &'static str {
    match level {
        HazardLevel::Low => "badge badge-secondary",
        HazardLevel::Medium => "badge badge-yellow",
        HazardLevel::High => "badge badge-orange",
        HazardLevel::Critical => "badge badge-destructive",
        HazardLevel::Unclassified => "badge badge-outline",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_class_per_level() {
        assert_eq!(badge_class(HazardLevel::Low), "badge badge-secondary");
        assert_eq!(badge_class(HazardLevel::Critical), "badge badge-destructive");
        assert_eq!(badge_class(HazardLevel::Unclassified), "badge badge-outline");
    }
}
