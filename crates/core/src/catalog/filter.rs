//! Multi-criterion catalog filtering.
//!
//! A filter is a conjunction of predicates:
//! - text: every term must appear (case-insensitively) in the title, the
//!   category, or the description
//! - category: exact match, bypassed by the `"all"` sentinel
//! - hazard (products only): exact match on the level, bypassed by `"all"`
//!
//! Results are always an ordered subsequence of the input. Records are only
//! borrowed, never modified.

use super::{Product, Resource};

/// Selector value that disables a predicate.
pub const ALL: &str = "all";

/// Fields the text predicate looks at.
pub trait Searchable {
    /// Name of a product or title of a resource.
    fn title(&self) -> &str;
    fn category(&self) -> &str;
    fn description(&self) -> &str;
}

impl Searchable for Product {
    fn title(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Searchable for Resource {
    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Free-text predicate.
///
/// Built from a single query string, it holds at most one term: the whole
/// trimmed, lowercased query (a substring, not a bag of words). Combining two
/// filters concatenates their terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
    terms: Vec<String>,
}

impl TextQuery {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        Self {
            terms: vec![trimmed.to_lowercase()],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[must_use]
    pub fn matches<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let title = item.title().to_lowercase();
        let category = item.category().to_lowercase();
        let description = item.description().to_lowercase();
        self.terms.iter().all(|term| {
            title.contains(term.as_str())
                || category.contains(term.as_str())
                || description.contains(term.as_str())
        })
    }

    fn combine(&self, other: &Self) -> Self {
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().cloned());
        Self { terms }
    }
}

/// An exact-match selector with an "all" bypass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    #[default]
    All,
    Only(String),
}

impl Selector {
    /// Parse a selector value; blank and `"all"` disable the predicate.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() || raw == ALL {
            Self::All
        } else {
            Self::Only(raw.to_owned())
        }
    }

    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }

    /// Value to put back into a query string or `<select>`.
    #[must_use]
    pub fn as_param(&self) -> &str {
        match self {
            Self::All => ALL,
            Self::Only(value) => value,
        }
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Conjunction of two selectors; `None` when they can never both hold.
    fn combine(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::All, s) | (s, Self::All) => Some(s.clone()),
            (Self::Only(a), Self::Only(b)) if a == b => Some(self.clone()),
            _ => None,
        }
    }
}

/// Filter state for the product search page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub query: TextQuery,
    pub category: Selector,
    pub hazard: Selector,
}

impl ProductFilter {
    /// Build a filter from raw form values.
    #[must_use]
    pub fn new(query: &str, category: &str, hazard: &str) -> Self {
        Self {
            query: TextQuery::parse(query),
            category: Selector::parse(category),
            hazard: Selector::parse(hazard),
        }
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.query.matches(product)
            && self.category.matches(&product.category)
            && self.hazard.matches(product.hazard_level.as_str())
    }

    /// Matching products in input order.
    pub fn apply<'a, I>(&self, products: I) -> Vec<&'a Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }

    /// A filter equivalent to applying `self` then `other`.
    ///
    /// Returns `None` when both pin the same selector to different values.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Option<Self> {
        Some(Self {
            query: self.query.combine(&other.query),
            category: self.category.combine(&other.category)?,
            hazard: self.hazard.combine(&other.hazard)?,
        })
    }

    /// True when no predicate is active.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_empty() && self.category.is_all() && self.hazard.is_all()
    }
}

/// Filter state for the resource library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub query: TextQuery,
    pub category: Selector,
}

impl ResourceFilter {
    #[must_use]
    pub fn new(query: &str, category: &str) -> Self {
        Self {
            query: TextQuery::parse(query),
            category: Selector::parse(category),
        }
    }

    #[must_use]
    pub fn matches(&self, resource: &Resource) -> bool {
        self.query.matches(resource) && self.category.matches(&resource.category)
    }

    pub fn apply<'a, I>(&self, resources: I) -> Vec<&'a Resource>
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        resources.into_iter().filter(|r| self.matches(r)).collect()
    }

    #[must_use]
    pub fn combine(&self, other: &Self) -> Option<Self> {
        Some(Self {
            query: self.query.combine(&other.query),
            category: self.category.combine(&other.category)?,
        })
    }

    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_empty() && self.category.is_all()
    }
}
