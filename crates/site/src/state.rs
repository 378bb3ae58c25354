//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;

use safe_disposal_core::{Catalog, CatalogError, Feed};

use crate::config::SiteConfig;
use crate::content::{ContentError, ContentStore};
use crate::services::{
    FeedbackClient, FeedbackError, ProfileGateway, SessionGateway, WishlistGateway,
};
use crate::supabase::{BackendError, SupabaseClient};

/// Errors building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("failed to read {feed} feed from {path}: {source}")]
    CatalogFile {
        feed: Feed,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("content: {0}")]
    Content(#[from] ContentError),
    #[error("supabase client: {0}")]
    Backend(#[from] BackendError),
    #[error("feedback client: {0}")]
    Feedback(#[from] FeedbackError),
}

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    catalog: Arc<Catalog>,
    content: ContentStore,
    supabase: SupabaseClient,
    sessions: SessionGateway<SupabaseClient>,
    wishlist: WishlistGateway<SupabaseClient>,
    profiles: ProfileGateway,
    feedback: Option<FeedbackClient>,
}

impl AppState {
    /// Create the application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `catalog` - Loaded catalog store
    /// * `content_dir` - Directory holding `pages/*.md`
    ///
    /// # Errors
    ///
    /// Returns an error if content cannot be read or an HTTP client fails to
    /// build.
    pub fn new(config: SiteConfig, catalog: Catalog, content_dir: &Path) -> Result<Self, StateError> {
        let catalog = Arc::new(catalog);
        let content = ContentStore::load(content_dir)?;
        let supabase = SupabaseClient::new(&config.supabase)?;
        let feedback = config
            .feedback
            .as_ref()
            .map(FeedbackClient::new)
            .transpose()?;
        if feedback.is_none() {
            tracing::warn!("FEEDBACK_ACCESS_KEY not set, feedback form disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                sessions: SessionGateway::new(supabase.clone()),
                wishlist: WishlistGateway::new(supabase.clone(), Arc::clone(&catalog)),
                profiles: ProfileGateway::new(supabase.clone()),
                config,
                catalog,
                content,
                supabase,
                feedback,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Raw client, for readiness checks.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionGateway<SupabaseClient> {
        &self.inner.sessions
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistGateway<SupabaseClient> {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileGateway {
        &self.inner.profiles
    }

    /// Feedback relay, `None` when not configured.
    #[must_use]
    pub fn feedback(&self) -> Option<&FeedbackClient> {
        self.inner.feedback.as_ref()
    }
}

/// Load the catalog from `dir` if given, else the bundled feeds.
///
/// # Errors
///
/// Returns an error if a feed file cannot be read or does not validate.
pub fn load_catalog(dir: Option<&Path>) -> Result<Catalog, StateError> {
    let Some(dir) = dir else {
        return Ok(Catalog::bundled()?);
    };
    let read = |feed: Feed, name: &str| {
        let path = dir.join(name);
        std::fs::read_to_string(&path).map_err(|source| StateError::CatalogFile {
            feed,
            path: path.display().to_string(),
            source,
        })
    };
    let products = read(Feed::Products, "products.json")?;
    let resources = read(Feed::Resources, "resources.json")?;
    Ok(Catalog::from_json(&products, &resources)?)
}
