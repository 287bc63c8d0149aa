//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::persistence::Store;
use crate::service::{
    AuthService, ContentService, MediaService, OfferService, PasswordHasher, ReviewService,
    TokenSigner, VendorService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Accounts, tokens, and admin user management.
    pub auth: Arc<AuthService>,
    /// Offer discovery, publishing, and favorites.
    pub offers: Arc<OfferService>,
    /// Vendor profiles, shops, and followers.
    pub vendors: Arc<VendorService>,
    /// Vendor reviews.
    pub reviews: Arc<ReviewService>,
    /// Cities, categories, pages, and settings.
    pub content: Arc<ContentService>,
    /// File uploads.
    pub media: Arc<MediaService>,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires every service to `store` using `config`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self::with_hasher(store, config, PasswordHasher::default())
    }

    /// Like [`AppState::new`] with an explicit password hasher, so tests can
    /// use cheap digests.
    #[must_use]
    pub fn with_hasher(store: Arc<dyn Store>, config: &AppConfig, hasher: PasswordHasher) -> Self {
        let signer = TokenSigner::new(config.token_secret.as_bytes(), config.token_ttl_secs);
        Self {
            auth: Arc::new(AuthService::new(Arc::clone(&store), hasher, signer)),
            offers: Arc::new(OfferService::new(Arc::clone(&store))),
            vendors: Arc::new(VendorService::new(Arc::clone(&store))),
            reviews: Arc::new(ReviewService::new(Arc::clone(&store))),
            content: Arc::new(ContentService::new(store)),
            media: Arc::new(MediaService::new(config.upload_dir.clone())),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
