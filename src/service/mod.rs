//! Service layer: business rules between the HTTP handlers and the store.
//!
//! Each service holds an `Arc<dyn Store>` and enforces ownership, role, and
//! lifecycle rules before delegating to the repositories. Services log the
//! state changes they make.

pub mod auth_service;
pub mod content_service;
pub mod credentials;
pub mod media_service;
pub mod offer_service;
pub mod review_service;
pub mod vendor_service;

pub use auth_service::{AuthService, AuthSession, ProfileChanges, Registration};
pub use content_service::ContentService;
pub use credentials::{PasswordHasher, TokenSigner};
pub use media_service::{MediaService, StoredMedia};
pub use offer_service::{OfferDraft, OfferService};
pub use review_service::ReviewService;
pub use vendor_service::{ShopDraft, VendorDraft, VendorService};
