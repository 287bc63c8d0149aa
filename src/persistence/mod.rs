//! Persistence layer: the repository traits and their two implementations.
//!
//! [`Store`] bundles one repository trait per aggregate. The concrete
//! implementations are [`postgres::PgStore`] (async PostgreSQL through
//! `sqlx::PgPool`) and [`memory::MemoryStore`] (process-local tables used by
//! tests and by DB-less runs with `PERSISTENCE_ENABLED=false`).
//!
//! Stores own the derived counters: creating or deleting reviews refreshes
//! the vendor's `rating` and `review_count`, following or unfollowing
//! refreshes `follower_count`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, City, NewCategory, NewCity, NewOffer, NewReview, NewShop, NewUser, NewVendor,
    Offer, OfferListing, OfferPatch, OfferQuery, Page, PageRequest, Paged, Review,
    ReviewListing, Setting, Shop, User, UserPatch, Vendor, VendorFilter, VendorPatch,
    VendorStatus,
};
use crate::error::ApiError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] when the email is taken.
    async fn create_user(&self, new: NewUser) -> Result<User, ApiError>;

    /// Loads a user by id.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    /// Loads a user by (lowercase) email.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the user does not exist.
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, ApiError>;

    /// Lists users newest first, optionally matching name or email.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_users(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paged<User>, ApiError>;

    /// Deletes a user and everything they own.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the user does not exist.
    async fn delete_user(&self, id: Uuid) -> Result<(), ApiError>;
}

/// City and category storage.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Inserts a city.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] when the name is taken.
    async fn create_city(&self, new: NewCity) -> Result<City, ApiError>;

    /// Lists cities by name.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_cities(&self) -> Result<Vec<City>, ApiError>;

    /// Loads a city by id.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn get_city(&self, id: Uuid) -> Result<Option<City>, ApiError>;

    /// Inserts a category.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] when the slug is taken.
    async fn create_category(&self, new: NewCategory) -> Result<Category, ApiError>;

    /// Lists categories by name.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;

    /// Loads a category by id.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, ApiError>;
}

/// Vendor, shop, and follower storage.
#[async_trait]
pub trait VendorRepository: Send + Sync {
    /// Inserts a pending vendor.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] when the user already owns a vendor.
    async fn create_vendor(&self, new: NewVendor) -> Result<Vendor, ApiError>;

    /// Loads a vendor by id.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn get_vendor(&self, id: Uuid) -> Result<Option<Vendor>, ApiError>;

    /// Loads the vendor owned by a user.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn find_vendor_by_user(&self, user_id: Uuid) -> Result<Option<Vendor>, ApiError>;

    /// Lists vendors newest first.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_vendors(
        &self,
        filter: &VendorFilter,
        page: PageRequest,
    ) -> Result<Paged<Vendor>, ApiError>;

    /// Applies a partial profile update.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the vendor does not exist.
    async fn update_vendor(&self, id: Uuid, patch: VendorPatch) -> Result<Vendor, ApiError>;

    /// Sets the moderation state.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the vendor does not exist.
    async fn set_vendor_status(&self, id: Uuid, status: VendorStatus)
    -> Result<Vendor, ApiError>;

    /// Inserts a shop.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn create_shop(&self, new: NewShop) -> Result<Shop, ApiError>;

    /// Loads a shop by id.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn get_shop(&self, id: Uuid) -> Result<Option<Shop>, ApiError>;

    /// Lists a vendor's shops by name.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_shops(&self, vendor_id: Uuid) -> Result<Vec<Shop>, ApiError>;

    /// Records that a user follows a vendor. Returns `false` if already
    /// following.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn follow_vendor(&self, user_id: Uuid, vendor_id: Uuid) -> Result<bool, ApiError>;

    /// Removes a follow. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn unfollow_vendor(&self, user_id: Uuid, vendor_id: Uuid) -> Result<bool, ApiError>;
}

/// Offer and favorite storage.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Inserts an offer.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn create_offer(&self, new: NewOffer) -> Result<Offer, ApiError>;

    /// Loads an offer by id, regardless of visibility.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn get_offer(&self, id: Uuid) -> Result<Option<Offer>, ApiError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the offer does not exist.
    async fn update_offer(&self, id: Uuid, patch: OfferPatch) -> Result<Offer, ApiError>;

    /// Deletes an offer and its favorites.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the offer does not exist.
    async fn delete_offer(&self, id: Uuid) -> Result<(), ApiError>;

    /// Adds one to the offer's view counter and returns the new count.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the offer does not exist.
    async fn increment_views(&self, id: Uuid) -> Result<i64, ApiError>;

    /// Runs a discovery query.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn search_offers(&self, query: &OfferQuery) -> Result<Paged<OfferListing>, ApiError>;

    /// Lists offers newest first regardless of visibility, optionally for one
    /// vendor. Used by vendor dashboards and admins.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_offers(
        &self,
        vendor_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Paged<Offer>, ApiError>;

    /// Saves an offer to a user's favorites. Returns `false` if already saved.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn add_favorite(&self, user_id: Uuid, offer_id: Uuid) -> Result<bool, ApiError>;

    /// Removes a favorite. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn remove_favorite(&self, user_id: Uuid, offer_id: Uuid) -> Result<bool, ApiError>;

    /// Lists a user's favorite offers, most recently saved first.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_favorites(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paged<Offer>, ApiError>;
}

/// Review storage.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Inserts a review and refreshes the vendor's rating aggregate.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] when the user already reviewed the vendor.
    async fn create_review(&self, new: NewReview) -> Result<Review, ApiError>;

    /// Loads a review by id.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn get_review(&self, id: Uuid) -> Result<Option<Review>, ApiError>;

    /// Lists reviews newest first, optionally for one vendor.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_reviews(
        &self,
        vendor_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Paged<ReviewListing>, ApiError>;

    /// Deletes a review and refreshes the vendor's rating aggregate.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the review does not exist.
    async fn delete_review(&self, id: Uuid) -> Result<(), ApiError>;
}

/// Page and setting storage.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Lists pages by slug.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_pages(&self) -> Result<Vec<Page>, ApiError>;

    /// Loads a page by slug.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn get_page(&self, slug: &str) -> Result<Option<Page>, ApiError>;

    /// Creates or replaces a page.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn upsert_page(&self, slug: &str, title: &str, content: &str)
    -> Result<Page, ApiError>;

    /// Deletes a page. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn delete_page(&self, slug: &str) -> Result<bool, ApiError>;

    /// Lists settings by key.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn list_settings(&self) -> Result<Vec<Setting>, ApiError>;

    /// Creates or replaces a setting.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<Setting, ApiError>;
}

/// Everything the services need from storage.
pub trait Store:
    UserRepository
    + CatalogRepository
    + VendorRepository
    + OfferRepository
    + ReviewRepository
    + ContentRepository
    + std::fmt::Debug
{
}

impl<T> Store for T where
    T: UserRepository
        + CatalogRepository
        + VendorRepository
        + OfferRepository
        + ReviewRepository
        + ContentRepository
        + std::fmt::Debug
{
}
