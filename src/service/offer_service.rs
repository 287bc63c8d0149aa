//! Offer discovery, publishing, moderation, and favorites.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    NewOffer, Offer, OfferListing, OfferPatch, OfferQuery, OfferQueryInput, OfferValue,
    PageRequest, Paged, User, UserRole, Vendor, VendorStatus,
};
use crate::error::ApiError;
use crate::persistence::Store;

/// Validated offer input from a vendor.
#[derive(Debug, Clone)]
pub struct OfferDraft {
    /// Visibility city; defaults to the vendor's city.
    pub city_id: Option<Uuid>,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Optional branch of the publishing vendor.
    pub shop_id: Option<Uuid>,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: Option<String>,
    /// Image URL.
    pub image_url: Option<String>,
    /// Type-specific value.
    pub value: OfferValue,
    /// Optional end of validity; must be in the future.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Offer operations over the store.
#[derive(Debug, Clone)]
pub struct OfferService {
    store: Arc<dyn Store>,
}

impl OfferService {
    /// Creates the service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Runs a discovery query.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] listing every invalid parameter, before any
    /// storage access.
    pub async fn discover(
        &self,
        input: OfferQueryInput,
    ) -> Result<(Paged<OfferListing>, PageRequest), ApiError> {
        let query = OfferQuery::parse(input, Utc::now()).map_err(ApiError::Validation)?;
        let page = self.store.search_offers(&query).await?;
        Ok((page, query.page))
    }

    /// Publishes an offer for the caller's approved vendor.
    ///
    /// # Errors
    ///
    /// [`ApiError::Forbidden`] unless the caller owns an approved vendor;
    /// [`ApiError::Validation`] for unknown references, a blank title, or a
    /// past expiry.
    pub async fn create(&self, owner: &User, draft: OfferDraft) -> Result<Offer, ApiError> {
        let vendor = self.approved_vendor_of(owner).await?;

        let mut errors = Vec::new();
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            errors.push("title must not be empty".to_string());
        }
        if let Some(at) = draft.expires_at
            && at <= Utc::now()
        {
            errors.push("expires_at must be in the future".to_string());
        }
        let city_id = draft.city_id.unwrap_or(vendor.city_id);
        if self.store.get_city(city_id).await?.is_none() {
            errors.push(format!("city_id {city_id} does not exist"));
        }
        if let Some(category_id) = draft.category_id
            && self.store.get_category(category_id).await?.is_none()
        {
            errors.push(format!("category_id {category_id} does not exist"));
        }
        if let Some(shop_id) = draft.shop_id {
            let owned = self
                .store
                .get_shop(shop_id)
                .await?
                .is_some_and(|s| s.vendor_id == vendor.id);
            if !owned {
                errors.push(format!("shop_id {shop_id} is not a branch of this vendor"));
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let offer = self
            .store
            .create_offer(NewOffer {
                vendor_id: vendor.id,
                city_id,
                category_id: draft.category_id,
                shop_id: draft.shop_id,
                title,
                description: draft.description,
                image_url: draft.image_url,
                value: draft.value,
                expires_at: draft.expires_at,
            })
            .await?;
        tracing::info!(
            offer_id = %offer.id,
            vendor_id = %vendor.id,
            offer_type = %offer.offer_type,
            "offer created"
        );
        Ok(offer)
    }

    /// Loads a discoverable offer and counts the view.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the offer does not exist, is inactive or
    /// expired, or its vendor is not approved.
    pub async fn view(&self, id: Uuid) -> Result<OfferListing, ApiError> {
        let missing = || ApiError::not_found("offer", id);
        let mut offer = self.store.get_offer(id).await?.ok_or_else(missing)?;
        let vendor = self
            .store
            .get_vendor(offer.vendor_id)
            .await?
            .ok_or_else(missing)?;
        if vendor.status != VendorStatus::Approved || !offer.is_live(Utc::now()) {
            return Err(missing());
        }
        offer.views = self.store.increment_views(id).await?;
        Ok(OfferListing {
            offer,
            vendor_name: vendor.business_name,
            distance_km: None,
        })
    }

    /// Offers of the caller's vendor in any state, newest first.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the caller has no vendor.
    pub async fn list_mine(&self, owner: &User, page: PageRequest) -> Result<Paged<Offer>, ApiError> {
        let vendor = self
            .store
            .find_vendor_by_user(owner.id)
            .await?
            .ok_or_else(|| ApiError::not_found("vendor for user", owner.id))?;
        self.store.list_offers(Some(vendor.id), page).await
    }

    /// Every offer, newest first, for moderation.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_all(&self, page: PageRequest) -> Result<Paged<Offer>, ApiError> {
        self.store.list_offers(None, page).await
    }

    /// Edits an offer owned by the caller. The featured flag is reserved for
    /// admins and ignored here.
    ///
    /// # Errors
    ///
    /// [`ApiError::Forbidden`] when the caller does not own the offer;
    /// [`ApiError::Validation`] for a blank title, unknown category, or past
    /// expiry.
    pub async fn update(
        &self,
        owner: &User,
        id: Uuid,
        mut patch: OfferPatch,
    ) -> Result<Offer, ApiError> {
        let offer = self.owned_offer(owner, id).await?;
        patch.is_featured = None;

        let mut errors = Vec::new();
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push("title must not be empty".to_string());
        }
        if let Some(at) = patch.expires_at
            && at <= Utc::now()
        {
            errors.push("expires_at must be in the future".to_string());
        }
        if let Some(category_id) = patch.category_id
            && self.store.get_category(category_id).await?.is_none()
        {
            errors.push(format!("category_id {category_id} does not exist"));
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        patch.title = patch.title.map(|t| t.trim().to_string());

        self.store.update_offer(offer.id, patch).await
    }

    /// Toggles the admin-controlled flags.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown offer.
    pub async fn moderate(
        &self,
        id: Uuid,
        is_featured: Option<bool>,
        is_active: Option<bool>,
    ) -> Result<Offer, ApiError> {
        let offer = self
            .store
            .update_offer(
                id,
                OfferPatch {
                    is_featured,
                    is_active,
                    ..OfferPatch::default()
                },
            )
            .await?;
        tracing::info!(
            offer_id = %id,
            is_featured = offer.is_featured,
            is_active = offer.is_active,
            "offer moderated"
        );
        Ok(offer)
    }

    /// Deletes an offer. Owners delete their own; admins delete any.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown offer; [`ApiError::Forbidden`]
    /// for anyone else.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), ApiError> {
        if actor.role != UserRole::Admin {
            self.owned_offer(actor, id).await?;
        }
        self.store.delete_offer(id).await?;
        tracing::info!(offer_id = %id, deleted_by = %actor.id, "offer deleted");
        Ok(())
    }

    /// Saves an offer to the caller's favorites. Saving twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown offer.
    pub async fn add_favorite(&self, user_id: Uuid, offer_id: Uuid) -> Result<(), ApiError> {
        if self.store.get_offer(offer_id).await?.is_none() {
            return Err(ApiError::not_found("offer", offer_id));
        }
        self.store.add_favorite(user_id, offer_id).await?;
        Ok(())
    }

    /// Removes an offer from the caller's favorites. Removing twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn remove_favorite(&self, user_id: Uuid, offer_id: Uuid) -> Result<(), ApiError> {
        self.store.remove_favorite(user_id, offer_id).await?;
        Ok(())
    }

    /// The caller's favorites, most recently saved first.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn favorites(&self, user_id: Uuid, page: PageRequest) -> Result<Paged<Offer>, ApiError> {
        self.store.list_favorites(user_id, page).await
    }

    async fn approved_vendor_of(&self, owner: &User) -> Result<Vendor, ApiError> {
        let vendor = self
            .store
            .find_vendor_by_user(owner.id)
            .await?
            .ok_or_else(|| ApiError::Forbidden("only vendors can publish offers".to_string()))?;
        if vendor.status != VendorStatus::Approved {
            return Err(ApiError::Forbidden(format!(
                "vendor is {}; only approved vendors can publish offers",
                vendor.status
            )));
        }
        Ok(vendor)
    }

    async fn owned_offer(&self, owner: &User, id: Uuid) -> Result<Offer, ApiError> {
        let offer = self
            .store
            .get_offer(id)
            .await?
            .ok_or_else(|| ApiError::not_found("offer", id))?;
        let owns = self
            .store
            .find_vendor_by_user(owner.id)
            .await?
            .is_some_and(|v| v.id == offer.vendor_id);
        if !owns {
            return Err(ApiError::Forbidden(
                "only the publishing vendor may change this offer".to_string(),
            ));
        }
        Ok(offer)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{City, GeoPoint, VendorPatch};
    use crate::persistence::MemoryStore;
    use crate::service::vendor_service::VendorService;
    use crate::service::vendor_service::tests::{draft, seed_city, seed_user};

    struct Fixture {
        store: Arc<dyn Store>,
        offers: OfferService,
        vendors: VendorService,
        owner: User,
        city: City,
        vendor: Vendor,
    }

    async fn fixture(approve: bool) -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let vendors = VendorService::new(Arc::clone(&store));
        let city = seed_city(store.as_ref(), "Madrid").await;
        let owner = seed_user(store.as_ref(), "owner@example.com", UserRole::User).await;
        let Ok(mut vendor) = vendors.register(&owner, draft(city.id)).await else {
            panic!("register failed");
        };
        if approve {
            let Ok(v) = vendors.set_status(vendor.id, VendorStatus::Approved).await else {
                panic!("approve failed");
            };
            vendor = v;
        }
        Fixture {
            offers: OfferService::new(Arc::clone(&store)),
            store,
            vendors,
            owner,
            city,
            vendor,
        }
    }

    fn offer_draft(title: &str) -> OfferDraft {
        OfferDraft {
            city_id: None,
            category_id: None,
            shop_id: None,
            title: title.to_string(),
            description: None,
            image_url: None,
            value: OfferValue::Discount(15.0),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn pending_vendor_cannot_publish() {
        let f = fixture(false).await;
        let result = f.offers.create(&f.owner, offer_draft("Half off")).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn city_defaults_to_vendor_and_survives_relocation() {
        let f = fixture(true).await;
        let Ok(offer) = f.offers.create(&f.owner, offer_draft("Half off")).await else {
            panic!("create failed");
        };
        assert_eq!(offer.city_id, f.city.id);

        let other = seed_city(f.store.as_ref(), "Sevilla").await;
        let patch = VendorPatch {
            city_id: Some(other.id),
            ..VendorPatch::default()
        };
        let Ok(moved) = f.vendors.update_mine(f.owner.id, patch).await else {
            panic!("relocate failed");
        };
        assert_eq!(moved.city_id, other.id);

        let Ok(Some(reloaded)) = f.store.get_offer(offer.id).await else {
            panic!("offer missing");
        };
        assert_eq!(reloaded.city_id, f.city.id);
    }

    #[tokio::test]
    async fn create_collects_reference_errors() {
        let f = fixture(true).await;
        let mut bad = offer_draft(" ");
        bad.category_id = Some(Uuid::new_v4());
        bad.shop_id = Some(Uuid::new_v4());
        bad.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        let Err(ApiError::Validation(messages)) = f.offers.create(&f.owner, bad).await else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 4);
    }

    #[tokio::test]
    async fn view_counts_and_hides_inactive() {
        let f = fixture(true).await;
        let Ok(offer) = f.offers.create(&f.owner, offer_draft("Half off")).await else {
            panic!("create failed");
        };
        let Ok(first) = f.offers.view(offer.id).await else {
            panic!("view failed");
        };
        assert_eq!(first.offer.views, 1);
        assert_eq!(first.vendor_name, f.vendor.business_name);
        let Ok(second) = f.offers.view(offer.id).await else {
            panic!("view failed");
        };
        assert_eq!(second.offer.views, 2);

        let Ok(_) = f.offers.moderate(offer.id, None, Some(false)).await else {
            panic!("moderate failed");
        };
        assert!(matches!(
            f.offers.view(offer.id).await,
            Err(ApiError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn only_owner_edits_and_featured_is_admin_only() {
        let f = fixture(true).await;
        let stranger = seed_user(f.store.as_ref(), "x@example.com", UserRole::User).await;
        let Ok(offer) = f.offers.create(&f.owner, offer_draft("Half off")).await else {
            panic!("create failed");
        };

        let patch = OfferPatch {
            title: Some("Two for one".to_string()),
            is_featured: Some(true),
            ..OfferPatch::default()
        };
        assert!(matches!(
            f.offers.update(&stranger, offer.id, patch.clone()).await,
            Err(ApiError::Forbidden(_))
        ));
        let Ok(updated) = f.offers.update(&f.owner, offer.id, patch).await else {
            panic!("update failed");
        };
        assert_eq!(updated.title, "Two for one");
        assert!(!updated.is_featured);

        assert!(matches!(
            f.offers.delete(&stranger, offer.id).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(f.offers.delete(&f.owner, offer.id).await.is_ok());
    }

    #[tokio::test]
    async fn shop_must_belong_to_vendor() {
        let f = fixture(true).await;
        let Ok(location) = GeoPoint::new(40.41, -3.70) else {
            panic!("bad point");
        };
        let Ok(shop) = f
            .vendors
            .create_shop(
                f.owner.id,
                crate::service::vendor_service::ShopDraft {
                    name: "Sol".to_string(),
                    address: None,
                    city_id: f.city.id,
                    location,
                },
            )
            .await
        else {
            panic!("shop failed");
        };
        let mut with_shop = offer_draft("Branch deal");
        with_shop.shop_id = Some(shop.id);
        let Ok(offer) = f.offers.create(&f.owner, with_shop).await else {
            panic!("create failed");
        };
        assert_eq!(offer.shop_id, Some(shop.id));
    }

    #[tokio::test]
    async fn favorites_are_idempotent() {
        let f = fixture(true).await;
        let fan = seed_user(f.store.as_ref(), "fan@example.com", UserRole::User).await;
        let Ok(offer) = f.offers.create(&f.owner, offer_draft("Half off")).await else {
            panic!("create failed");
        };
        for _ in 0..2 {
            assert!(f.offers.add_favorite(fan.id, offer.id).await.is_ok());
        }
        let Ok(page) = f.offers.favorites(fan.id, PageRequest::default()).await else {
            panic!("list failed");
        };
        assert_eq!(page.total, 1);
        assert!(matches!(
            f.offers.add_favorite(fan.id, Uuid::new_v4()).await,
            Err(ApiError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn discover_rejects_bad_sort_before_querying() {
        let f = fixture(true).await;
        let input = OfferQueryInput {
            sort: Some("cheapest".to_string()),
            ..OfferQueryInput::default()
        };
        let Err(ApiError::Validation(messages)) = f.offers.discover(input).await else {
            panic!("expected validation error");
        };
        assert!(messages.iter().any(|m| m.contains("sort")));
    }
}
