//! Vendor onboarding, profiles, moderation, shops, and followers.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    GeoPoint, NewShop, NewVendor, PageRequest, Paged, Shop, User, UserPatch, UserRole, Vendor,
    VendorFilter, VendorPatch, VendorStatus,
};
use crate::error::ApiError;
use crate::persistence::Store;

/// Validated vendor sign-up input.
#[derive(Debug, Clone)]
pub struct VendorDraft {
    /// Trading name.
    pub business_name: String,
    /// About text.
    pub description: Option<String>,
    /// Logo URL.
    pub logo_url: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Home city.
    pub city_id: Uuid,
    /// Storefront point.
    pub location: Option<GeoPoint>,
}

/// Validated branch input.
#[derive(Debug, Clone)]
pub struct ShopDraft {
    /// Branch name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// City of the branch.
    pub city_id: Uuid,
    /// Branch point.
    pub location: GeoPoint,
}

/// Vendor operations over the store.
#[derive(Debug, Clone)]
pub struct VendorService {
    store: Arc<dyn Store>,
}

impl VendorService {
    /// Creates the service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Registers the caller's vendor in `pending` state and promotes a plain
    /// `user` account to `vendor`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] if the caller already has a vendor;
    /// [`ApiError::Validation`] for an unknown city or blank name.
    pub async fn register(&self, owner: &User, draft: VendorDraft) -> Result<Vendor, ApiError> {
        let business_name = draft.business_name.trim().to_string();
        if business_name.is_empty() {
            return Err(ApiError::invalid_field("business_name must not be empty"));
        }
        self.require_city(draft.city_id).await?;
        if self.store.find_vendor_by_user(owner.id).await?.is_some() {
            return Err(ApiError::Conflict(
                "this account already has a vendor profile".to_string(),
            ));
        }

        let vendor = self
            .store
            .create_vendor(NewVendor {
                user_id: owner.id,
                business_name,
                description: draft.description,
                logo_url: draft.logo_url,
                phone: draft.phone,
                address: draft.address,
                city_id: draft.city_id,
                location: draft.location,
            })
            .await?;

        if owner.role == UserRole::User {
            self.store
                .update_user(
                    owner.id,
                    UserPatch {
                        role: Some(UserRole::Vendor),
                        ..UserPatch::default()
                    },
                )
                .await?;
        }

        tracing::info!(vendor_id = %vendor.id, user_id = %owner.id, "vendor registered");
        Ok(vendor)
    }

    /// Lists approved vendors.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_public(
        &self,
        city_id: Option<Uuid>,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Paged<Vendor>, ApiError> {
        let filter = VendorFilter {
            status: Some(VendorStatus::Approved),
            city_id,
            search: search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        };
        self.store.list_vendors(&filter, page).await
    }

    /// Loads an approved vendor. Other states are reported as missing.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the vendor does not exist or is not
    /// approved.
    pub async fn get_public(&self, id: Uuid) -> Result<Vendor, ApiError> {
        self.store
            .get_vendor(id)
            .await?
            .filter(|v| v.status == VendorStatus::Approved)
            .ok_or_else(|| ApiError::not_found("vendor", id))
    }

    /// Loads the caller's own vendor in any state.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the caller has no vendor.
    pub async fn get_mine(&self, user_id: Uuid) -> Result<Vendor, ApiError> {
        self.store
            .find_vendor_by_user(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("vendor for user", user_id))
    }

    /// Edits the caller's vendor profile. Offers keep their city when the
    /// vendor moves.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the caller has no vendor;
    /// [`ApiError::Validation`] for an unknown city or blank name.
    pub async fn update_mine(&self, user_id: Uuid, patch: VendorPatch) -> Result<Vendor, ApiError> {
        let vendor = self.get_mine(user_id).await?;
        if patch
            .business_name
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
        {
            return Err(ApiError::invalid_field("business_name must not be empty"));
        }
        if let Some(city_id) = patch.city_id {
            self.require_city(city_id).await?;
        }
        self.store.update_vendor(vendor.id, patch).await
    }

    /// Lists vendors in any state for moderation.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_for_admin(
        &self,
        status: Option<VendorStatus>,
        page: PageRequest,
    ) -> Result<Paged<Vendor>, ApiError> {
        let filter = VendorFilter {
            status,
            ..VendorFilter::default()
        };
        self.store.list_vendors(&filter, page).await
    }

    /// Approves or rejects a vendor.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when asked to move back to `pending`;
    /// [`ApiError::NotFound`] for an unknown vendor.
    pub async fn set_status(&self, id: Uuid, status: VendorStatus) -> Result<Vendor, ApiError> {
        let current = self
            .store
            .get_vendor(id)
            .await?
            .ok_or_else(|| ApiError::not_found("vendor", id))?;
        if !current.status.can_transition_to(status) {
            return Err(ApiError::invalid_field(format!(
                "vendor cannot move from {} to {status}",
                current.status
            )));
        }
        let vendor = self.store.set_vendor_status(id, status).await?;
        tracing::info!(vendor_id = %id, from = %current.status, to = %status, "vendor status changed");
        Ok(vendor)
    }

    /// Lists the branches of an approved vendor.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the vendor is not publicly visible.
    pub async fn list_public_shops(&self, vendor_id: Uuid) -> Result<Vec<Shop>, ApiError> {
        let vendor = self.get_public(vendor_id).await?;
        self.store.list_shops(vendor.id).await
    }

    /// Lists the caller's own branches.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the caller has no vendor.
    pub async fn list_my_shops(&self, user_id: Uuid) -> Result<Vec<Shop>, ApiError> {
        let vendor = self.get_mine(user_id).await?;
        self.store.list_shops(vendor.id).await
    }

    /// Adds a branch to the caller's vendor.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the caller has no vendor;
    /// [`ApiError::Validation`] for an unknown city or blank name.
    pub async fn create_shop(&self, user_id: Uuid, draft: ShopDraft) -> Result<Shop, ApiError> {
        let vendor = self.get_mine(user_id).await?;
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::invalid_field("name must not be empty"));
        }
        self.require_city(draft.city_id).await?;
        let shop = self
            .store
            .create_shop(NewShop {
                vendor_id: vendor.id,
                name,
                address: draft.address,
                city_id: draft.city_id,
                location: draft.location,
            })
            .await?;
        tracing::info!(shop_id = %shop.id, vendor_id = %vendor.id, "shop created");
        Ok(shop)
    }

    /// Follows an approved vendor. Following twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the vendor is not publicly visible.
    pub async fn follow(&self, user_id: Uuid, vendor_id: Uuid) -> Result<Vendor, ApiError> {
        self.get_public(vendor_id).await?;
        if self.store.follow_vendor(user_id, vendor_id).await? {
            tracing::debug!(%user_id, %vendor_id, "vendor followed");
        }
        self.reload(vendor_id).await
    }

    /// Stops following a vendor. Unfollowing twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the vendor does not exist.
    pub async fn unfollow(&self, user_id: Uuid, vendor_id: Uuid) -> Result<Vendor, ApiError> {
        self.reload(vendor_id).await?;
        if self.store.unfollow_vendor(user_id, vendor_id).await? {
            tracing::debug!(%user_id, %vendor_id, "vendor unfollowed");
        }
        self.reload(vendor_id).await
    }

    async fn reload(&self, vendor_id: Uuid) -> Result<Vendor, ApiError> {
        self.store
            .get_vendor(vendor_id)
            .await?
            .ok_or_else(|| ApiError::not_found("vendor", vendor_id))
    }

    async fn require_city(&self, city_id: Uuid) -> Result<(), ApiError> {
        match self.store.get_city(city_id).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::invalid_field(format!(
                "city_id {city_id} does not exist"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{City, NewCity, NewUser};
    use crate::persistence::{MemoryStore, Store};

    pub(crate) async fn seed_city(store: &dyn Store, name: &str) -> City {
        let Ok(center) = GeoPoint::new(41.39, 2.17) else {
            panic!("bad point");
        };
        let Ok(city) = store
            .create_city(NewCity {
                name: name.to_string(),
                center,
            })
            .await
        else {
            panic!("seed city failed");
        };
        city
    }

    pub(crate) async fn seed_user(store: &dyn Store, email: &str, role: UserRole) -> User {
        let Ok(user) = store
            .create_user(NewUser {
                name: email.to_string(),
                email: email.to_string(),
                password_hash: "x".to_string(),
                role,
            })
            .await
        else {
            panic!("seed user failed");
        };
        user
    }

    pub(crate) fn draft(city_id: Uuid) -> VendorDraft {
        VendorDraft {
            business_name: "Corner Bakery".to_string(),
            description: None,
            logo_url: None,
            phone: None,
            address: None,
            city_id,
            location: GeoPoint::new(41.40, 2.17).ok(),
        }
    }

    #[tokio::test]
    async fn register_promotes_owner_and_starts_pending() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let vendors = VendorService::new(Arc::clone(&store));
        let city = seed_city(store.as_ref(), "Barcelona").await;
        let owner = seed_user(store.as_ref(), "owner@example.com", UserRole::User).await;

        let Ok(vendor) = vendors.register(&owner, draft(city.id)).await else {
            panic!("register failed");
        };
        assert_eq!(vendor.status, VendorStatus::Pending);

        let Ok(Some(reloaded)) = store.get_user(owner.id).await else {
            panic!("owner missing");
        };
        assert_eq!(reloaded.role, UserRole::Vendor);

        let again = vendors.register(&reloaded, draft(city.id)).await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn pending_vendor_is_hidden_until_approved() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let vendors = VendorService::new(Arc::clone(&store));
        let city = seed_city(store.as_ref(), "Barcelona").await;
        let owner = seed_user(store.as_ref(), "owner@example.com", UserRole::User).await;
        let Ok(vendor) = vendors.register(&owner, draft(city.id)).await else {
            panic!("register failed");
        };

        assert!(matches!(
            vendors.get_public(vendor.id).await,
            Err(ApiError::NotFound { .. })
        ));
        let Ok(_) = vendors.set_status(vendor.id, VendorStatus::Approved).await else {
            panic!("approve failed");
        };
        assert!(vendors.get_public(vendor.id).await.is_ok());

        let back = vendors.set_status(vendor.id, VendorStatus::Pending).await;
        assert!(matches!(back, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_city_is_rejected() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let vendors = VendorService::new(Arc::clone(&store));
        let owner = seed_user(store.as_ref(), "owner@example.com", UserRole::User).await;
        let result = vendors.register(&owner, draft(Uuid::new_v4())).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn follow_is_idempotent() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let vendors = VendorService::new(Arc::clone(&store));
        let city = seed_city(store.as_ref(), "Barcelona").await;
        let owner = seed_user(store.as_ref(), "owner@example.com", UserRole::User).await;
        let fan = seed_user(store.as_ref(), "fan@example.com", UserRole::User).await;
        let Ok(vendor) = vendors.register(&owner, draft(city.id)).await else {
            panic!("register failed");
        };
        let Ok(_) = vendors.set_status(vendor.id, VendorStatus::Approved).await else {
            panic!("approve failed");
        };

        for _ in 0..2 {
            let Ok(v) = vendors.follow(fan.id, vendor.id).await else {
                panic!("follow failed");
            };
            assert_eq!(v.follower_count, 1);
        }
        for _ in 0..2 {
            let Ok(v) = vendors.unfollow(fan.id, vendor.id).await else {
                panic!("unfollow failed");
            };
            assert_eq!(v.follower_count, 0);
        }
    }

    #[tokio::test]
    async fn shops_belong_to_the_callers_vendor() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let vendors = VendorService::new(Arc::clone(&store));
        let city = seed_city(store.as_ref(), "Barcelona").await;
        let owner = seed_user(store.as_ref(), "owner@example.com", UserRole::User).await;
        let stranger = seed_user(store.as_ref(), "x@example.com", UserRole::User).await;
        let Ok(_) = vendors.register(&owner, draft(city.id)).await else {
            panic!("register failed");
        };
        let Ok(location) = GeoPoint::new(41.38, 2.18) else {
            panic!("bad point");
        };
        let shop = ShopDraft {
            name: "Gracia".to_string(),
            address: None,
            city_id: city.id,
            location,
        };

        assert!(vendors.create_shop(owner.id, shop.clone()).await.is_ok());
        assert!(matches!(
            vendors.create_shop(stranger.id, shop).await,
            Err(ApiError::NotFound { .. })
        ));
        let Ok(shops) = vendors.list_my_shops(owner.id).await else {
            panic!("list failed");
        };
        assert_eq!(shops.len(), 1);
    }
}
