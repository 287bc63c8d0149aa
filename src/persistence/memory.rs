//! Process-local store backed by hash maps.
//!
//! [`MemoryStore`] keeps every table behind one [`tokio::sync::RwLock`], so
//! each repository call sees and leaves a consistent snapshot: counters are
//! refreshed under the same write guard as the mutation that changes them.
//! It backs the integration tests and `PERSISTENCE_ENABLED=false` runs.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CatalogRepository, ContentRepository, OfferRepository, ReviewRepository, UserRepository,
    VendorRepository,
};
use crate::domain::review::mean_rating;
use crate::domain::{
    Category, City, NewCategory, NewCity, NewOffer, NewReview, NewShop, NewUser, NewVendor,
    Offer, OfferListing, OfferPatch, OfferQuery, Page, PageRequest, Paged, Review,
    ReviewListing, Setting, Shop, User, UserPatch, Vendor, VendorFilter, VendorPatch,
    VendorStatus,
};
use crate::error::ApiError;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    cities: HashMap<Uuid, City>,
    categories: HashMap<Uuid, Category>,
    vendors: HashMap<Uuid, Vendor>,
    shops: HashMap<Uuid, Shop>,
    offers: HashMap<Uuid, Offer>,
    reviews: HashMap<Uuid, Review>,
    /// (user, offer) → saved at.
    favorites: HashMap<(Uuid, Uuid), DateTime<Utc>>,
    /// (user, vendor).
    followers: HashSet<(Uuid, Uuid)>,
    pages: BTreeMap<String, Page>,
    settings: BTreeMap<String, Setting>,
}

impl Tables {
    fn refresh_rating(&mut self, vendor_id: Uuid) {
        let ratings: Vec<i32> = self
            .reviews
            .values()
            .filter(|r| r.vendor_id == vendor_id)
            .map(|r| r.rating)
            .collect();
        if let Some(vendor) = self.vendors.get_mut(&vendor_id) {
            vendor.rating = mean_rating(&ratings);
            vendor.review_count = i64::try_from(ratings.len()).unwrap_or(i64::MAX);
        }
    }

    fn refresh_followers(&mut self, vendor_id: Uuid) {
        let count = self
            .followers
            .iter()
            .filter(|(_, v)| *v == vendor_id)
            .count();
        if let Some(vendor) = self.vendors.get_mut(&vendor_id) {
            vendor.follower_count = i64::try_from(count).unwrap_or(i64::MAX);
        }
    }

    fn remove_offer(&mut self, offer_id: Uuid) -> Option<Offer> {
        self.favorites.retain(|(_, o), _| *o != offer_id);
        self.offers.remove(&offer_id)
    }

    fn remove_vendor(&mut self, vendor_id: Uuid) {
        let offer_ids: Vec<Uuid> = self
            .offers
            .values()
            .filter(|o| o.vendor_id == vendor_id)
            .map(|o| o.id)
            .collect();
        for id in offer_ids {
            self.remove_offer(id);
        }
        self.shops.retain(|_, s| s.vendor_id != vendor_id);
        self.reviews.retain(|_, r| r.vendor_id != vendor_id);
        self.followers.retain(|(_, v)| *v != vendor_id);
        self.vendors.remove(&vendor_id);
    }
}

/// In-memory implementation of [`super::Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sorts `items` with `cmp` and cuts out the requested page.
fn paginate<T>(
    mut items: Vec<T>,
    page: PageRequest,
    cmp: impl FnMut(&T, &T) -> std::cmp::Ordering,
) -> Paged<T> {
    items.sort_by(cmp);
    let total = items.len() as u64;
    Paged {
        items: page.slice(items),
        total,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, ApiError> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == new.email) {
            return Err(ApiError::Conflict(format!(
                "email {} is already registered",
                new.email
            )));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            phone: None,
            avatar_url: None,
            city_id: None,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, ApiError> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("user", id))?;
        patch.apply(user);
        Ok(user.clone())
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paged<User>, ApiError> {
        let t = self.tables.read().await;
        let items: Vec<User> = t
            .users
            .values()
            .filter(|u| search.is_none_or(|s| contains_ci(&u.name, s) || contains_ci(&u.email, s)))
            .cloned()
            .collect();
        Ok(paginate(items, page, |a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
        }))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), ApiError> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() {
            return Err(ApiError::not_found("user", id));
        }
        let owned: Vec<Uuid> = t
            .vendors
            .values()
            .filter(|v| v.user_id == id)
            .map(|v| v.id)
            .collect();
        for vendor_id in owned {
            t.remove_vendor(vendor_id);
        }

        let reviewed: HashSet<Uuid> = t
            .reviews
            .values()
            .filter(|r| r.user_id == id)
            .map(|r| r.vendor_id)
            .collect();
        let followed: HashSet<Uuid> = t
            .followers
            .iter()
            .filter(|(u, _)| *u == id)
            .map(|(_, v)| *v)
            .collect();
        t.reviews.retain(|_, r| r.user_id != id);
        t.followers.retain(|(u, _)| *u != id);
        t.favorites.retain(|(u, _), _| *u != id);
        for vendor_id in reviewed {
            t.refresh_rating(vendor_id);
        }
        for vendor_id in followed {
            t.refresh_followers(vendor_id);
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn create_city(&self, new: NewCity) -> Result<City, ApiError> {
        let mut t = self.tables.write().await;
        if t.cities
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(&new.name))
        {
            return Err(ApiError::Conflict(format!("city {} already exists", new.name)));
        }
        let city = City {
            id: Uuid::new_v4(),
            name: new.name,
            latitude: new.center.lat,
            longitude: new.center.lng,
            created_at: Utc::now(),
        };
        t.cities.insert(city.id, city.clone());
        Ok(city)
    }

    async fn list_cities(&self) -> Result<Vec<City>, ApiError> {
        let t = self.tables.read().await;
        let mut cities: Vec<City> = t.cities.values().cloned().collect();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cities)
    }

    async fn get_city(&self, id: Uuid) -> Result<Option<City>, ApiError> {
        Ok(self.tables.read().await.cities.get(&id).cloned())
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category, ApiError> {
        let mut t = self.tables.write().await;
        if t.categories.values().any(|c| c.slug == new.slug) {
            return Err(ApiError::Conflict(format!(
                "category slug {} already exists",
                new.slug
            )));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: new.name,
            slug: new.slug,
            icon: new.icon,
            created_at: Utc::now(),
        };
        t.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let t = self.tables.read().await;
        let mut categories: Vec<Category> = t.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, ApiError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }
}

#[async_trait]
impl VendorRepository for MemoryStore {
    async fn create_vendor(&self, new: NewVendor) -> Result<Vendor, ApiError> {
        let mut t = self.tables.write().await;
        if t.vendors.values().any(|v| v.user_id == new.user_id) {
            return Err(ApiError::Conflict(
                "user already owns a vendor profile".to_string(),
            ));
        }
        let now = Utc::now();
        let vendor = Vendor {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            business_name: new.business_name,
            description: new.description,
            logo_url: new.logo_url,
            phone: new.phone,
            address: new.address,
            city_id: new.city_id,
            latitude: new.location.map(|p| p.lat),
            longitude: new.location.map(|p| p.lng),
            status: VendorStatus::Pending,
            rating: 0.0,
            review_count: 0,
            follower_count: 0,
            created_at: now,
            updated_at: now,
        };
        t.vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    async fn get_vendor(&self, id: Uuid) -> Result<Option<Vendor>, ApiError> {
        Ok(self.tables.read().await.vendors.get(&id).cloned())
    }

    async fn find_vendor_by_user(&self, user_id: Uuid) -> Result<Option<Vendor>, ApiError> {
        let t = self.tables.read().await;
        Ok(t.vendors.values().find(|v| v.user_id == user_id).cloned())
    }

    async fn list_vendors(
        &self,
        filter: &VendorFilter,
        page: PageRequest,
    ) -> Result<Paged<Vendor>, ApiError> {
        let t = self.tables.read().await;
        let items: Vec<Vendor> = t
            .vendors
            .values()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        Ok(paginate(items, page, |a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
        }))
    }

    async fn update_vendor(&self, id: Uuid, patch: VendorPatch) -> Result<Vendor, ApiError> {
        let mut t = self.tables.write().await;
        let vendor = t
            .vendors
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("vendor", id))?;
        patch.apply(vendor);
        Ok(vendor.clone())
    }

    async fn set_vendor_status(
        &self,
        id: Uuid,
        status: VendorStatus,
    ) -> Result<Vendor, ApiError> {
        let mut t = self.tables.write().await;
        let vendor = t
            .vendors
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("vendor", id))?;
        vendor.status = status;
        vendor.updated_at = Utc::now();
        Ok(vendor.clone())
    }

    async fn create_shop(&self, new: NewShop) -> Result<Shop, ApiError> {
        let mut t = self.tables.write().await;
        let shop = Shop {
            id: Uuid::new_v4(),
            vendor_id: new.vendor_id,
            name: new.name,
            address: new.address,
            city_id: new.city_id,
            latitude: new.location.lat,
            longitude: new.location.lng,
            created_at: Utc::now(),
        };
        t.shops.insert(shop.id, shop.clone());
        Ok(shop)
    }

    async fn get_shop(&self, id: Uuid) -> Result<Option<Shop>, ApiError> {
        Ok(self.tables.read().await.shops.get(&id).cloned())
    }

    async fn list_shops(&self, vendor_id: Uuid) -> Result<Vec<Shop>, ApiError> {
        let t = self.tables.read().await;
        let mut shops: Vec<Shop> = t
            .shops
            .values()
            .filter(|s| s.vendor_id == vendor_id)
            .cloned()
            .collect();
        shops.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(shops)
    }

    async fn follow_vendor(&self, user_id: Uuid, vendor_id: Uuid) -> Result<bool, ApiError> {
        let mut t = self.tables.write().await;
        let inserted = t.followers.insert((user_id, vendor_id));
        t.refresh_followers(vendor_id);
        Ok(inserted)
    }

    async fn unfollow_vendor(&self, user_id: Uuid, vendor_id: Uuid) -> Result<bool, ApiError> {
        let mut t = self.tables.write().await;
        let removed = t.followers.remove(&(user_id, vendor_id));
        t.refresh_followers(vendor_id);
        Ok(removed)
    }
}

#[async_trait]
impl OfferRepository for MemoryStore {
    async fn create_offer(&self, new: NewOffer) -> Result<Offer, ApiError> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let offer_type = new.value.offer_type();
        let (discount_percentage, coupon_code, voucher_value) = new.value.into_columns();
        let offer = Offer {
            id: Uuid::new_v4(),
            vendor_id: new.vendor_id,
            city_id: new.city_id,
            category_id: new.category_id,
            shop_id: new.shop_id,
            title: new.title,
            description: new.description,
            image_url: new.image_url,
            offer_type,
            discount_percentage,
            coupon_code,
            voucher_value,
            is_featured: false,
            is_active: true,
            views: 0,
            expires_at: new.expires_at,
            created_at: now,
            updated_at: now,
        };
        t.offers.insert(offer.id, offer.clone());
        Ok(offer)
    }

    async fn get_offer(&self, id: Uuid) -> Result<Option<Offer>, ApiError> {
        Ok(self.tables.read().await.offers.get(&id).cloned())
    }

    async fn update_offer(&self, id: Uuid, patch: OfferPatch) -> Result<Offer, ApiError> {
        let mut t = self.tables.write().await;
        let offer = t
            .offers
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("offer", id))?;
        patch.apply(offer);
        Ok(offer.clone())
    }

    async fn delete_offer(&self, id: Uuid) -> Result<(), ApiError> {
        let mut t = self.tables.write().await;
        t.remove_offer(id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("offer", id))
    }

    async fn increment_views(&self, id: Uuid) -> Result<i64, ApiError> {
        let mut t = self.tables.write().await;
        let offer = t
            .offers
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("offer", id))?;
        offer.views = offer.views.saturating_add(1);
        Ok(offer.views)
    }

    async fn search_offers(&self, query: &OfferQuery) -> Result<Paged<OfferListing>, ApiError> {
        let t = self.tables.read().await;
        let mut items = Vec::new();
        for offer in t.offers.values() {
            let Some(vendor) = t.vendors.get(&offer.vendor_id) else {
                continue;
            };
            let location = offer
                .shop_id
                .and_then(|id| t.shops.get(&id))
                .map(Shop::location)
                .or_else(|| vendor.location());
            let distance_km = query.distance_to(location);
            if query.matches(offer, vendor, distance_km) {
                items.push(OfferListing {
                    offer: offer.clone(),
                    vendor_name: vendor.business_name.clone(),
                    distance_km,
                });
            }
        }
        Ok(paginate(items, query.page, |a, b| query.compare(a, b)))
    }

    async fn list_offers(
        &self,
        vendor_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Paged<Offer>, ApiError> {
        let t = self.tables.read().await;
        let items: Vec<Offer> = t
            .offers
            .values()
            .filter(|o| vendor_id.is_none_or(|id| o.vendor_id == id))
            .cloned()
            .collect();
        Ok(paginate(items, page, |a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
        }))
    }

    async fn add_favorite(&self, user_id: Uuid, offer_id: Uuid) -> Result<bool, ApiError> {
        let mut t = self.tables.write().await;
        if t.favorites.contains_key(&(user_id, offer_id)) {
            return Ok(false);
        }
        t.favorites.insert((user_id, offer_id), Utc::now());
        Ok(true)
    }

    async fn remove_favorite(&self, user_id: Uuid, offer_id: Uuid) -> Result<bool, ApiError> {
        let mut t = self.tables.write().await;
        Ok(t.favorites.remove(&(user_id, offer_id)).is_some())
    }

    async fn list_favorites(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paged<Offer>, ApiError> {
        let t = self.tables.read().await;
        let saved: Vec<(DateTime<Utc>, Offer)> = t
            .favorites
            .iter()
            .filter(|((u, _), _)| *u == user_id)
            .filter_map(|((_, o), at)| t.offers.get(o).map(|offer| (*at, offer.clone())))
            .collect();
        let paged = paginate(saved, page, |a, b| {
            b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id))
        });
        Ok(paged.map(|(_, offer)| offer))
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create_review(&self, new: NewReview) -> Result<Review, ApiError> {
        let mut t = self.tables.write().await;
        if t.reviews
            .values()
            .any(|r| r.vendor_id == new.vendor_id && r.user_id == new.user_id)
        {
            return Err(ApiError::Conflict(
                "you have already reviewed this vendor".to_string(),
            ));
        }
        let review = Review {
            id: Uuid::new_v4(),
            vendor_id: new.vendor_id,
            user_id: new.user_id,
            rating: new.rating,
            comment: new.comment,
            created_at: Utc::now(),
        };
        t.reviews.insert(review.id, review.clone());
        t.refresh_rating(review.vendor_id);
        Ok(review)
    }

    async fn get_review(&self, id: Uuid) -> Result<Option<Review>, ApiError> {
        Ok(self.tables.read().await.reviews.get(&id).cloned())
    }

    async fn list_reviews(
        &self,
        vendor_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Paged<ReviewListing>, ApiError> {
        let t = self.tables.read().await;
        let items: Vec<ReviewListing> = t
            .reviews
            .values()
            .filter(|r| vendor_id.is_none_or(|id| r.vendor_id == id))
            .map(|r| ReviewListing {
                review: r.clone(),
                author_name: t
                    .users
                    .get(&r.user_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default(),
            })
            .collect();
        Ok(paginate(items, page, |a, b| {
            b.review
                .created_at
                .cmp(&a.review.created_at)
                .then_with(|| a.review.id.cmp(&b.review.id))
        }))
    }

    async fn delete_review(&self, id: Uuid) -> Result<(), ApiError> {
        let mut t = self.tables.write().await;
        let review = t
            .reviews
            .remove(&id)
            .ok_or_else(|| ApiError::not_found("review", id))?;
        t.refresh_rating(review.vendor_id);
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn list_pages(&self) -> Result<Vec<Page>, ApiError> {
        Ok(self.tables.read().await.pages.values().cloned().collect())
    }

    async fn get_page(&self, slug: &str) -> Result<Option<Page>, ApiError> {
        Ok(self.tables.read().await.pages.get(slug).cloned())
    }

    async fn upsert_page(
        &self,
        slug: &str,
        title: &str,
        content: &str,
    ) -> Result<Page, ApiError> {
        let page = Page {
            slug: slug.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            updated_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .pages
            .insert(page.slug.clone(), page.clone());
        Ok(page)
    }

    async fn delete_page(&self, slug: &str) -> Result<bool, ApiError> {
        Ok(self.tables.write().await.pages.remove(slug).is_some())
    }

    async fn list_settings(&self) -> Result<Vec<Setting>, ApiError> {
        Ok(self.tables.read().await.settings.values().cloned().collect())
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<Setting, ApiError> {
        let setting = Setting {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .settings
            .insert(setting.key.clone(), setting.clone());
        Ok(setting)
    }
}
