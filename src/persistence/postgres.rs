//! PostgreSQL implementation of the store.
//!
//! Queries are written by hand against the schema in `migrations/`. Derived
//! vendor counters are refreshed in the same transaction as the mutation that
//! changes them.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    CatalogRepository, ContentRepository, OfferRepository, ReviewRepository, UserRepository,
    VendorRepository,
};
use crate::config::AppConfig;
use crate::domain::geo::EARTH_RADIUS_KM;
use crate::domain::{
    Category, City, NewCategory, NewCity, NewOffer, NewReview, NewShop, NewUser, NewVendor,
    Offer, OfferListing, OfferPatch, OfferQuery, OfferSort, Page, PageRequest, Paged, Review,
    ReviewListing, Setting, Shop, User, UserPatch, Vendor, VendorFilter, VendorPatch,
    VendorStatus,
};
use crate::error::ApiError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from configuration and applies pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or a migration fails.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Recomputes `rating`, `review_count`, and `follower_count` for a vendor.
const REFRESH_VENDOR_COUNTERS: &str = "UPDATE vendors SET \
     rating = COALESCE((SELECT AVG(rating)::float8 FROM reviews WHERE vendor_id = $1), 0), \
     review_count = (SELECT COUNT(*) FROM reviews WHERE vendor_id = $1), \
     follower_count = (SELECT COUNT(*) FROM vendor_followers WHERE vendor_id = $1) \
     WHERE id = $1";

/// Wraps a search term as an `ILIKE` substring pattern, escaping wildcards.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn limit_offset(page: PageRequest) -> (i64, i64) {
    (
        i64::from(page.limit),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
    )
}

fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Pushes `(SELECT ...) AS d WHERE ...`: every discoverable offer with its
/// vendor name and distance, filtered by the query. Callers prefix a
/// projection and append ordering.
fn push_discovery_rows(qb: &mut QueryBuilder<'_, Postgres>, query: &OfferQuery) {
    qb.push("(SELECT o.*, v.business_name AS vendor_name, ");
    match query.origin {
        Some(origin) => {
            // Haversine over the shop point when the offer has one, else the
            // vendor's storefront.
            qb.push("(2 * ")
                .push(EARTH_RADIUS_KM)
                .push("::float8 * asin(LEAST(1.0, sqrt(power(sin(radians(COALESCE(s.latitude, v.latitude) - ")
                .push_bind(origin.lat)
                .push(") / 2), 2) + cos(radians(")
                .push_bind(origin.lat)
                .push(")) * cos(radians(COALESCE(s.latitude, v.latitude))) * power(sin(radians(COALESCE(s.longitude, v.longitude) - ")
                .push_bind(origin.lng)
                .push(") / 2), 2))))) AS distance_km ");
        }
        None => {
            qb.push("NULL::float8 AS distance_km ");
        }
    }
    qb.push(
        "FROM offers o \
         JOIN vendors v ON v.id = o.vendor_id \
         LEFT JOIN shops s ON s.id = o.shop_id \
         WHERE v.status = 'approved' AND o.is_active \
         AND (o.expires_at IS NULL OR o.expires_at > ",
    )
    .push_bind(query.now)
    .push(")");

    if let Some(city_id) = query.city_id {
        qb.push(" AND o.city_id = ").push_bind(city_id);
    }
    if let Some(featured) = query.featured {
        qb.push(" AND o.is_featured = ").push_bind(featured);
    }
    if let Some(category_id) = query.category_id {
        qb.push(" AND o.category_id = ").push_bind(category_id);
    }
    if let Some(vendor_id) = query.vendor_id {
        qb.push(" AND o.vendor_id = ").push_bind(vendor_id);
    }
    if let Some(term) = &query.search {
        let pattern = like_pattern(term);
        qb.push(" AND (o.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR o.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    qb.push(") AS d WHERE TRUE");
    if let Some(radius) = query.radius_km {
        qb.push(" AND d.distance_km <= ").push_bind(radius);
    }
}

fn push_discovery_order(qb: &mut QueryBuilder<'_, Postgres>, sort: OfferSort) {
    const PRICE: &str = "(CASE d.offer_type WHEN 'discount' THEN d.discount_percentage \
                         WHEN 'voucher' THEN d.voucher_value END)";
    qb.push(" ORDER BY ");
    match sort {
        OfferSort::Popularity => {
            qb.push("d.views DESC, ");
        }
        OfferSort::Newest => {}
        OfferSort::PriceAsc => {
            qb.push(PRICE).push(" ASC NULLS LAST, ");
        }
        OfferSort::PriceDesc => {
            qb.push(PRICE).push(" DESC NULLS LAST, ");
        }
        OfferSort::Nearest => {
            qb.push("d.distance_km ASC NULLS LAST, ");
        }
    }
    qb.push("d.created_at DESC, d.id ASC");
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
             name = COALESCE($2, name), \
             phone = COALESCE($3, phone), \
             avatar_url = COALESCE($4, avatar_url), \
             city_id = COALESCE($5, city_id), \
             password_hash = COALESCE($6, password_hash), \
             role = COALESCE($7, role), \
             updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.phone)
        .bind(patch.avatar_url)
        .bind(patch.city_id)
        .bind(patch.password_hash)
        .bind(patch.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paged<User>, ApiError> {
        const FILTER: &str = "WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)";
        let pattern = search.map(like_pattern);
        let (limit, offset) = limit_offset(page);

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users {FILTER}"))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;
        let items = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users {FILTER} ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged {
            items,
            total: to_total(total),
        })
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;
        let touched = sqlx::query_scalar::<_, Uuid>(
            "SELECT vendor_id FROM reviews WHERE user_id = $1 \
             UNION SELECT vendor_id FROM vendor_followers WHERE user_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("user", id));
        }

        for vendor_id in touched {
            sqlx::query(REFRESH_VENDOR_COUNTERS)
                .bind(vendor_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for PgStore {
    async fn create_city(&self, new: NewCity) -> Result<City, ApiError> {
        let city = sqlx::query_as::<_, City>(
            "INSERT INTO cities (id, name, latitude, longitude) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(new.center.lat)
        .bind(new.center.lng)
        .fetch_one(&self.pool)
        .await?;
        Ok(city)
    }

    async fn list_cities(&self) -> Result<Vec<City>, ApiError> {
        let cities = sqlx::query_as::<_, City>("SELECT * FROM cities ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(cities)
    }

    async fn get_city(&self, id: Uuid) -> Result<Option<City>, ApiError> {
        let city = sqlx::query_as::<_, City>("SELECT * FROM cities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(city)
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category, ApiError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, slug, icon) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.icon)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, ApiError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }
}

#[async_trait]
impl VendorRepository for PgStore {
    async fn create_vendor(&self, new: NewVendor) -> Result<Vendor, ApiError> {
        let vendor = sqlx::query_as::<_, Vendor>(
            "INSERT INTO vendors \
             (id, user_id, business_name, description, logo_url, phone, address, city_id, latitude, longitude) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.business_name)
        .bind(&new.description)
        .bind(&new.logo_url)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(new.city_id)
        .bind(new.location.map(|p| p.lat))
        .bind(new.location.map(|p| p.lng))
        .fetch_one(&self.pool)
        .await?;
        Ok(vendor)
    }

    async fn get_vendor(&self, id: Uuid) -> Result<Option<Vendor>, ApiError> {
        let vendor = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vendor)
    }

    async fn find_vendor_by_user(&self, user_id: Uuid) -> Result<Option<Vendor>, ApiError> {
        let vendor = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vendor)
    }

    async fn list_vendors(
        &self,
        filter: &VendorFilter,
        page: PageRequest,
    ) -> Result<Paged<Vendor>, ApiError> {
        const FILTER: &str = "WHERE ($1::text IS NULL OR status = $1) \
                              AND ($2::uuid IS NULL OR city_id = $2) \
                              AND ($3::text IS NULL OR business_name ILIKE $3)";
        let status = filter.status.map(|s| s.as_str());
        let pattern = filter.search.as_deref().map(like_pattern);
        let (limit, offset) = limit_offset(page);

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM vendors {FILTER}"))
                .bind(status)
                .bind(filter.city_id)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;
        let items = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT * FROM vendors {FILTER} ORDER BY created_at DESC, id ASC LIMIT $4 OFFSET $5"
        ))
        .bind(status)
        .bind(filter.city_id)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Paged {
            items,
            total: to_total(total),
        })
    }

    async fn update_vendor(&self, id: Uuid, patch: VendorPatch) -> Result<Vendor, ApiError> {
        sqlx::query_as::<_, Vendor>(
            "UPDATE vendors SET \
             business_name = COALESCE($2, business_name), \
             description = COALESCE($3, description), \
             logo_url = COALESCE($4, logo_url), \
             phone = COALESCE($5, phone), \
             address = COALESCE($6, address), \
             city_id = COALESCE($7, city_id), \
             latitude = COALESCE($8, latitude), \
             longitude = COALESCE($9, longitude), \
             updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.business_name)
        .bind(patch.description)
        .bind(patch.logo_url)
        .bind(patch.phone)
        .bind(patch.address)
        .bind(patch.city_id)
        .bind(patch.location.map(|p| p.lat))
        .bind(patch.location.map(|p| p.lng))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("vendor", id))
    }

    async fn set_vendor_status(
        &self,
        id: Uuid,
        status: VendorStatus,
    ) -> Result<Vendor, ApiError> {
        sqlx::query_as::<_, Vendor>(
            "UPDATE vendors SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("vendor", id))
    }

    async fn create_shop(&self, new: NewShop) -> Result<Shop, ApiError> {
        let shop = sqlx::query_as::<_, Shop>(
            "INSERT INTO shops (id, vendor_id, name, address, city_id, latitude, longitude) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.vendor_id)
        .bind(&new.name)
        .bind(&new.address)
        .bind(new.city_id)
        .bind(new.location.lat)
        .bind(new.location.lng)
        .fetch_one(&self.pool)
        .await?;
        Ok(shop)
    }

    async fn get_shop(&self, id: Uuid) -> Result<Option<Shop>, ApiError> {
        let shop = sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shop)
    }

    async fn list_shops(&self, vendor_id: Uuid) -> Result<Vec<Shop>, ApiError> {
        let shops = sqlx::query_as::<_, Shop>(
            "SELECT * FROM shops WHERE vendor_id = $1 ORDER BY name ASC, id ASC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(shops)
    }

    async fn follow_vendor(&self, user_id: Uuid, vendor_id: Uuid) -> Result<bool, ApiError> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO vendor_followers (user_id, vendor_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(vendor_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;
        sqlx::query(REFRESH_VENDOR_COUNTERS)
            .bind(vendor_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn unfollow_vendor(&self, user_id: Uuid, vendor_id: Uuid) -> Result<bool, ApiError> {
        let mut tx = self.pool.begin().await?;
        let removed =
            sqlx::query("DELETE FROM vendor_followers WHERE user_id = $1 AND vendor_id = $2")
                .bind(user_id)
                .bind(vendor_id)
                .execute(&mut *tx)
                .await?
                .rows_affected()
                > 0;
        sqlx::query(REFRESH_VENDOR_COUNTERS)
            .bind(vendor_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(removed)
    }
}

#[async_trait]
impl OfferRepository for PgStore {
    async fn create_offer(&self, new: NewOffer) -> Result<Offer, ApiError> {
        let offer_type = new.value.offer_type();
        let (discount_percentage, coupon_code, voucher_value) = new.value.into_columns();
        let offer = sqlx::query_as::<_, Offer>(
            "INSERT INTO offers \
             (id, vendor_id, city_id, category_id, shop_id, title, description, image_url, \
              offer_type, discount_percentage, coupon_code, voucher_value, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.vendor_id)
        .bind(new.city_id)
        .bind(new.category_id)
        .bind(new.shop_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.image_url)
        .bind(offer_type.as_str())
        .bind(discount_percentage)
        .bind(coupon_code)
        .bind(voucher_value)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(offer)
    }

    async fn get_offer(&self, id: Uuid) -> Result<Option<Offer>, ApiError> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(offer)
    }

    async fn update_offer(&self, id: Uuid, patch: OfferPatch) -> Result<Offer, ApiError> {
        let replace_value = patch.value.is_some();
        let offer_type = patch.value.as_ref().map(|v| v.offer_type().as_str());
        let (discount_percentage, coupon_code, voucher_value) = patch
            .value
            .map(|v| v.into_columns())
            .unwrap_or((None, None, None));

        sqlx::query_as::<_, Offer>(
            "UPDATE offers SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             image_url = COALESCE($4, image_url), \
             category_id = COALESCE($5, category_id), \
             expires_at = COALESCE($6, expires_at), \
             is_featured = COALESCE($7, is_featured), \
             is_active = COALESCE($8, is_active), \
             offer_type = CASE WHEN $9 THEN $10 ELSE offer_type END, \
             discount_percentage = CASE WHEN $9 THEN $11 ELSE discount_percentage END, \
             coupon_code = CASE WHEN $9 THEN $12 ELSE coupon_code END, \
             voucher_value = CASE WHEN $9 THEN $13 ELSE voucher_value END, \
             updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.image_url)
        .bind(patch.category_id)
        .bind(patch.expires_at)
        .bind(patch.is_featured)
        .bind(patch.is_active)
        .bind(replace_value)
        .bind(offer_type)
        .bind(discount_percentage)
        .bind(coupon_code)
        .bind(voucher_value)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("offer", id))
    }

    async fn delete_offer(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("offer", id));
        }
        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<i64, ApiError> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE offers SET views = views + 1 WHERE id = $1 RETURNING views",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("offer", id))
    }

    async fn search_offers(&self, query: &OfferQuery) -> Result<Paged<OfferListing>, ApiError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        push_discovery_rows(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let (limit, offset) = limit_offset(query.page);
        let mut select = QueryBuilder::<Postgres>::new("SELECT d.* FROM ");
        push_discovery_rows(&mut select, query);
        push_discovery_order(&mut select, query.sort);
        select
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let items = select
            .build_query_as::<OfferListing>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            sort = %query.sort,
            total,
            returned = items.len(),
            "offer discovery query"
        );
        Ok(Paged {
            items,
            total: to_total(total),
        })
    }

    async fn list_offers(
        &self,
        vendor_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Paged<Offer>, ApiError> {
        const FILTER: &str = "WHERE ($1::uuid IS NULL OR vendor_id = $1)";
        let (limit, offset) = limit_offset(page);
        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM offers {FILTER}"))
            .bind(vendor_id)
            .fetch_one(&self.pool)
            .await?;
        let items = sqlx::query_as::<_, Offer>(&format!(
            "SELECT * FROM offers {FILTER} ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(vendor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(Paged {
            items,
            total: to_total(total),
        })
    }

    async fn add_favorite(&self, user_id: Uuid, offer_id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "INSERT INTO favorites (user_id, offer_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(offer_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_favorite(&self, user_id: Uuid, offer_id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND offer_id = $2")
            .bind(user_id)
            .bind(offer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_favorites(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paged<Offer>, ApiError> {
        let (limit, offset) = limit_offset(page);
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        let items = sqlx::query_as::<_, Offer>(
            "SELECT o.* FROM favorites f JOIN offers o ON o.id = f.offer_id \
             WHERE f.user_id = $1 ORDER BY f.created_at DESC, o.id ASC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(Paged {
            items,
            total: to_total(total),
        })
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    async fn create_review(&self, new: NewReview) -> Result<Review, ApiError> {
        let mut tx = self.pool.begin().await?;
        let review = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, vendor_id, user_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.vendor_id)
        .bind(new.user_id)
        .bind(new.rating)
        .bind(&new.comment)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query(REFRESH_VENDOR_COUNTERS)
            .bind(new.vendor_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(review)
    }

    async fn get_review(&self, id: Uuid) -> Result<Option<Review>, ApiError> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn list_reviews(
        &self,
        vendor_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Paged<ReviewListing>, ApiError> {
        let (limit, offset) = limit_offset(page);
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reviews WHERE ($1::uuid IS NULL OR vendor_id = $1)",
        )
        .bind(vendor_id)
        .fetch_one(&self.pool)
        .await?;
        let items = sqlx::query_as::<_, ReviewListing>(
            "SELECT r.*, COALESCE(u.name, '') AS author_name \
             FROM reviews r LEFT JOIN users u ON u.id = r.user_id \
             WHERE ($1::uuid IS NULL OR r.vendor_id = $1) \
             ORDER BY r.created_at DESC, r.id ASC LIMIT $2 OFFSET $3",
        )
        .bind(vendor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(Paged {
            items,
            total: to_total(total),
        })
    }

    async fn delete_review(&self, id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;
        let vendor_id =
            sqlx::query_scalar::<_, Uuid>("DELETE FROM reviews WHERE id = $1 RETURNING vendor_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ApiError::not_found("review", id))?;
        sqlx::query(REFRESH_VENDOR_COUNTERS)
            .bind(vendor_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for PgStore {
    async fn list_pages(&self) -> Result<Vec<Page>, ApiError> {
        let pages = sqlx::query_as::<_, Page>("SELECT * FROM pages ORDER BY slug ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(pages)
    }

    async fn get_page(&self, slug: &str) -> Result<Option<Page>, ApiError> {
        let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    async fn upsert_page(
        &self,
        slug: &str,
        title: &str,
        content: &str,
    ) -> Result<Page, ApiError> {
        let page = sqlx::query_as::<_, Page>(
            "INSERT INTO pages (slug, title, content) VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO UPDATE SET title = EXCLUDED.title, \
             content = EXCLUDED.content, updated_at = now() RETURNING *",
        )
        .bind(slug)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(page)
    }

    async fn delete_page(&self, slug: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM pages WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_settings(&self) -> Result<Vec<Setting>, ApiError> {
        let settings = sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(settings)
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<Setting, ApiError> {
        let setting = sqlx::query_as::<_, Setting>(
            "INSERT INTO settings (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now() \
             RETURNING *",
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;
        Ok(setting)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{OfferQueryInput, OfferSort};

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn discovery_sql_includes_only_requested_filters() {
        let Ok(query) = OfferQuery::parse(
            OfferQueryInput {
                city_id: Some(Uuid::new_v4()),
                search: Some("pizza".to_string()),
                ..Default::default()
            },
            Utc::now(),
        ) else {
            panic!("city and search filters should parse");
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT d.* FROM ");
        push_discovery_rows(&mut qb, &query);
        push_discovery_order(&mut qb, query.sort);
        let sql = qb.sql();
        assert!(sql.contains("o.city_id = $"));
        assert!(sql.contains("ILIKE"));
        assert!(!sql.contains("o.vendor_id = $"));
        assert!(!sql.contains("distance_km <="));
        assert!(sql.contains("NULL::float8 AS distance_km"));
        assert!(sql.ends_with("ORDER BY d.created_at DESC, d.id ASC"));
    }

    #[test]
    fn price_order_puts_nulls_last() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_discovery_order(&mut qb, OfferSort::PriceAsc);
        assert!(qb.sql().contains("ASC NULLS LAST, d.created_at DESC"));
    }

    #[test]
    fn geo_query_binds_origin_and_radius() {
        let Ok(query) = OfferQuery::parse(
            OfferQueryInput {
                lat: Some(41.39),
                lng: Some(2.17),
                radius_km: Some(3.0),
                sort: Some("nearest".to_string()),
                ..Default::default()
            },
            Utc::now(),
        ) else {
            panic!("origin with radius should parse");
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT d.* FROM ");
        push_discovery_rows(&mut qb, &query);
        push_discovery_order(&mut qb, query.sort);
        let sql = qb.sql();
        assert!(sql.contains("asin(LEAST(1.0"));
        assert!(sql.contains("d.distance_km <= $"));
        assert!(sql.contains("d.distance_km ASC NULLS LAST"));
    }
}
