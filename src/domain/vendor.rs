//! Vendors (approval-gated merchant profiles) and their shops.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{GeoPoint, UnknownVariant};

/// Moderation state of a vendor.
///
/// Every vendor starts `Pending`. Only an admin moves it to `Approved` or
/// `Rejected`, and nothing moves it back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    /// Awaiting review.
    Pending,
    /// Visible to shoppers; may publish offers.
    Approved,
    /// Hidden; may not publish offers.
    Rejected,
}

impl VendorStatus {
    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether an admin may move a vendor from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        !matches!(next, Self::Pending)
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant::new(
                "status",
                other,
                "pending, approved, rejected",
            )),
        }
    }
}

impl TryFrom<String> for VendorStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A merchant profile owned by one user.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Vendor {
    /// Vendor identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Public business name.
    pub business_name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Logo URL.
    pub logo_url: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Home city.
    pub city_id: Uuid,
    /// Latitude of the storefront.
    pub latitude: Option<f64>,
    /// Longitude of the storefront.
    pub longitude: Option<f64>,
    /// Moderation state.
    #[sqlx(try_from = "String")]
    pub status: VendorStatus,
    /// Mean review rating, 0 when unrated.
    pub rating: f64,
    /// Number of reviews.
    pub review_count: i64,
    /// Number of followers.
    pub follower_count: i64,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last profile change.
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// Storefront location, when both coordinates are known.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}

/// Fields required to register a vendor.
#[derive(Debug, Clone)]
pub struct NewVendor {
    /// Owning user.
    pub user_id: Uuid,
    /// Public business name.
    pub business_name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Logo URL.
    pub logo_url: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Home city.
    pub city_id: Uuid,
    /// Storefront location.
    pub location: Option<GeoPoint>,
}

/// Partial vendor profile update.
#[derive(Debug, Clone, Default)]
pub struct VendorPatch {
    /// New business name.
    pub business_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New logo URL.
    pub logo_url: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New home city. Existing offers keep their own city.
    pub city_id: Option<Uuid>,
    /// New storefront location.
    pub location: Option<GeoPoint>,
}

impl VendorPatch {
    /// Applies the patch in place.
    pub fn apply(self, vendor: &mut Vendor) {
        if let Some(v) = self.business_name {
            vendor.business_name = v;
        }
        if let Some(v) = self.description {
            vendor.description = Some(v);
        }
        if let Some(v) = self.logo_url {
            vendor.logo_url = Some(v);
        }
        if let Some(v) = self.phone {
            vendor.phone = Some(v);
        }
        if let Some(v) = self.address {
            vendor.address = Some(v);
        }
        if let Some(v) = self.city_id {
            vendor.city_id = v;
        }
        if let Some(p) = self.location {
            vendor.latitude = Some(p.lat);
            vendor.longitude = Some(p.lng);
        }
        vendor.updated_at = Utc::now();
    }
}

/// Filters for vendor listings.
#[derive(Debug, Clone, Default)]
pub struct VendorFilter {
    /// Only vendors in this state.
    pub status: Option<VendorStatus>,
    /// Only vendors in this city.
    pub city_id: Option<Uuid>,
    /// Case-insensitive substring of the business name.
    pub search: Option<String>,
}

impl VendorFilter {
    /// In-memory predicate mirroring the SQL filter.
    #[must_use]
    pub fn matches(&self, vendor: &Vendor) -> bool {
        if let Some(status) = self.status
            && vendor.status != status
        {
            return false;
        }
        if let Some(city_id) = self.city_id
            && vendor.city_id != city_id
        {
            return false;
        }
        if let Some(term) = &self.search
            && !vendor
                .business_name
                .to_lowercase()
                .contains(&term.to_lowercase())
        {
            return false;
        }
        true
    }
}

/// A branch location of a vendor.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Shop {
    /// Shop identifier.
    pub id: Uuid,
    /// Owning vendor.
    pub vendor_id: Uuid,
    /// Branch name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// City the branch is in.
    pub city_id: Uuid,
    /// Branch latitude.
    pub latitude: f64,
    /// Branch longitude.
    pub longitude: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Shop {
    /// Branch location.
    #[must_use]
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// Fields required to add a shop.
#[derive(Debug, Clone)]
pub struct NewShop {
    /// Owning vendor.
    pub vendor_id: Uuid,
    /// Branch name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// City the branch is in.
    pub city_id: Uuid,
    /// Branch location.
    pub location: GeoPoint,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn nothing_returns_to_pending() {
        for from in [
            VendorStatus::Pending,
            VendorStatus::Approved,
            VendorStatus::Rejected,
        ] {
            assert!(!from.can_transition_to(VendorStatus::Pending));
            assert!(from.can_transition_to(VendorStatus::Approved));
            assert!(from.can_transition_to(VendorStatus::Rejected));
        }
    }

    #[test]
    fn status_parses() {
        assert_eq!(
            "approved".parse::<VendorStatus>().ok(),
            Some(VendorStatus::Approved)
        );
        let Err(err) = "banned".parse::<VendorStatus>() else {
            panic!("banned is not a status");
        };
        assert!(err.to_string().contains("banned"));
    }
}
