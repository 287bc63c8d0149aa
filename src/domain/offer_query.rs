//! Offer discovery: the filter, sort, and page contract behind `GET /offers`.
//!
//! [`OfferQuery`] is the validated form of the request parameters. Both
//! stores evaluate it with the same semantics: the in-memory store through
//! [`OfferQuery::matches`] and [`OfferQuery::compare`], the PostgreSQL store
//! by rendering the equivalent SQL.
//!
//! Only live offers (active, unexpired) of approved vendors are ever
//! returned. Every ordering ends with `created_at DESC, id ASC` so pages are
//! stable.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::geo::validate_pair;
use super::{GeoPoint, Offer, OfferListing, PageRequest, UnknownVariant, Vendor, VendorStatus};

/// Result ordering for discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OfferSort {
    /// Most viewed first.
    Popularity,
    /// Most recently created first.
    #[default]
    Newest,
    /// Lowest numeric value first; coupons last.
    PriceAsc,
    /// Highest numeric value first; coupons last.
    PriceDesc,
    /// Closest to the query location first; unlocated offers last.
    Nearest,
}

impl OfferSort {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Popularity => "popularity",
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Nearest => "nearest",
        }
    }
}

impl fmt::Display for OfferSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferSort {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popularity" => Ok(Self::Popularity),
            "newest" => Ok(Self::Newest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "nearest" => Ok(Self::Nearest),
            other => Err(UnknownVariant::new(
                "sort",
                other,
                "popularity, newest, price_asc, price_desc, nearest",
            )),
        }
    }
}

/// Raw discovery parameters as received from the client.
#[derive(Debug, Clone, Default)]
pub struct OfferQueryInput {
    /// City filter.
    pub city_id: Option<Uuid>,
    /// Featured filter.
    pub featured: Option<bool>,
    /// Sort key text.
    pub sort: Option<String>,
    /// Category filter.
    pub category_id: Option<Uuid>,
    /// Vendor filter.
    pub vendor_id: Option<Uuid>,
    /// Free-text search.
    pub search: Option<String>,
    /// Query latitude.
    pub lat: Option<f64>,
    /// Query longitude.
    pub lng: Option<f64>,
    /// Radius filter in kilometres.
    pub radius_km: Option<f64>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// A validated discovery query.
#[derive(Debug, Clone)]
pub struct OfferQuery {
    /// Only offers visible in this city.
    pub city_id: Option<Uuid>,
    /// Only featured (`true`) or non-featured (`false`) offers.
    pub featured: Option<bool>,
    /// Ordering.
    pub sort: OfferSort,
    /// Only offers in this category.
    pub category_id: Option<Uuid>,
    /// Only offers of this vendor.
    pub vendor_id: Option<Uuid>,
    /// Trimmed, non-empty search text.
    pub search: Option<String>,
    /// Location distances are measured from.
    pub origin: Option<GeoPoint>,
    /// Maximum distance from `origin`.
    pub radius_km: Option<f64>,
    /// Page window.
    pub page: PageRequest,
    /// Reference time for expiry checks.
    pub now: DateTime<Utc>,
}

impl OfferQuery {
    /// Validates raw parameters, collecting every problem.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid parameter.
    pub fn parse(input: OfferQueryInput, now: DateTime<Utc>) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let sort = match input.sort.as_deref().map(str::trim) {
            None | Some("") => OfferSort::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownVariant| {
                errors.push(e.to_string());
                OfferSort::default()
            }),
        };

        let origin = validate_pair(input.lat, input.lng).unwrap_or_else(|e| {
            errors.push(e);
            None
        });

        if let Some(radius) = input.radius_km {
            if !radius.is_finite() || radius <= 0.0 {
                errors.push(format!("radius_km must be positive, got {radius}"));
            }
            if origin.is_none() && input.lat.is_none() && input.lng.is_none() {
                errors.push("radius_km requires lat and lng".to_string());
            }
        }
        if sort == OfferSort::Nearest && input.lat.is_none() && input.lng.is_none() {
            errors.push("sort=nearest requires lat and lng".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let search = input
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            city_id: input.city_id,
            featured: input.featured,
            sort,
            category_id: input.category_id,
            vendor_id: input.vendor_id,
            search,
            origin,
            radius_km: input.radius_km,
            page: PageRequest::new(input.page, input.limit),
            now,
        })
    }

    /// A query with no filters, default sort, and first page.
    #[must_use]
    pub fn unfiltered(now: DateTime<Utc>) -> Self {
        Self {
            city_id: None,
            featured: None,
            sort: OfferSort::default(),
            category_id: None,
            vendor_id: None,
            search: None,
            origin: None,
            radius_km: None,
            page: PageRequest::default(),
            now,
        }
    }

    /// Distance from the query origin to `location`, if both are known.
    #[must_use]
    pub fn distance_to(&self, location: Option<GeoPoint>) -> Option<f64> {
        let origin = self.origin?;
        location.map(|p| origin.distance_km(&p))
    }

    /// Whether a candidate offer passes every filter.
    ///
    /// `distance_km` is the value [`OfferQuery::distance_to`] produced for the
    /// offer's location.
    #[must_use]
    pub fn matches(&self, offer: &Offer, vendor: &Vendor, distance_km: Option<f64>) -> bool {
        if vendor.status != VendorStatus::Approved || !offer.is_live(self.now) {
            return false;
        }
        if self.city_id.is_some_and(|id| offer.city_id != id) {
            return false;
        }
        if self.featured.is_some_and(|f| offer.is_featured != f) {
            return false;
        }
        if self
            .category_id
            .is_some_and(|id| offer.category_id != Some(id))
        {
            return false;
        }
        if self.vendor_id.is_some_and(|id| offer.vendor_id != id) {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let in_title = offer.title.to_lowercase().contains(&term);
            let in_description = offer
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(radius) = self.radius_km
            && distance_km.is_none_or(|d| d > radius)
        {
            return false;
        }
        true
    }

    /// Total order used to rank matching listings.
    #[must_use]
    pub fn compare(&self, a: &OfferListing, b: &OfferListing) -> Ordering {
        let primary = match self.sort {
            OfferSort::Popularity => b.offer.views.cmp(&a.offer.views),
            OfferSort::Newest => Ordering::Equal,
            OfferSort::PriceAsc => {
                nulls_last(a.offer.price_value(), b.offer.price_value(), |x, y| {
                    x.total_cmp(&y)
                })
            }
            OfferSort::PriceDesc => {
                nulls_last(a.offer.price_value(), b.offer.price_value(), |x, y| {
                    y.total_cmp(&x)
                })
            }
            OfferSort::Nearest => nulls_last(a.distance_km, b.distance_km, |x, y| x.total_cmp(&y)),
        };
        primary
            .then_with(|| b.offer.created_at.cmp(&a.offer.created_at))
            .then_with(|| a.offer.id.cmp(&b.offer.id))
    }
}

/// Orders two optional values with `None` after every `Some`.
fn nulls_last(a: Option<f64>, b: Option<f64>, cmp: impl Fn(f64, f64) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
