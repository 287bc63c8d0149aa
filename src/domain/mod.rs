//! Domain layer: marketplace records and the offer discovery contract.
//!
//! Records derive `sqlx::FromRow` so the PostgreSQL store can read them
//! directly, and `utoipa::ToSchema` so handlers can document them.

pub mod catalog;
pub mod content;
pub mod geo;
pub mod offer;
pub mod offer_query;
pub mod pagination;
pub mod review;
pub mod user;
pub mod vendor;

pub use catalog::{Category, City, NewCategory, NewCity};
pub use content::{Page, Setting};
pub use geo::GeoPoint;
pub use offer::{NewOffer, Offer, OfferListing, OfferPatch, OfferType, OfferValue};
pub use offer_query::{OfferQuery, OfferQueryInput, OfferSort};
pub use pagination::{PageRequest, Paged};
pub use review::{NewReview, Review, ReviewListing};
pub use user::{NewUser, User, UserPatch, UserRole};
pub use vendor::{NewShop, NewVendor, Shop, Vendor, VendorFilter, VendorPatch, VendorStatus};

/// A text value that does not name any variant of a domain enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} `{value}`; expected one of: {expected}")]
pub struct UnknownVariant {
    /// Field being parsed, e.g. `"sort"`.
    pub field: &'static str,
    /// Rejected input.
    pub value: String,
    /// Accepted values, comma separated.
    pub expected: &'static str,
}

impl UnknownVariant {
    /// Creates the error for `value` of `field`.
    #[must_use]
    pub fn new(field: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            field,
            value: value.to_string(),
            expected,
        }
    }
}
