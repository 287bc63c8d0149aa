//! Offers: discounts, coupons, and vouchers published by vendors.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::UnknownVariant;

/// Kind of deal an offer represents. Decides which value field is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    /// Percentage off; uses `discount_percentage`.
    Discount,
    /// Redeemable code; uses `coupon_code`.
    Coupon,
    /// Prepaid value; uses `voucher_value`.
    Voucher,
}

impl OfferType {
    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Discount => "discount",
            Self::Coupon => "coupon",
            Self::Voucher => "voucher",
        }
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discount" => Ok(Self::Discount),
            "coupon" => Ok(Self::Coupon),
            "voucher" => Ok(Self::Voucher),
            other => Err(UnknownVariant::new(
                "offer_type",
                other,
                "discount, coupon, voucher",
            )),
        }
    }
}

impl TryFrom<String> for OfferType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The type-specific value of an offer. Exactly one is carried.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferValue {
    /// Percentage off, `0 < p <= 100`.
    Discount(f64),
    /// Non-empty code.
    Coupon(String),
    /// Positive prepaid amount.
    Voucher(f64),
}

impl OfferValue {
    /// Assembles and validates the value for `offer_type` from the three
    /// optional request columns. Columns not used by the type are ignored.
    ///
    /// # Errors
    ///
    /// Returns a message describing the missing or invalid field.
    pub fn from_parts(
        offer_type: OfferType,
        discount_percentage: Option<f64>,
        coupon_code: Option<&str>,
        voucher_value: Option<f64>,
    ) -> Result<Self, String> {
        match offer_type {
            OfferType::Discount => match discount_percentage {
                Some(p) if p.is_finite() && p > 0.0 && p <= 100.0 => Ok(Self::Discount(p)),
                Some(p) => Err(format!(
                    "discount_percentage must be within (0, 100], got {p}"
                )),
                None => Err("discount_percentage is required for discount offers".to_string()),
            },
            OfferType::Coupon => match coupon_code.map(str::trim) {
                Some(code) if !code.is_empty() => Ok(Self::Coupon(code.to_string())),
                _ => Err("coupon_code is required for coupon offers".to_string()),
            },
            OfferType::Voucher => match voucher_value {
                Some(v) if v.is_finite() && v > 0.0 => Ok(Self::Voucher(v)),
                Some(v) => Err(format!("voucher_value must be positive, got {v}")),
                None => Err("voucher_value is required for voucher offers".to_string()),
            },
        }
    }

    /// The offer type this value belongs to.
    #[must_use]
    pub const fn offer_type(&self) -> OfferType {
        match self {
            Self::Discount(_) => OfferType::Discount,
            Self::Coupon(_) => OfferType::Coupon,
            Self::Voucher(_) => OfferType::Voucher,
        }
    }

    /// Splits into the `(discount_percentage, coupon_code, voucher_value)`
    /// columns.
    #[must_use]
    pub fn into_columns(self) -> (Option<f64>, Option<String>, Option<f64>) {
        match self {
            Self::Discount(p) => (Some(p), None, None),
            Self::Coupon(code) => (None, Some(code), None),
            Self::Voucher(v) => (None, None, Some(v)),
        }
    }
}

/// A published deal.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Offer {
    /// Offer identifier.
    pub id: Uuid,
    /// Publishing vendor.
    pub vendor_id: Uuid,
    /// City the offer is visible in. Independent of the vendor's city.
    pub city_id: Uuid,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Optional branch the offer is redeemable at.
    pub shop_id: Option<Uuid>,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: Option<String>,
    /// Image URL.
    pub image_url: Option<String>,
    /// Kind of deal.
    #[sqlx(try_from = "String")]
    pub offer_type: OfferType,
    /// Percentage off for discounts.
    pub discount_percentage: Option<f64>,
    /// Code for coupons.
    pub coupon_code: Option<String>,
    /// Amount for vouchers.
    pub voucher_value: Option<f64>,
    /// Promoted by an admin.
    pub is_featured: bool,
    /// Hidden from discovery when `false`.
    pub is_active: bool,
    /// Detail page views.
    pub views: i64,
    /// Optional end of validity.
    pub expires_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Numeric value used by price ordering: the discount percentage for
    /// discounts, the voucher value for vouchers, nothing for coupons.
    #[must_use]
    pub fn price_value(&self) -> Option<f64> {
        match self.offer_type {
            OfferType::Discount => self.discount_percentage,
            OfferType::Voucher => self.voucher_value,
            OfferType::Coupon => None,
        }
    }

    /// Whether the offer is active and unexpired at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|at| at > now)
    }
}

/// Fields required to create an offer.
#[derive(Debug, Clone)]
pub struct NewOffer {
    /// Publishing vendor.
    pub vendor_id: Uuid,
    /// City the offer is visible in.
    pub city_id: Uuid,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Optional branch.
    pub shop_id: Option<Uuid>,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: Option<String>,
    /// Image URL.
    pub image_url: Option<String>,
    /// Validated type-specific value.
    pub value: OfferValue,
    /// Optional end of validity.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial offer update. Owners edit content; admins toggle flags.
#[derive(Debug, Clone, Default)]
pub struct OfferPatch {
    /// New headline.
    pub title: Option<String>,
    /// New body text.
    pub description: Option<String>,
    /// New image URL.
    pub image_url: Option<String>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New type and value, already validated together.
    pub value: Option<OfferValue>,
    /// New expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// New featured flag.
    pub is_featured: Option<bool>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl OfferPatch {
    /// Applies the patch in place.
    pub fn apply(self, offer: &mut Offer) {
        if let Some(v) = self.title {
            offer.title = v;
        }
        if let Some(v) = self.description {
            offer.description = Some(v);
        }
        if let Some(v) = self.image_url {
            offer.image_url = Some(v);
        }
        if let Some(v) = self.category_id {
            offer.category_id = Some(v);
        }
        if let Some(value) = self.value {
            offer.offer_type = value.offer_type();
            let (discount, coupon, voucher) = value.into_columns();
            offer.discount_percentage = discount;
            offer.coupon_code = coupon;
            offer.voucher_value = voucher;
        }
        if let Some(v) = self.expires_at {
            offer.expires_at = Some(v);
        }
        if let Some(v) = self.is_featured {
            offer.is_featured = v;
        }
        if let Some(v) = self.is_active {
            offer.is_active = v;
        }
        offer.updated_at = Utc::now();
    }
}

/// An offer as returned by discovery: the offer plus the vendor name and,
/// when the query carried a location, the distance to it.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OfferListing {
    /// The offer itself.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub offer: Offer,
    /// Business name of the publishing vendor.
    pub vendor_name: String,
    /// Distance in kilometres from the query location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}
