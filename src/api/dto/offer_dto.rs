//! Offer DTOs: discovery parameters and publishing bodies.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common_dto::non_blank;
use crate::domain::{OfferPatch, OfferQueryInput, OfferType, OfferValue};
use crate::error::ApiError;
use crate::service::OfferDraft;

/// Query parameters for `GET /offers`. Every filter is optional.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OfferListParams {
    /// Only offers visible in this city.
    pub city_id: Option<Uuid>,
    /// `true` for featured offers only, `false` for the rest.
    pub featured: Option<bool>,
    /// `popularity`, `newest` (default), `price_asc`, `price_desc`, or
    /// `nearest`.
    pub sort: Option<String>,
    /// Only offers in this category.
    pub category_id: Option<Uuid>,
    /// Only offers of this vendor.
    pub vendor_id: Option<Uuid>,
    /// Case-insensitive text in the title or description.
    pub search: Option<String>,
    /// Latitude of the caller; requires `lng`.
    pub lat: Option<f64>,
    /// Longitude of the caller; requires `lat`. Also accepted as `long`.
    #[serde(alias = "long")]
    pub lng: Option<f64>,
    /// Maximum distance in kilometres; requires `lat` and `lng`.
    pub radius_km: Option<f64>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page, 1 to 100.
    pub limit: Option<u32>,
}

impl From<OfferListParams> for OfferQueryInput {
    fn from(p: OfferListParams) -> Self {
        Self {
            city_id: p.city_id,
            featured: p.featured,
            sort: p.sort,
            category_id: p.category_id,
            vendor_id: p.vendor_id,
            search: p.search,
            lat: p.lat,
            lng: p.lng,
            radius_km: p.radius_km,
            page: p.page,
            limit: p.limit,
        }
    }
}

/// Request body for `POST /offers`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOfferRequest {
    /// Headline.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub description: Option<String>,
    /// Image URL, typically from `POST /media/upload`.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Kind of deal; decides which value field is required.
    pub offer_type: OfferType,
    /// Required for `discount`: `0 < p <= 100`.
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    /// Required for `coupon`: non-empty code.
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Required for `voucher`: positive amount.
    #[serde(default)]
    pub voucher_value: Option<f64>,
    /// Visibility city; defaults to the vendor's city.
    #[serde(default)]
    pub city_id: Option<Uuid>,
    /// Optional category.
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Optional branch of the publishing vendor.
    #[serde(default)]
    pub shop_id: Option<Uuid>,
    /// Optional end of validity.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateOfferRequest {
    /// Validates the body and builds the draft. Value fields not used by
    /// `offer_type` are dropped.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] listing every problem.
    pub fn validate(self) -> Result<OfferDraft, ApiError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title must not be empty".to_string());
        }
        let value = OfferValue::from_parts(
            self.offer_type,
            self.discount_percentage,
            self.coupon_code.as_deref(),
            self.voucher_value,
        )
        .map_err(|e| errors.push(e))
        .ok();

        match value {
            Some(value) if errors.is_empty() => Ok(OfferDraft {
                city_id: self.city_id,
                category_id: self.category_id,
                shop_id: self.shop_id,
                title: self.title,
                description: non_blank(self.description),
                image_url: non_blank(self.image_url),
                value,
                expires_at: self.expires_at,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// Request body for `PATCH /offers/{id}`. Omitted fields are unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOfferRequest {
    /// New headline.
    #[serde(default)]
    pub title: Option<String>,
    /// New body text.
    #[serde(default)]
    pub description: Option<String>,
    /// New image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// New category.
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// New kind of deal; required whenever a value field changes.
    #[serde(default)]
    pub offer_type: Option<OfferType>,
    /// New discount percentage.
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    /// New coupon code.
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// New voucher amount.
    #[serde(default)]
    pub voucher_value: Option<f64>,
    /// New expiry.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Pause (`false`) or resume (`true`) the offer.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UpdateOfferRequest {
    /// Validates the body and builds the patch.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] listing every problem.
    pub fn validate(self) -> Result<OfferPatch, ApiError> {
        let mut errors = Vec::new();
        let touches_value = self.discount_percentage.is_some()
            || self.coupon_code.is_some()
            || self.voucher_value.is_some();

        let value = match self.offer_type {
            Some(offer_type) => OfferValue::from_parts(
                offer_type,
                self.discount_percentage,
                self.coupon_code.as_deref(),
                self.voucher_value,
            )
            .map_err(|e| errors.push(e))
            .ok(),
            None => {
                if touches_value {
                    errors.push(
                        "offer_type is required when changing the offer value".to_string(),
                    );
                }
                None
            }
        };
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok(OfferPatch {
            title: self.title,
            description: non_blank(self.description),
            image_url: non_blank(self.image_url),
            category_id: self.category_id,
            value,
            expires_at: self.expires_at,
            is_featured: None,
            is_active: self.is_active,
        })
    }
}

/// Request body for `PATCH /admin/offers/{id}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ModerateOfferRequest {
    /// Promote or demote the offer.
    #[serde(default)]
    pub is_featured: Option<bool>,
    /// Enable or disable the offer.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ModerateOfferRequest {
    /// Requires at least one flag.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when both flags are absent.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.is_featured.is_none() && self.is_active.is_none() {
            return Err(ApiError::invalid_field(
                "provide is_featured and/or is_active",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn create(offer_type: OfferType) -> CreateOfferRequest {
        CreateOfferRequest {
            title: "Deal".to_string(),
            description: Some("  ".to_string()),
            image_url: None,
            offer_type,
            discount_percentage: Some(20.0),
            coupon_code: Some("SAVE20".to_string()),
            voucher_value: None,
            city_id: None,
            category_id: None,
            shop_id: None,
            expires_at: None,
        }
    }

    #[test]
    fn irrelevant_value_fields_are_dropped() {
        let Ok(draft) = create(OfferType::Coupon).validate() else {
            panic!("expected valid draft");
        };
        assert_eq!(draft.value, OfferValue::Coupon("SAVE20".to_string()));
        assert_eq!(draft.description, None);
    }

    #[test]
    fn missing_value_and_title_are_both_reported() {
        let mut req = create(OfferType::Voucher);
        req.title = String::new();
        let Err(ApiError::Validation(messages)) = req.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn value_change_requires_type() {
        let req = UpdateOfferRequest {
            discount_percentage: Some(30.0),
            ..UpdateOfferRequest::default()
        };
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));

        let req = UpdateOfferRequest {
            offer_type: Some(OfferType::Discount),
            discount_percentage: Some(30.0),
            ..UpdateOfferRequest::default()
        };
        let Ok(patch) = req.validate() else {
            panic!("expected valid patch");
        };
        assert_eq!(patch.value, Some(OfferValue::Discount(30.0)));
    }

    #[test]
    fn long_is_an_alias_for_lng() {
        let Ok(params) =
            parse_query("lat=41.4&long=2.17&sort=nearest&featured=true")
        else {
            panic!("query should parse");
        };
        assert_eq!(params.lng, Some(2.17));
        assert_eq!(params.featured, Some(true));
    }

    fn parse_query(query: &str) -> Result<OfferListParams, String> {
        let uri: axum::http::Uri = format!("/offers?{query}")
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| e.to_string())?;
        axum::extract::Query::<OfferListParams>::try_from_uri(&uri)
            .map(|q| q.0)
            .map_err(|e| e.body_text())
    }
}
