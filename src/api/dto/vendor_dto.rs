//! Vendor, shop, and moderation DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common_dto::non_blank;
use crate::domain::geo::validate_pair;
use crate::domain::{GeoPoint, PageRequest, VendorPatch, VendorStatus};
use crate::error::ApiError;
use crate::service::{ShopDraft, VendorDraft};

/// Query parameters for `GET /vendors`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VendorListParams {
    /// Only vendors in this city.
    pub city_id: Option<Uuid>,
    /// Case-insensitive text in the business name.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page, 1 to 100.
    pub limit: Option<u32>,
}

impl VendorListParams {
    /// Clamped page window.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Request body for `POST /vendors`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterVendorRequest {
    /// Trading name.
    pub business_name: String,
    /// Home city.
    pub city_id: Uuid,
    /// About text.
    #[serde(default)]
    pub description: Option<String>,
    /// Logo URL.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Storefront latitude; requires `longitude`.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Storefront longitude; requires `latitude`.
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl RegisterVendorRequest {
    /// Validates the body and builds the draft.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] listing every problem.
    pub fn validate(self) -> Result<VendorDraft, ApiError> {
        let mut errors = Vec::new();
        if self.business_name.trim().is_empty() {
            errors.push("business_name must not be empty".to_string());
        }
        let location = validate_pair(self.latitude, self.longitude).unwrap_or_else(|e| {
            errors.push(e);
            None
        });
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        Ok(VendorDraft {
            business_name: self.business_name,
            description: non_blank(self.description),
            logo_url: non_blank(self.logo_url),
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            city_id: self.city_id,
            location,
        })
    }
}

/// Request body for `PATCH /vendors/me`. Omitted fields are unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateVendorRequest {
    /// New trading name.
    #[serde(default)]
    pub business_name: Option<String>,
    /// New about text.
    #[serde(default)]
    pub description: Option<String>,
    /// New logo URL.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// New phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// New address.
    #[serde(default)]
    pub address: Option<String>,
    /// New home city. Existing offers keep their city.
    #[serde(default)]
    pub city_id: Option<Uuid>,
    /// New latitude; requires `longitude`.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// New longitude; requires `latitude`.
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl UpdateVendorRequest {
    /// Validates the body and builds the patch.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for an incomplete or out-of-range point.
    pub fn validate(self) -> Result<VendorPatch, ApiError> {
        let location =
            validate_pair(self.latitude, self.longitude).map_err(ApiError::invalid_field)?;
        Ok(VendorPatch {
            business_name: self.business_name.map(|n| n.trim().to_string()),
            description: non_blank(self.description),
            logo_url: non_blank(self.logo_url),
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            city_id: self.city_id,
            location,
        })
    }
}

/// Request body for `POST /vendors/me/shops`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShopRequest {
    /// Branch name.
    pub name: String,
    /// City of the branch.
    pub city_id: Uuid,
    /// Branch latitude.
    pub latitude: f64,
    /// Branch longitude.
    pub longitude: f64,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
}

impl CreateShopRequest {
    /// Validates the body and builds the draft.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] listing every problem.
    pub fn validate(self) -> Result<ShopDraft, ApiError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("name must not be empty".to_string());
        }
        let location = GeoPoint::new(self.latitude, self.longitude)
            .map_err(|e| errors.push(e))
            .ok();
        match location {
            Some(location) if errors.is_empty() => Ok(ShopDraft {
                name: self.name,
                address: non_blank(self.address),
                city_id: self.city_id,
                location,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// Query parameters for `GET /admin/vendors`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminVendorListParams {
    /// `pending`, `approved`, or `rejected`; all when omitted.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page, 1 to 100.
    pub limit: Option<u32>,
}

impl AdminVendorListParams {
    /// Parses the status filter.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for an unknown status.
    pub fn status(&self) -> Result<Option<VendorStatus>, ApiError> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<VendorStatus>)
            .transpose()
            .map_err(|e| ApiError::invalid_field(e.to_string()))
    }

    /// Clamped page window.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Request body for `PATCH /admin/vendors/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorStatusRequest {
    /// `approved` or `rejected`.
    pub status: VendorStatus,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn vendor_point_must_be_complete() {
        let req = RegisterVendorRequest {
            business_name: "Deli".to_string(),
            city_id: Uuid::new_v4(),
            description: None,
            logo_url: None,
            phone: None,
            address: None,
            latitude: Some(10.0),
            longitude: None,
        };
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn shop_reports_name_and_point_together() {
        let req = CreateShopRequest {
            name: " ".to_string(),
            city_id: Uuid::new_v4(),
            latitude: 91.0,
            longitude: 0.0,
            address: None,
        };
        let Err(ApiError::Validation(messages)) = req.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn admin_status_filter_parses() {
        let params = AdminVendorListParams {
            status: Some("pending".to_string()),
            ..AdminVendorListParams::default()
        };
        assert!(matches!(params.status(), Ok(Some(VendorStatus::Pending))));

        let params = AdminVendorListParams {
            status: Some("archived".to_string()),
            ..AdminVendorListParams::default()
        };
        assert!(params.status().is_err());
    }
}
