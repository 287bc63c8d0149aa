//! Catalog, content, and admin user DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{GeoPoint, PageRequest, UserRole};
use crate::error::ApiError;

/// Request body for `POST /admin/cities`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCityRequest {
    /// City name, unique.
    pub name: String,
    /// Centre latitude.
    pub latitude: f64,
    /// Centre longitude.
    pub longitude: f64,
}

impl CreateCityRequest {
    /// Validates the centre point.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for out-of-range coordinates.
    pub fn center(&self) -> Result<GeoPoint, ApiError> {
        GeoPoint::new(self.latitude, self.longitude).map_err(ApiError::invalid_field)
    }
}

/// Request body for `POST /admin/categories`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    /// Display name.
    pub name: String,
    /// URL slug; derived from the name when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    /// Icon reference.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Request body for `PUT /admin/pages/{slug}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertPageRequest {
    /// Page title.
    pub title: String,
    /// Page body.
    #[serde(default)]
    pub content: String,
}

/// Request body for `PUT /admin/settings/{key}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertSettingRequest {
    /// New value.
    pub value: String,
}

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    /// Case-insensitive text in the name or email.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page, 1 to 100.
    pub limit: Option<u32>,
}

impl UserListParams {
    /// Clamped page window.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Request body for `PATCH /admin/users/{id}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminUpdateUserRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New role.
    #[serde(default)]
    pub role: Option<UserRole>,
}
