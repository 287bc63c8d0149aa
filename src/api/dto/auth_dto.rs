//! Authentication and profile DTOs.

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common_dto::non_blank;
use crate::service::{ProfileChanges, Registration};

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address (case-insensitive, unique).
    pub email: String,
    /// Password, at least 8 characters.
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Registered email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Request body for `PATCH /auth/profile`. Omitted fields are unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// New avatar URL, typically from `POST /media/upload`.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// New home city.
    #[serde(default)]
    pub city_id: Option<Uuid>,
    /// New password, at least 8 characters.
    #[serde(default)]
    pub password: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            phone: non_blank(req.phone),
            avatar_url: non_blank(req.avatar_url),
            city_id: req.city_id,
            password: req.password,
        }
    }
}
