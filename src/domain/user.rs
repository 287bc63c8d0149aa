//! Marketplace user accounts and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::UnknownVariant;

/// Account role. Ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Shopper browsing offers.
    User,
    /// Owner of a vendor profile.
    Vendor,
    /// Moderator with access to `/admin`.
    Admin,
}

impl UserRole {
    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownVariant::new("role", other, "user, vendor, admin")),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A registered account. The password digest never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    /// Account identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email, stored lowercase.
    pub email: String,
    /// Salted password digest.
    #[serde(skip)]
    pub password_hash: String,
    /// Optional contact phone.
    pub phone: Option<String>,
    /// Optional avatar URL (usually an uploaded `/public/...` path).
    pub avatar_url: Option<String>,
    /// Preferred city for discovery.
    pub city_id: Option<Uuid>,
    /// Account role.
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last profile change.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email, already normalised to lowercase.
    pub email: String,
    /// Salted password digest.
    pub password_hash: String,
    /// Initial role.
    pub role: UserRole,
}

/// Partial profile update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    /// New display name.
    pub name: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
    /// New preferred city.
    pub city_id: Option<Uuid>,
    /// New password digest.
    pub password_hash: Option<String>,
    /// New role (admin only).
    pub role: Option<UserRole>,
}

impl UserPatch {
    /// Applies the patch in place.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(avatar_url) = self.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        if let Some(city_id) = self.city_id {
            user.city_id = Some(city_id);
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [UserRole::User, UserRole::Vendor, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().ok(), Some(role));
        }
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "secret-digest".to_string(),
            phone: None,
            avatar_url: None,
            city_id: None,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap_or_default();
        assert!(!json.contains("secret-digest"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
