//! Cities and categories: the reference data offers are filed under.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::GeoPoint;

/// Coarse locality used to scope offer visibility.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct City {
    /// City identifier.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Latitude of the city centre.
    pub latitude: f64,
    /// Longitude of the city centre.
    pub longitude: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl City {
    /// City centre as a point.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// Fields required to create a city.
#[derive(Debug, Clone)]
pub struct NewCity {
    /// Unique display name.
    pub name: String,
    /// Centre point.
    pub center: GeoPoint,
}

/// Offer category, e.g. "Restaurants".
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Category {
    /// Category identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Optional icon reference.
    pub icon: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Optional icon reference.
    pub icon: Option<String>,
}

/// Derives a URL slug from a display name: lowercase ASCII alphanumerics
/// separated by single dashes.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Food & Drinks"), "food-drinks");
        assert_eq!(slugify("  Spa  "), "spa");
        assert_eq!(slugify("Kids' Toys 2"), "kids-toys-2");
        assert_eq!(slugify("!!!"), "");
    }
}
