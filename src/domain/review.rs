//! Vendor reviews and the rating aggregate they feed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lowest accepted star rating.
pub const MIN_RATING: i32 = 1;
/// Highest accepted star rating.
pub const MAX_RATING: i32 = 5;

/// A user's rating of a vendor. At most one per (user, vendor).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Review {
    /// Review identifier.
    pub id: Uuid,
    /// Reviewed vendor.
    pub vendor_id: Uuid,
    /// Author.
    pub user_id: Uuid,
    /// Stars, `MIN_RATING..=MAX_RATING`.
    pub rating: i32,
    /// Optional text.
    pub comment: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A review with its author's display name.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReviewListing {
    /// The review itself.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub review: Review,
    /// Author's display name.
    pub author_name: String,
}

/// Fields required to post a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    /// Reviewed vendor.
    pub vendor_id: Uuid,
    /// Author.
    pub user_id: Uuid,
    /// Stars.
    pub rating: i32,
    /// Optional text.
    pub comment: Option<String>,
}

/// Mean of `ratings`, or 0 when there are none.
#[must_use]
pub fn mean_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / ratings.len() as f64;
    mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_nothing_is_zero() {
        assert!(mean_rating(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn mean_of_ratings() {
        assert!((mean_rating(&[5, 4, 3]) - 4.0).abs() < f64::EPSILON);
        assert!((mean_rating(&[5, 4]) - 4.5).abs() < f64::EPSILON);
    }
}
