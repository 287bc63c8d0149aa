//! Vendor reviews. The store keeps each vendor's `rating` and
//! `review_count` in step with its reviews.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::review::{MAX_RATING, MIN_RATING};
use crate::domain::{
    NewReview, PageRequest, Paged, Review, ReviewListing, User, UserRole, Vendor, VendorStatus,
};
use crate::error::ApiError;
use crate::persistence::Store;

/// Review operations over the store.
#[derive(Debug, Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
}

impl ReviewService {
    /// Creates the service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reviews of an approved vendor, newest first.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the vendor is not publicly visible.
    pub async fn list_for_vendor(
        &self,
        vendor_id: Uuid,
        page: PageRequest,
    ) -> Result<Paged<ReviewListing>, ApiError> {
        self.require_public_vendor(vendor_id).await?;
        self.store.list_reviews(Some(vendor_id), page).await
    }

    /// Every review, newest first, for moderation.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_all(&self, page: PageRequest) -> Result<Paged<ReviewListing>, ApiError> {
        self.store.list_reviews(None, page).await
    }

    /// Posts the author's single review of a vendor.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for an out-of-range rating;
    /// [`ApiError::Forbidden`] when reviewing one's own vendor;
    /// [`ApiError::Conflict`] on a second review of the same vendor.
    pub async fn create(
        &self,
        author: &User,
        vendor_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, ApiError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ApiError::invalid_field(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
            )));
        }
        let vendor = self.require_public_vendor(vendor_id).await?;
        if vendor.user_id == author.id {
            return Err(ApiError::Forbidden(
                "vendors cannot review themselves".to_string(),
            ));
        }
        let review = self
            .store
            .create_review(NewReview {
                vendor_id,
                user_id: author.id,
                rating,
                comment: comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            })
            .await?;
        tracing::info!(review_id = %review.id, %vendor_id, rating, "review posted");
        Ok(review)
    }

    /// Deletes a review. Only its author or an admin may.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown review; [`ApiError::Forbidden`]
    /// for anyone else.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), ApiError> {
        let review = self
            .store
            .get_review(id)
            .await?
            .ok_or_else(|| ApiError::not_found("review", id))?;
        if review.user_id != actor.id && actor.role != UserRole::Admin {
            return Err(ApiError::Forbidden(
                "only the author or an admin may delete a review".to_string(),
            ));
        }
        self.store.delete_review(id).await?;
        tracing::info!(review_id = %id, deleted_by = %actor.id, "review deleted");
        Ok(())
    }

    async fn require_public_vendor(&self, vendor_id: Uuid) -> Result<Vendor, ApiError> {
        self.store
            .get_vendor(vendor_id)
            .await?
            .filter(|v| v.status == VendorStatus::Approved)
            .ok_or_else(|| ApiError::not_found("vendor", vendor_id))
    }
}
