//! Review handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{Ack, CreateReviewRequest, Envelope, PaginationParams};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::app_state::AppState;
use crate::domain::{Review, ReviewListing};
use crate::error::{ApiError, ErrorResponse};

/// `GET /vendors/{id}/reviews`: Reviews of an approved vendor, newest first.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] unless the vendor is approved.
#[utoipa::path(
    get,
    path = "/vendors/{id}/reviews",
    tag = "Reviews",
    summary = "List vendor reviews",
    params(("id" = Uuid, Path, description = "Vendor id"), PaginationParams),
    responses(
        (status = 200, description = "One page of reviews", body = Envelope<Vec<ReviewListing>>),
        (status = 404, description = "Vendor not found", body = ErrorResponse),
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.page_request();
    let page = state.reviews.list_for_vendor(id, request).await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// `POST /vendors/{id}/reviews`: Rate a vendor, once per user.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a rating outside 1..=5,
/// [`ApiError::Forbidden`] for the vendor's owner, and
/// [`ApiError::Conflict`] for a second review.
#[utoipa::path(
    post,
    path = "/vendors/{id}/reviews",
    tag = "Reviews",
    summary = "Create review",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Envelope<Review>),
        (status = 400, description = "Invalid rating", body = ErrorResponse),
        (status = 403, description = "Owner cannot review own vendor", body = ErrorResponse),
        (status = 404, description = "Vendor not found", body = ErrorResponse),
        (status = 409, description = "Already reviewed", body = ErrorResponse),
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let review = state
        .reviews
        .create(&user, id, req.rating, req.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope::new(review))))
}

/// `DELETE /reviews/{id}`: Remove a review. Author or admin.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for anyone else.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "Reviews",
    summary = "Delete review",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted", body = Envelope<Ack>),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.reviews.delete(&user, id).await?;
    Ok(Json(Envelope::new(Ack::OK)))
}

/// Review routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vendors/{id}/reviews", get(list_reviews).post(create_review))
        .route("/reviews/{id}", delete(delete_review))
}
