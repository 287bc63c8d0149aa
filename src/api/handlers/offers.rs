//! Offer handlers: public discovery, vendor publishing, and favorites.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    Ack, CreateOfferRequest, Envelope, OfferListParams, PaginationParams, UpdateOfferRequest,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::app_state::AppState;
use crate::domain::{Offer, OfferListing};
use crate::error::{ApiError, ErrorResponse};

/// `GET /offers`: Discover offers.
///
/// Only active, unexpired offers of approved vendors are listed. With
/// `lat`/`lng` every item carries `distance_km`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for an unknown sort, partial
/// coordinates, or a radius without coordinates.
#[utoipa::path(
    get,
    path = "/offers",
    tag = "Offers",
    summary = "Discover offers",
    description = "Filters, sorts, and paginates publicly visible offers.",
    params(OfferListParams),
    responses(
        (status = 200, description = "One page of offers", body = Envelope<Vec<OfferListing>>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    )
)]
pub async fn list_offers(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<OfferListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, request) = state.offers.discover(params.into()).await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// `POST /offers`: Publish an offer for the caller's approved vendor.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] without an approved vendor, and
/// [`ApiError::Validation`] for bad input.
#[utoipa::path(
    post,
    path = "/offers",
    tag = "Offers",
    summary = "Create offer",
    security(("bearer" = [])),
    request_body = CreateOfferRequest,
    responses(
        (status = 201, description = "Offer created", body = Envelope<Offer>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "No approved vendor", body = ErrorResponse),
    )
)]
pub async fn create_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<CreateOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = req.validate()?;
    let offer = state.offers.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(Envelope::new(offer))))
}

/// `GET /offers/{id}`: Offer detail. Counts as a view.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] unless the offer is publicly visible.
#[utoipa::path(
    get,
    path = "/offers/{id}",
    tag = "Offers",
    summary = "Get offer",
    params(("id" = Uuid, Path, description = "Offer id")),
    responses(
        (status = 200, description = "Offer detail", body = Envelope<OfferListing>),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn get_offer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = state.offers.view(id).await?;
    Ok(Json(Envelope::new(offer)))
}

/// `PATCH /offers/{id}`: Edit one of the caller's offers.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] when the caller does not own it.
#[utoipa::path(
    patch,
    path = "/offers/{id}",
    tag = "Offers",
    summary = "Update offer",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Offer id")),
    request_body = UpdateOfferRequest,
    responses(
        (status = 200, description = "Updated offer", body = Envelope<Offer>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn update_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = req.validate()?;
    let offer = state.offers.update(&user, id, patch).await?;
    Ok(Json(Envelope::new(offer)))
}

/// `DELETE /offers/{id}`: Remove an offer. Owner or admin.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for anyone else.
#[utoipa::path(
    delete,
    path = "/offers/{id}",
    tag = "Offers",
    summary = "Delete offer",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Offer id")),
    responses(
        (status = 200, description = "Offer deleted", body = Envelope<Ack>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn delete_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.offers.delete(&user, id).await?;
    Ok(Json(Envelope::new(Ack::OK)))
}

/// `POST /offers/{id}/favorite`: Save an offer. Idempotent.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown offer.
#[utoipa::path(
    post,
    path = "/offers/{id}/favorite",
    tag = "Favorites",
    summary = "Add favorite",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Offer id")),
    responses(
        (status = 200, description = "Saved", body = Envelope<Ack>),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.offers.add_favorite(user.id, id).await?;
    Ok(Json(Envelope::new(Ack::OK)))
}

/// `DELETE /offers/{id}/favorite`: Forget a saved offer. Idempotent.
///
/// # Errors
///
/// Propagates storage failures.
#[utoipa::path(
    delete,
    path = "/offers/{id}/favorite",
    tag = "Favorites",
    summary = "Remove favorite",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Offer id")),
    responses(
        (status = 200, description = "Removed", body = Envelope<Ack>),
    )
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.offers.remove_favorite(user.id, id).await?;
    Ok(Json(Envelope::new(Ack::OK)))
}

/// `GET /favorites`: The caller's saved offers, newest save first.
///
/// # Errors
///
/// Propagates storage failures.
#[utoipa::path(
    get,
    path = "/favorites",
    tag = "Favorites",
    summary = "List favorites",
    security(("bearer" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Saved offers", body = Envelope<Vec<Offer>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.page_request();
    let page = state.offers.favorites(user.id, request).await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// Offer and favorite routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(list_offers).post(create_offer))
        .route(
            "/offers/{id}",
            get(get_offer).patch(update_offer).delete(delete_offer),
        )
        .route(
            "/offers/{id}/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route("/favorites", get(list_favorites))
}
