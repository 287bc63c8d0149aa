//! Vendor handlers: public directory, the caller's own vendor and shops,
//! and follows.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    CreateShopRequest, Envelope, PaginationParams, RegisterVendorRequest, UpdateVendorRequest,
    VendorListParams,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::app_state::AppState;
use crate::domain::{Offer, Shop, Vendor};
use crate::error::{ApiError, ErrorResponse};

/// `GET /vendors`: Approved vendors.
///
/// # Errors
///
/// Propagates storage failures.
#[utoipa::path(
    get,
    path = "/vendors",
    tag = "Vendors",
    summary = "List vendors",
    params(VendorListParams),
    responses(
        (status = 200, description = "One page of approved vendors", body = Envelope<Vec<Vendor>>),
    )
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<VendorListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.page_request();
    let page = state
        .vendors
        .list_public(params.city_id, params.search, request)
        .await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// `POST /vendors`: Apply as a vendor. The profile starts `pending`.
///
/// # Errors
///
/// Returns [`ApiError::Conflict`] when the caller already has a vendor.
#[utoipa::path(
    post,
    path = "/vendors",
    tag = "Vendors",
    summary = "Register vendor",
    security(("bearer" = [])),
    request_body = RegisterVendorRequest,
    responses(
        (status = 201, description = "Vendor created, pending approval", body = Envelope<Vendor>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Caller already has a vendor", body = ErrorResponse),
    )
)]
pub async fn register_vendor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<RegisterVendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = req.validate()?;
    let vendor = state.vendors.register(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(Envelope::new(vendor))))
}

/// `GET /vendors/me`: The caller's vendor, in any status.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has none.
#[utoipa::path(
    get,
    path = "/vendors/me",
    tag = "Vendors",
    summary = "My vendor",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Vendor profile", body = Envelope<Vendor>),
        (status = 404, description = "No vendor", body = ErrorResponse),
    )
)]
pub async fn get_my_vendor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state.vendors.get_mine(user.id).await?;
    Ok(Json(Envelope::new(vendor)))
}

/// `PATCH /vendors/me`: Edit the caller's vendor. Status is unaffected.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for bad input.
#[utoipa::path(
    patch,
    path = "/vendors/me",
    tag = "Vendors",
    summary = "Update my vendor",
    security(("bearer" = [])),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Updated vendor", body = Envelope<Vendor>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "No vendor", body = ErrorResponse),
    )
)]
pub async fn update_my_vendor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<UpdateVendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = req.validate()?;
    let vendor = state.vendors.update_mine(user.id, patch).await?;
    Ok(Json(Envelope::new(vendor)))
}

/// `GET /vendors/me/offers`: Every offer of the caller's vendor,
/// including paused and expired ones.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no vendor.
#[utoipa::path(
    get,
    path = "/vendors/me/offers",
    tag = "Vendors",
    summary = "My offers",
    security(("bearer" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of offers", body = Envelope<Vec<Offer>>),
        (status = 404, description = "No vendor", body = ErrorResponse),
    )
)]
pub async fn list_my_offers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.page_request();
    let page = state.offers.list_mine(&user, request).await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// `GET /vendors/me/shops`: Branches of the caller's vendor.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the caller has no vendor.
#[utoipa::path(
    get,
    path = "/vendors/me/shops",
    tag = "Vendors",
    summary = "My shops",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Shops", body = Envelope<Vec<Shop>>),
        (status = 404, description = "No vendor", body = ErrorResponse),
    )
)]
pub async fn list_my_shops(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let shops = state.vendors.list_my_shops(user.id).await?;
    Ok(Json(Envelope::new(shops)))
}

/// `POST /vendors/me/shops`: Add a branch to the caller's vendor.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for bad input or an unknown city.
#[utoipa::path(
    post,
    path = "/vendors/me/shops",
    tag = "Vendors",
    summary = "Create shop",
    security(("bearer" = [])),
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop created", body = Envelope<Shop>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "No vendor", body = ErrorResponse),
    )
)]
pub async fn create_shop(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<CreateShopRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = req.validate()?;
    let shop = state.vendors.create_shop(user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(Envelope::new(shop))))
}

/// `GET /vendors/{id}`: Public vendor profile.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] unless the vendor is approved.
#[utoipa::path(
    get,
    path = "/vendors/{id}",
    tag = "Vendors",
    summary = "Get vendor",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor profile", body = Envelope<Vendor>),
        (status = 404, description = "Vendor not found", body = ErrorResponse),
    )
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state.vendors.get_public(id).await?;
    Ok(Json(Envelope::new(vendor)))
}

/// `GET /vendors/{id}/shops`: Branches of an approved vendor.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] unless the vendor is approved.
#[utoipa::path(
    get,
    path = "/vendors/{id}/shops",
    tag = "Vendors",
    summary = "Vendor shops",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Shops", body = Envelope<Vec<Shop>>),
        (status = 404, description = "Vendor not found", body = ErrorResponse),
    )
)]
pub async fn list_vendor_shops(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let shops = state.vendors.list_public_shops(id).await?;
    Ok(Json(Envelope::new(shops)))
}

/// `POST /vendors/{id}/follow`: Follow a vendor. Idempotent.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] unless the vendor is approved.
#[utoipa::path(
    post,
    path = "/vendors/{id}/follow",
    tag = "Vendors",
    summary = "Follow vendor",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor with its follower count", body = Envelope<Vendor>),
        (status = 404, description = "Vendor not found", body = ErrorResponse),
    )
)]
pub async fn follow_vendor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state.vendors.follow(user.id, id).await?;
    Ok(Json(Envelope::new(vendor)))
}

/// `DELETE /vendors/{id}/follow`: Stop following a vendor. Idempotent.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown vendor.
#[utoipa::path(
    delete,
    path = "/vendors/{id}/follow",
    tag = "Vendors",
    summary = "Unfollow vendor",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor with its follower count", body = Envelope<Vendor>),
        (status = 404, description = "Vendor not found", body = ErrorResponse),
    )
)]
pub async fn unfollow_vendor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state.vendors.unfollow(user.id, id).await?;
    Ok(Json(Envelope::new(vendor)))
}

/// Vendor routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vendors", get(list_vendors).post(register_vendor))
        .route("/vendors/me", get(get_my_vendor).patch(update_my_vendor))
        .route("/vendors/me/offers", get(list_my_offers))
        .route("/vendors/me/shops", get(list_my_shops).post(create_shop))
        .route("/vendors/{id}", get(get_vendor))
        .route("/vendors/{id}/shops", get(list_vendor_shops))
        .route(
            "/vendors/{id}/follow",
            post(follow_vendor).delete(unfollow_vendor),
        )
}
