//! Admin console handlers. Every route requires the `admin` role.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    Ack, AdminUpdateUserRequest, AdminVendorListParams, CreateCategoryRequest, CreateCityRequest,
    Envelope, ModerateOfferRequest, PaginationParams, UpsertPageRequest, UpsertSettingRequest,
    UserListParams, VendorStatusRequest,
};
use crate::api::extract::{AdminUser, ApiJson, ApiPath, ApiQuery};
use crate::app_state::AppState;
use crate::domain::{Category, City, Offer, Page, ReviewListing, Setting, User, Vendor};
use crate::error::{ApiError, ErrorResponse};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// `GET /admin/users`: Accounts, newest first.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admins.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    summary = "List users",
    security(("bearer" = [])),
    params(UserListParams),
    responses(
        (status = 200, description = "One page of users", body = Envelope<Vec<User>>),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.page_request();
    let page = state
        .auth
        .list_users(params.search.as_deref(), request)
        .await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// `PATCH /admin/users/{id}`: Rename an account or change its role.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown user.
#[utoipa::path(
    patch,
    path = "/admin/users/{id}",
    tag = "Admin",
    summary = "Update user",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = Envelope<User>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.admin_update_user(id, req.name, req.role).await?;
    Ok(Json(Envelope::new(user)))
}

/// `DELETE /admin/users/{id}`: Delete an account and everything it owns.
///
/// # Errors
///
/// Returns [`ApiError::Conflict`] when admins target themselves.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Admin",
    summary = "Delete user",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = Envelope<Ack>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Cannot delete own account", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.delete_user(&admin, id).await?;
    Ok(Json(Envelope::new(Ack::OK)))
}

// ---------------------------------------------------------------------------
// Vendors
// ---------------------------------------------------------------------------

/// `GET /admin/vendors`: Vendors in any status, optionally filtered.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for an unknown status.
#[utoipa::path(
    get,
    path = "/admin/vendors",
    tag = "Admin",
    summary = "List vendors for moderation",
    security(("bearer" = [])),
    params(AdminVendorListParams),
    responses(
        (status = 200, description = "One page of vendors", body = Envelope<Vec<Vendor>>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
    )
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiQuery(params): ApiQuery<AdminVendorListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let status = params.status()?;
    let request = params.page_request();
    let page = state.vendors.list_for_admin(status, request).await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// `PATCH /admin/vendors/{id}/status`: Approve or reject a vendor.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when moving back to `pending`.
#[utoipa::path(
    patch,
    path = "/admin/vendors/{id}/status",
    tag = "Admin",
    summary = "Set vendor status",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = VendorStatusRequest,
    responses(
        (status = 200, description = "Updated vendor", body = Envelope<Vendor>),
        (status = 400, description = "Invalid transition", body = ErrorResponse),
        (status = 404, description = "Vendor not found", body = ErrorResponse),
    )
)]
pub async fn set_vendor_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<VendorStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state.vendors.set_status(id, req.status).await?;
    Ok(Json(Envelope::new(vendor)))
}

// ---------------------------------------------------------------------------
// Offers and reviews
// ---------------------------------------------------------------------------

/// `GET /admin/offers`: Every offer, regardless of visibility.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admins.
#[utoipa::path(
    get,
    path = "/admin/offers",
    tag = "Admin",
    summary = "List all offers",
    security(("bearer" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of offers", body = Envelope<Vec<Offer>>),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn list_offers(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.page_request();
    let page = state.offers.list_all(request).await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// `PATCH /admin/offers/{id}`: Feature or disable an offer.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when neither flag is given.
#[utoipa::path(
    patch,
    path = "/admin/offers/{id}",
    tag = "Admin",
    summary = "Moderate offer",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Offer id")),
    request_body = ModerateOfferRequest,
    responses(
        (status = 200, description = "Updated offer", body = Envelope<Offer>),
        (status = 400, description = "No flag given", body = ErrorResponse),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn moderate_offer(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ModerateOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let offer = state
        .offers
        .moderate(id, req.is_featured, req.is_active)
        .await?;
    Ok(Json(Envelope::new(offer)))
}

/// `DELETE /admin/offers/{id}`: Remove any offer.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown offer.
#[utoipa::path(
    delete,
    path = "/admin/offers/{id}",
    tag = "Admin",
    summary = "Delete offer",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Offer id")),
    responses(
        (status = 200, description = "Offer deleted", body = Envelope<Ack>),
        (status = 404, description = "Offer not found", body = ErrorResponse),
    )
)]
pub async fn delete_offer(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.offers.delete(&admin, id).await?;
    Ok(Json(Envelope::new(Ack::OK)))
}

/// `GET /admin/reviews`: Every review, newest first.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admins.
#[utoipa::path(
    get,
    path = "/admin/reviews",
    tag = "Admin",
    summary = "List all reviews",
    security(("bearer" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of reviews", body = Envelope<Vec<ReviewListing>>),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.page_request();
    let page = state.reviews.list_all(request).await?;
    Ok(Json(Envelope::paged(page, request)))
}

/// `DELETE /admin/reviews/{id}`: Remove any review.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown review.
#[utoipa::path(
    delete,
    path = "/admin/reviews/{id}",
    tag = "Admin",
    summary = "Delete review",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review deleted", body = Envelope<Ack>),
        (status = 404, description = "Review not found", body = ErrorResponse),
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.reviews.delete(&admin, id).await?;
    Ok(Json(Envelope::new(Ack::OK)))
}

// ---------------------------------------------------------------------------
// Content and catalog
// ---------------------------------------------------------------------------

/// `GET /admin/pages`: Every content page.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admins.
#[utoipa::path(
    get,
    path = "/admin/pages",
    tag = "Admin",
    summary = "List pages",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Pages", body = Envelope<Vec<Page>>),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn list_pages(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(Envelope::new(state.content.list_pages().await?)))
}

/// `PUT /admin/pages/{slug}`: Create or replace a page.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a malformed slug or empty title.
#[utoipa::path(
    put,
    path = "/admin/pages/{slug}",
    tag = "Admin",
    summary = "Save page",
    security(("bearer" = [])),
    params(("slug" = String, Path, description = "Page slug")),
    request_body = UpsertPageRequest,
    responses(
        (status = 200, description = "Saved page", body = Envelope<Page>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
    )
)]
pub async fn upsert_page(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(slug): ApiPath<String>,
    ApiJson(req): ApiJson<UpsertPageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .content
        .upsert_page(&slug, &req.title, &req.content)
        .await?;
    Ok(Json(Envelope::new(page)))
}

/// `DELETE /admin/pages/{slug}`: Remove a page.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown slug.
#[utoipa::path(
    delete,
    path = "/admin/pages/{slug}",
    tag = "Admin",
    summary = "Delete page",
    security(("bearer" = [])),
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page deleted", body = Envelope<Ack>),
        (status = 404, description = "Page not found", body = ErrorResponse),
    )
)]
pub async fn delete_page(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.content.delete_page(&slug).await?;
    Ok(Json(Envelope::new(Ack::OK)))
}

/// `GET /admin/settings`: Every setting.
///
/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admins.
#[utoipa::path(
    get,
    path = "/admin/settings",
    tag = "Admin",
    summary = "List settings",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Settings", body = Envelope<Vec<Setting>>),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn list_settings(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(Envelope::new(state.content.list_settings().await?)))
}

/// `PUT /admin/settings/{key}`: Create or replace a setting.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for a blank key.
#[utoipa::path(
    put,
    path = "/admin/settings/{key}",
    tag = "Admin",
    summary = "Save setting",
    security(("bearer" = [])),
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpsertSettingRequest,
    responses(
        (status = 200, description = "Saved setting", body = Envelope<Setting>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
    )
)]
pub async fn upsert_setting(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(key): ApiPath<String>,
    ApiJson(req): ApiJson<UpsertSettingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let setting = state.content.upsert_setting(&key, &req.value).await?;
    Ok(Json(Envelope::new(setting)))
}

/// `POST /admin/cities`: Add a city.
///
/// # Errors
///
/// Returns [`ApiError::Conflict`] for a duplicate name.
#[utoipa::path(
    post,
    path = "/admin/cities",
    tag = "Admin",
    summary = "Create city",
    security(("bearer" = [])),
    request_body = CreateCityRequest,
    responses(
        (status = 201, description = "City created", body = Envelope<City>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Duplicate name", body = ErrorResponse),
    )
)]
pub async fn create_city(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiJson(req): ApiJson<CreateCityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let center = req.center()?;
    let city = state.content.create_city(&req.name, center).await?;
    Ok((StatusCode::CREATED, Json(Envelope::new(city))))
}

/// `POST /admin/categories`: Add a category.
///
/// # Errors
///
/// Returns [`ApiError::Conflict`] for a duplicate slug.
#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = "Admin",
    summary = "Create category",
    security(("bearer" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Envelope<Category>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Duplicate slug", body = ErrorResponse),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ApiJson(req): ApiJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .content
        .create_category(&req.name, req.slug.as_deref(), req.icon)
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope::new(category))))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", patch(update_user).delete(delete_user))
        .route("/admin/vendors", get(list_vendors))
        .route("/admin/vendors/{id}/status", patch(set_vendor_status))
        .route("/admin/offers", get(list_offers))
        .route(
            "/admin/offers/{id}",
            patch(moderate_offer).delete(delete_offer),
        )
        .route("/admin/reviews", get(list_reviews))
        .route("/admin/reviews/{id}", delete(delete_review))
        .route("/admin/pages", get(list_pages))
        .route("/admin/pages/{slug}", put(upsert_page).delete(delete_page))
        .route("/admin/settings", get(list_settings))
        .route("/admin/settings/{key}", put(upsert_setting))
        .route("/admin/cities", post(create_city))
        .route("/admin/categories", post(create_category))
}
