//! Public reference data: cities, categories, content pages, and settings.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::Envelope;
use crate::api::extract::ApiPath;
use crate::app_state::AppState;
use crate::domain::{Category, City, Page, Setting};
use crate::error::{ApiError, ErrorResponse};

/// `GET /cities`: Every city, by name.
///
/// # Errors
///
/// Propagates storage failures.
#[utoipa::path(
    get,
    path = "/cities",
    tag = "Catalog",
    summary = "List cities",
    responses((status = 200, description = "Cities", body = Envelope<Vec<City>>))
)]
pub async fn list_cities(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(Envelope::new(state.content.list_cities().await?)))
}

/// `GET /categories`: Every category, by name.
///
/// # Errors
///
/// Propagates storage failures.
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Catalog",
    summary = "List categories",
    responses((status = 200, description = "Categories", body = Envelope<Vec<Category>>))
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(Envelope::new(state.content.list_categories().await?)))
}

/// `GET /pages/{slug}`: A content page.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown slug.
#[utoipa::path(
    get,
    path = "/pages/{slug}",
    tag = "Catalog",
    summary = "Get page",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page", body = Envelope<Page>),
        (status = 404, description = "Page not found", body = ErrorResponse),
    )
)]
pub async fn get_page(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(Envelope::new(state.content.get_page(&slug).await?)))
}

/// `GET /settings`: Public key/value settings.
///
/// # Errors
///
/// Propagates storage failures.
#[utoipa::path(
    get,
    path = "/settings",
    tag = "Catalog",
    summary = "List settings",
    responses((status = 200, description = "Settings", body = Envelope<Vec<Setting>>))
)]
pub async fn list_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(Envelope::new(state.content.list_settings().await?)))
}

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cities", get(list_cities))
        .route("/categories", get(list_categories))
        .route("/pages/{slug}", get(get_page))
        .route("/settings", get(list_settings))
}
