//! REST API layer: route handlers, DTOs, extractors, and router composition.
//!
//! Endpoints are mounted at the root. Uploaded files are served read-only
//! under `/public`.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::services::ServeDir;

use crate::app_state::AppState;
use crate::service::media_service::PUBLIC_PREFIX;

/// Builds the complete API router with all REST endpoints, the upload
/// route with its body limit, and the static file mount.
pub fn build_router(state: &AppState) -> Router<AppState> {
    let uploads = handlers::media::routes().layer(DefaultBodyLimit::max(state.max_upload_bytes));

    let router = Router::new()
        .merge(handlers::routes())
        .merge(uploads)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.media.upload_dir()));

    with_docs(router)
}

#[cfg(feature = "swagger-ui")]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    router.merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router
}
