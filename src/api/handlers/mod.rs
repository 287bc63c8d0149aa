//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod media;
pub mod offers;
pub mod reviews;
pub mod system;
pub mod vendors;

use axum::Router;

use crate::app_state::AppState;

/// Composes every resource's routes except uploads, which carry their own
/// body limit.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(offers::routes())
        .merge(vendors::routes())
        .merge(reviews::routes())
        .merge(catalog::routes())
        .merge(admin::routes())
        .merge(system::routes())
}
