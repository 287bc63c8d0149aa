//! OpenAPI document for every REST endpoint.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers::{admin, auth, catalog, media, offers, reviews, system, vendors};

/// Generated API description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Offerify API", description = "Local deals marketplace backend."),
    paths(
        auth::register,
        auth::login,
        auth::profile,
        auth::update_profile,
        offers::list_offers,
        offers::create_offer,
        offers::get_offer,
        offers::update_offer,
        offers::delete_offer,
        offers::add_favorite,
        offers::remove_favorite,
        offers::list_favorites,
        vendors::list_vendors,
        vendors::register_vendor,
        vendors::get_my_vendor,
        vendors::update_my_vendor,
        vendors::list_my_offers,
        vendors::list_my_shops,
        vendors::create_shop,
        vendors::get_vendor,
        vendors::list_vendor_shops,
        vendors::follow_vendor,
        vendors::unfollow_vendor,
        reviews::list_reviews,
        reviews::create_review,
        reviews::delete_review,
        catalog::list_cities,
        catalog::list_categories,
        catalog::get_page,
        catalog::list_settings,
        media::upload,
        admin::list_users,
        admin::update_user,
        admin::delete_user,
        admin::list_vendors,
        admin::set_vendor_status,
        admin::list_offers,
        admin::moderate_offer,
        admin::delete_offer,
        admin::list_reviews,
        admin::delete_review,
        admin::list_pages,
        admin::upsert_page,
        admin::delete_page,
        admin::list_settings,
        admin::upsert_setting,
        admin::create_city,
        admin::create_category,
        system::health_handler,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Accounts and tokens"),
        (name = "Offers", description = "Offer discovery and publishing"),
        (name = "Favorites", description = "Saved offers"),
        (name = "Vendors", description = "Vendor profiles, shops, and follows"),
        (name = "Reviews", description = "Vendor reviews"),
        (name = "Catalog", description = "Cities, categories, pages, and settings"),
        (name = "Media", description = "File uploads"),
        (name = "Admin", description = "Moderation console"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected paths.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}
