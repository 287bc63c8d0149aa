//! Reference data and editorial content: cities, categories, static pages,
//! and settings.

use std::sync::Arc;

use crate::domain::catalog::slugify;
use crate::domain::{Category, City, GeoPoint, NewCategory, NewCity, Page, Setting};
use crate::error::ApiError;
use crate::persistence::Store;

/// Catalog and content operations.
#[derive(Debug, Clone)]
pub struct ContentService {
    store: Arc<dyn Store>,
}

impl ContentService {
    /// Creates the service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All cities by name.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_cities(&self) -> Result<Vec<City>, ApiError> {
        self.store.list_cities().await
    }

    /// Adds a city.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a blank name; [`ApiError::Conflict`] when
    /// the name exists.
    pub async fn create_city(&self, name: &str, center: GeoPoint) -> Result<City, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::invalid_field("name must not be empty"));
        }
        let city = self
            .store
            .create_city(NewCity {
                name: name.to_string(),
                center,
            })
            .await?;
        tracing::info!(city_id = %city.id, name = %city.name, "city created");
        Ok(city)
    }

    /// All categories by name.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.store.list_categories().await
    }

    /// Adds a category. The slug is derived from the name unless given.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when the name or slug is unusable;
    /// [`ApiError::Conflict`] when the slug exists.
    pub async fn create_category(
        &self,
        name: &str,
        slug: Option<&str>,
        icon: Option<String>,
    ) -> Result<Category, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::invalid_field("name must not be empty"));
        }
        let slug = slugify(slug.unwrap_or(name));
        if slug.is_empty() {
            return Err(ApiError::invalid_field(
                "slug must contain at least one letter or digit",
            ));
        }
        let category = self
            .store
            .create_category(NewCategory {
                name: name.to_string(),
                slug,
                icon,
            })
            .await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    /// All pages by slug.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_pages(&self) -> Result<Vec<Page>, ApiError> {
        self.store.list_pages().await
    }

    /// Loads one page.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when no page has the slug.
    pub async fn get_page(&self, slug: &str) -> Result<Page, ApiError> {
        self.store
            .get_page(slug)
            .await?
            .ok_or_else(|| ApiError::not_found("page", slug))
    }

    /// Creates or replaces a page.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when the slug is not already in slug form or
    /// the title is blank.
    pub async fn upsert_page(
        &self,
        slug: &str,
        title: &str,
        content: &str,
    ) -> Result<Page, ApiError> {
        let mut errors = Vec::new();
        if slug.is_empty() || slugify(slug) != slug {
            errors.push(format!(
                "slug `{slug}` must be lowercase letters, digits, and single dashes"
            ));
        }
        if title.trim().is_empty() {
            errors.push("title must not be empty".to_string());
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        let page = self.store.upsert_page(slug, title.trim(), content).await?;
        tracing::info!(slug, "page saved");
        Ok(page)
    }

    /// Removes a page.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when no page has the slug.
    pub async fn delete_page(&self, slug: &str) -> Result<(), ApiError> {
        if !self.store.delete_page(slug).await? {
            return Err(ApiError::not_found("page", slug));
        }
        tracing::info!(slug, "page deleted");
        Ok(())
    }

    /// All settings by key.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_settings(&self) -> Result<Vec<Setting>, ApiError> {
        self.store.list_settings().await
    }

    /// Creates or replaces a setting.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a blank key.
    pub async fn upsert_setting(&self, key: &str, value: &str) -> Result<Setting, ApiError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ApiError::invalid_field("key must not be empty"));
        }
        let setting = self.store.upsert_setting(key, value).await?;
        tracing::info!(key, "setting saved");
        Ok(setting)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn service() -> ContentService {
        ContentService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn category_slug_defaults_to_name() {
        let content = service();
        let Ok(category) = content.create_category("Food & Drinks", None, None).await else {
            panic!("create failed");
        };
        assert_eq!(category.slug, "food-drinks");

        let dup = content.create_category("Food and drinks", Some("food drinks"), None).await;
        assert!(matches!(dup, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn page_slug_must_be_canonical() {
        let content = service();
        let bad = content.upsert_page("About Us", "About", "...").await;
        let Err(ApiError::Validation(messages)) = bad else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 1);

        let Ok(page) = content.upsert_page("about-us", "About", "v1").await else {
            panic!("upsert failed");
        };
        assert_eq!(page.content, "v1");
        let Ok(page) = content.upsert_page("about-us", "About", "v2").await else {
            panic!("upsert failed");
        };
        assert_eq!(page.content, "v2");
        let Ok(pages) = content.list_pages().await else {
            panic!("list failed");
        };
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn deleting_missing_page_is_not_found() {
        let content = service();
        assert!(matches!(
            content.delete_page("missing").await,
            Err(ApiError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn city_names_are_unique() {
        let content = service();
        let Ok(center) = GeoPoint::new(41.39, 2.17) else {
            panic!("bad point");
        };
        let Ok(_) = content.create_city("Barcelona", center).await else {
            panic!("create failed");
        };
        let dup = content.create_city("barcelona", center).await;
        assert!(matches!(dup, Err(ApiError::Conflict(_))));
    }
}
