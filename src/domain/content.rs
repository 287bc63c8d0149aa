//! Static pages and key/value settings managed from the admin panel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A static content page such as "about" or "terms".
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Page {
    /// URL slug, primary key.
    pub slug: String,
    /// Page title.
    pub title: String,
    /// Page body (markdown or HTML, rendered by the client).
    pub content: String,
    /// Last edit.
    pub updated_at: DateTime<Utc>,
}

/// A single configuration entry.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Setting {
    /// Setting key, primary key.
    pub key: String,
    /// Setting value.
    pub value: String,
    /// Last edit.
    pub updated_at: DateTime<Utc>,
}
