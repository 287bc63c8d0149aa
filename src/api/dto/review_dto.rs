//! Review DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `POST /vendors/{id}/reviews`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Stars, 1 to 5.
    pub rating: i32,
    /// Optional text.
    #[serde(default)]
    pub comment: Option<String>,
}
