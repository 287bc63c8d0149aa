//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{PageRequest, Paged};

/// Success body: `{ "data": ..., "pagination": ... }`. `pagination` is only
/// present on list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Envelope<T> {
    /// Response payload.
    pub data: T,
    /// Page metadata for list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

impl<T> Envelope<T> {
    /// Wraps a single payload.
    pub fn new(data: T) -> Self {
        Self {
            data,
            pagination: None,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// Wraps one page of results with its metadata.
    pub fn paged(page: Paged<T>, request: PageRequest) -> Self {
        Self {
            pagination: Some(PaginationMeta::new(request, page.total)),
            data: page.items,
        }
    }
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    pub page: Option<u32>,
    /// Items per page, 1 to 100. Defaults to 20.
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Clamped page window.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of items.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Metadata for `total` items viewed through `request`.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

/// Empty acknowledgement for deletes and toggles.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Ack {
    /// Always `true`.
    pub ok: bool,
}

impl Ack {
    /// The acknowledgement value.
    pub const OK: Self = Self { ok: true };
}

/// Trims an optional text field, treating blank as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest::new(Some(2), Some(20));
        assert_eq!(PaginationMeta::new(request, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(request, 20).total_pages, 1);
        assert_eq!(PaginationMeta::new(request, 21).total_pages, 2);
    }

    #[test]
    fn single_payload_omits_pagination() {
        let json = serde_json::to_value(Envelope::new(1)).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "data": 1 }));
    }

    #[test]
    fn paged_payload_carries_meta() {
        let page = Paged {
            items: vec!["a", "b"],
            total: 5,
        };
        let json = serde_json::to_value(Envelope::paged(page, PageRequest::new(Some(1), Some(2))))
            .unwrap_or_default();
        assert_eq!(json["pagination"]["total_pages"], 3);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(2));
    }
}
