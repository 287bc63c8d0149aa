//! Data Transfer Objects for REST request/response serialization.
//!
//! Request bodies validate themselves and convert into service inputs,
//! reporting every problem at once as [`crate::error::ApiError::Validation`].
//! Domain records are serialized directly inside [`Envelope`].

pub mod auth_dto;
pub mod common_dto;
pub mod content_dto;
pub mod offer_dto;
pub mod review_dto;
pub mod vendor_dto;

pub use auth_dto::*;
pub use common_dto::*;
pub use content_dto::*;
pub use offer_dto::*;
pub use review_dto::*;
pub use vendor_dto::*;
