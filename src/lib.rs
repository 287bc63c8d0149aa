//! # offerify
//!
//! REST API backend for the Offerify local-deals marketplace.
//!
//! Vendors apply, get approved by an admin, and publish discount, coupon, or
//! voucher offers from one or more shops. Shoppers discover offers by city,
//! category, text, and distance, save favorites, follow vendors, and leave
//! reviews.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers + extractors (api/)
//!     │
//!     ├── Auth / Offer / Vendor / Review / Content / Media services (service/)
//!     │
//!     ├── Records and the discovery contract (domain/)
//!     │
//!     └── Store (persistence/)
//!           ├── PostgreSQL (sqlx)
//!           └── In-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
