//! Query modules for the catalog SDK.
//!
//! Each module provides a query struct that borrows the SDK's
//! [`CatalogLookup`](crate::lookup::CatalogLookup) and exposes typed lookups
//! over it.

pub mod coupons;
pub mod packages;

pub use coupons::CouponQuery;
pub use packages::PackageQuery;
