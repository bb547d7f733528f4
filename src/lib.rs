//! Catalog SDK for Rust.
//!
//! Prices purchases of catalog packages. A purchase names a package, any of
//! that package's variants (add-ons) and optionally a coupon; codes are
//! resolved against the remote catalog service and the SDK computes the
//! subtotal and total in integer cents.
//!
//! # Quick start
//!
//! ```no_run
//! use catalog_sdk::{CatalogSdk, PurchaseOptions};
//!
//! let sdk = CatalogSdk::builder()
//!     .base_url("https://catalog.example.com/api/")
//!     .organization("acme")
//!     .build()
//!     .unwrap();
//!
//! let mut purchase = sdk
//!     .purchase(
//!         "vitamins",
//!         PurchaseOptions::new()
//!             .variants(["vitamin_d", "vitamin_b"])
//!             .coupon_code("WELCOME"),
//!     )
//!     .unwrap();
//!
//! println!("total: {}", purchase.total().unwrap());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod money;
pub mod purchase;
pub mod queries;

pub use client::HttpCatalog;
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use lookup::{CatalogLookup, InMemoryCatalog};
pub use models::{Coupon, Package, Variant};
pub use purchase::{
    CouponSource, PackageSource, Purchase, PurchaseOptions, PurchaseRequest, PurchaseSummary,
    VariantRef,
};

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// CatalogSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CatalogSdk`] instance.
///
/// Use [`CatalogSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CatalogSdkBuilder::build) to create the SDK.
#[derive(Default)]
pub struct CatalogSdkBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    organization: Option<String>,
}

impl CatalogSdkBuilder {
    /// Set the catalog service base URL.
    ///
    /// Defaults to [`config::DEFAULT_BASE_URL`]. A missing trailing `/` is
    /// added so endpoint paths are appended to it.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the HTTP request timeout for catalog lookups.
    ///
    /// Defaults to 30 seconds. A timed-out lookup counts as "not found".
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the organization used for coupon lookups when a purchase names none.
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    fn into_config(self) -> Result<CatalogConfig> {
        let mut config = CatalogConfig::default();
        if let Some(raw) = self.base_url {
            config.base_url = config::parse_base_url(&raw)?;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config.organization = self.organization;
        Ok(config)
    }

    /// Build the SDK backed by the HTTP catalog client.
    ///
    /// No request is made until the first lookup.
    pub fn build(self) -> Result<CatalogSdk> {
        let config = self.into_config()?;
        let client = HttpCatalog::new(config.clone())?;
        Ok(CatalogSdk {
            config,
            lookup: Box::new(client),
        })
    }

    /// Build the SDK on top of a caller-supplied lookup instead of HTTP.
    pub fn build_with_lookup<L>(self, lookup: L) -> Result<CatalogSdk>
    where
        L: CatalogLookup + 'static,
    {
        let config = self.into_config()?;
        Ok(CatalogSdk {
            config,
            lookup: Box::new(lookup),
        })
    }
}

// ---------------------------------------------------------------------------
// CatalogSdk
// ---------------------------------------------------------------------------

/// The main entry point for the catalog SDK.
///
/// Owns a [`CatalogLookup`] and exposes query interfaces and purchase
/// construction as lightweight borrowing wrappers over it.
pub struct CatalogSdk {
    config: CatalogConfig,
    lookup: Box<dyn CatalogLookup>,
}

impl CatalogSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> CatalogSdkBuilder {
        CatalogSdkBuilder::default()
    }

    /// Build an HTTP-backed SDK from `CATALOG_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = CatalogConfig::from_env()?;
        let client = HttpCatalog::new(config.clone())?;
        Ok(Self {
            config,
            lookup: Box::new(client),
        })
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the package query interface.
    pub fn packages(&self) -> queries::PackageQuery<'_> {
        queries::PackageQuery::new(self.lookup.as_ref())
    }

    /// Access the coupon query interface, scoped to the default organization.
    pub fn coupons(&self) -> queries::CouponQuery<'_> {
        queries::CouponQuery::new(self.lookup.as_ref(), self.config.organization.as_deref())
    }

    // -- Purchases ---------------------------------------------------------

    /// Build a [`Purchase`] resolved against this SDK's catalog.
    ///
    /// The SDK's default organization is used when `options` carries none.
    pub fn purchase(
        &self,
        package: impl Into<PackageSource>,
        mut options: PurchaseOptions,
    ) -> Result<Purchase<'_>> {
        if options.organization.is_none() {
            options.organization = self.config.organization.clone();
        }
        Purchase::new(self.lookup.as_ref(), package, options)
    }

    /// Build a [`Purchase`] from a JSON purchase request.
    ///
    /// The SDK's default organization is used when the request carries none.
    pub fn purchase_from_json(&self, json: &str) -> Result<Purchase<'_>> {
        let mut request: PurchaseRequest = serde_json::from_str(json)?;
        if request.organization.is_none() {
            request.organization = self.config.organization.clone();
        }
        Purchase::from_request(self.lookup.as_ref(), request)
    }

    /// Return the configuration the SDK was built with.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Return the underlying lookup for advanced usage.
    pub fn lookup(&self) -> &dyn CatalogLookup {
        self.lookup.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CatalogSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CatalogSdk(base_url={}, organization={}, timeout={}s)",
            self.config.base_url,
            self.config.organization.as_deref().unwrap_or("-"),
            self.config.timeout.as_secs()
        )
    }
}
