//! The catalog lookup collaborator.
//!
//! [`CatalogLookup`] resolves codes into owned entities. Implementations never
//! surface transport or parse failures: every failure mode comes back as
//! `None`, the same as an unknown code.

use std::collections::HashMap;

use crate::models::{Coupon, Package};

/// Resolves package and coupon codes.
pub trait CatalogLookup {
    /// Find a package by its code.
    fn lookup_package(&self, code: &str) -> Option<Package>;

    /// List every package in catalog order.
    fn list_packages(&self) -> Option<Vec<Package>>;

    /// Find a coupon issued for `product_key` within `organization`.
    ///
    /// Each call returns a fresh value the caller may mutate freely.
    fn lookup_coupon(
        &self,
        code: &str,
        product_key: &str,
        organization: Option<&str>,
    ) -> Option<Coupon>;
}

impl<T: CatalogLookup + ?Sized> CatalogLookup for Box<T> {
    fn lookup_package(&self, code: &str) -> Option<Package> {
        (**self).lookup_package(code)
    }

    fn list_packages(&self) -> Option<Vec<Package>> {
        (**self).list_packages()
    }

    fn lookup_coupon(
        &self,
        code: &str,
        product_key: &str,
        organization: Option<&str>,
    ) -> Option<Coupon> {
        (**self).lookup_coupon(code, product_key, organization)
    }
}

// ---------------------------------------------------------------------------
// InMemoryCatalog
// ---------------------------------------------------------------------------

/// Fixture-backed catalog held entirely in memory.
///
/// Packages keep insertion order for [`list_packages`](CatalogLookup::list_packages).
/// A coupon registered without an organization matches lookups from any
/// organization; one registered with an organization only matches that one.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    packages: Vec<Package>,
    coupons: HashMap<(String, String), Vec<Coupon>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package, replacing any previous package with the same code.
    pub fn with_package(mut self, package: Package) -> Self {
        self.insert_package(package);
        self
    }

    pub fn with_coupon(mut self, coupon: Coupon) -> Self {
        self.insert_coupon(coupon);
        self
    }

    pub fn insert_package(&mut self, package: Package) {
        match self.packages.iter_mut().find(|p| p.code == package.code) {
            Some(existing) => *existing = package,
            None => self.packages.push(package),
        }
    }

    pub fn insert_coupon(&mut self, coupon: Coupon) {
        let key = (coupon.code.clone(), coupon.product_key.clone());
        let entries = self.coupons.entry(key).or_default();
        entries.retain(|c| c.organization != coupon.organization);
        entries.push(coupon);
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn lookup_package(&self, code: &str) -> Option<Package> {
        self.packages
            .iter()
            .find(|p| p.code == code)
            .filter(|p| p.validate().is_ok())
            .cloned()
    }

    /// `None` when any stored package fails validation, matching how the
    /// HTTP catalog treats a list holding an invalid package.
    fn list_packages(&self) -> Option<Vec<Package>> {
        if self.packages.iter().any(|p| p.validate().is_err()) {
            return None;
        }
        Some(self.packages.clone())
    }

    fn lookup_coupon(
        &self,
        code: &str,
        product_key: &str,
        organization: Option<&str>,
    ) -> Option<Coupon> {
        let entries = self
            .coupons
            .get(&(code.to_string(), product_key.to_string()))?;
        entries
            .iter()
            .find(|c| c.organization.is_some() && c.organization.as_deref() == organization)
            .or_else(|| entries.iter().find(|c| c.organization.is_none()))
            .cloned()
    }
}
