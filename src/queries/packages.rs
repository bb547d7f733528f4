//! Package queries.

use crate::error::{CatalogError, Result};
use crate::lookup::CatalogLookup;
use crate::models::Package;

// ---------------------------------------------------------------------------
// PackageQuery
// ---------------------------------------------------------------------------

/// Query interface for catalog packages.
pub struct PackageQuery<'a> {
    lookup: &'a dyn CatalogLookup,
}

impl<'a> PackageQuery<'a> {
    /// Create a new `PackageQuery` bound to the given lookup.
    pub fn new(lookup: &'a dyn CatalogLookup) -> Self {
        Self { lookup }
    }

    /// Get a package by code, failing with [`CatalogError::PackageNotFound`]
    /// when the catalog does not know it.
    pub fn get(&self, code: &str) -> Result<Package> {
        self.find(code)
            .ok_or_else(|| CatalogError::PackageNotFound(code.to_string()))
    }

    /// Find a package by code.
    pub fn find(&self, code: &str) -> Option<Package> {
        self.lookup.lookup_package(code)
    }

    /// List every package. `None` means the catalog could not be read.
    pub fn list(&self) -> Option<Vec<Package>> {
        self.lookup.list_packages()
    }

    /// List packages that are currently for sale.
    ///
    /// An unreadable catalog yields an empty list.
    pub fn list_active(&self) -> Vec<Package> {
        self.list()
            .unwrap_or_default()
            .into_iter()
            .filter(Package::is_active)
            .collect()
    }
}
