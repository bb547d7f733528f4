use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::money;

// ---------------------------------------------------------------------------
// Variant — Priced add-on scoped to a single package
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub code: String,
    pub name: String,
    pub cost_in_cents: u64,
}

impl Variant {
    pub fn cost(&self) -> f64 {
        money::unsigned_to_dollars(self.cost_in_cents)
    }
}

// ---------------------------------------------------------------------------
// Package — Purchasable product with its own variant list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub cost_in_cents: u64,
    pub active: Option<bool>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Package {
    /// Return the first variant whose code matches exactly (case-sensitive).
    pub fn find_variant_by_code(&self, code: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.code == code)
    }

    /// Whether the package can be sold. A missing flag counts as inactive.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    pub fn cost(&self) -> f64 {
        money::unsigned_to_dollars(self.cost_in_cents)
    }

    /// Check that no two variants share a code.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.variants.len());
        for variant in &self.variants {
            if !seen.insert(variant.code.as_str()) {
                return Err(CatalogError::InvalidArgument(format!(
                    "package {} lists variant {} more than once",
                    self.code, variant.code
                )));
            }
        }
        Ok(())
    }
}
