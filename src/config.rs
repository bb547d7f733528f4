use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::{CatalogError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "CATALOG_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CATALOG_TIMEOUT_SECS";
pub const ENV_ORGANIZATION: &str = "CATALOG_ORGANIZATION";

pub const PACKAGES_PATH: &str = "packages";
pub const COUPONS_PATH: &str = "coupons";

/// Settings for talking to the catalog service.
///
/// Built once before the first lookup and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub base_url: Url,
    pub timeout: Duration,
    /// Organization used to scope coupon lookups when a purchase names none.
    pub organization: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            organization: None,
        }
    }
}

impl CatalogConfig {
    /// Read settings from `CATALOG_API_URL`, `CATALOG_TIMEOUT_SECS` and
    /// `CATALOG_ORGANIZATION`, falling back to defaults for unset values.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = env::var(ENV_BASE_URL) {
            config.base_url = parse_base_url(&raw)?;
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CatalogError::InvalidArgument(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(org) = env::var(ENV_ORGANIZATION) {
            if !org.trim().is_empty() {
                config.organization = Some(org);
            }
        }
        Ok(config)
    }
}

/// Parse a base URL, forcing a trailing `/` so that relative joins append to
/// its path instead of replacing the last segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&normalized)
        .map_err(|e| CatalogError::InvalidArgument(format!("invalid base URL {:?}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(CatalogError::InvalidArgument(format!(
            "base URL {:?} cannot carry a path",
            raw
        )));
    }
    Ok(url)
}
