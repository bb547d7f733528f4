//! HTTP implementation of the catalog lookup collaborator.
//!
//! Talks to the catalog service over blocking HTTP. Every transport, status
//! or parse failure is logged and reported as "not found", so callers only
//! ever see `Some(entity)` or `None`.

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{self, CatalogConfig};
use crate::error::Result;
use crate::lookup::CatalogLookup;
use crate::models::{Coupon, Package};

/// Catalog lookups against the remote catalog service.
pub struct HttpCatalog {
    config: CatalogConfig,
    client: Client,
}

impl HttpCatalog {
    /// Create a client for the service described by `config`.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        let mut url = self.config.base_url.clone();
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Some(url)
    }

    /// GET `url` and decode the body, mapping every failure to `None`.
    fn fetch<T: DeserializeOwned>(&self, url: Url) -> Option<T> {
        debug!(%url, "catalog request");
        let resp = match self.client.get(url.clone()).send() {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%url, error = %e, "catalog request failed");
                return None;
            }
        };

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "catalog returned 404");
            return None;
        }
        if !status.is_success() {
            warn!(%url, %status, "catalog returned an error status");
            return None;
        }

        match resp.json::<T>() {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(%url, error = %e, "catalog response could not be decoded");
                None
            }
        }
    }
}

impl CatalogLookup for HttpCatalog {
    fn lookup_package(&self, code: &str) -> Option<Package> {
        let url = self.endpoint(&[config::PACKAGES_PATH, code])?;
        let package: Package = self.fetch(url)?;
        if let Err(e) = package.validate() {
            warn!(code, error = %e, "discarding invalid package");
            return None;
        }
        Some(package)
    }

    fn list_packages(&self) -> Option<Vec<Package>> {
        let url = self.endpoint(&[config::PACKAGES_PATH])?;
        let body: Value = self.fetch(url)?;
        let packages = match package_array(body) {
            Some(arr) => arr,
            None => {
                warn!("package list response is not an array");
                return None;
            }
        };

        let mut out = Vec::with_capacity(packages.len());
        for raw in packages {
            let package: Package = match serde_json::from_value(raw) {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "package list entry could not be decoded");
                    return None;
                }
            };
            if let Err(e) = package.validate() {
                warn!(code = %package.code, error = %e, "package list holds an invalid package");
                return None;
            }
            out.push(package);
        }
        Some(out)
    }

    fn lookup_coupon(
        &self,
        code: &str,
        product_key: &str,
        organization: Option<&str>,
    ) -> Option<Coupon> {
        let mut url = self.endpoint(&[config::COUPONS_PATH, code])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("productKey", product_key);
            if let Some(org) = organization {
                query.append_pair("organization", org);
            }
        }
        self.fetch(url)
    }
}

/// Accept either a bare array or an object wrapping it under `packages` or `data`.
fn package_array(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(arr) => Some(arr),
        Value::Object(mut map) => match map.remove("packages").or_else(|| map.remove("data")) {
            Some(Value::Array(arr)) => Some(arr),
            _ => None,
        },
        _ => None,
    }
}
