//! The purchase aggregate.
//!
//! A [`Purchase`] ties one [`Package`] to a list of chosen variants and an
//! optional [`Coupon`], and prices the result. Raw codes supplied by a caller
//! are resolved on demand:
//!
//! - the package code is resolved through the catalog when the purchase is
//!   built,
//! - variant codes are stored as given and resolved against the package's own
//!   variant list whenever the variants are read,
//! - a coupon code is resolved through the catalog when assigned, and its
//!   discount is capped at the subtotal measured at that moment.
//!
//! The cap is applied once. Changing variants after a coupon was assigned does
//! not re-cap the discount.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::lookup::CatalogLookup;
use crate::models::{Coupon, Package, Variant};
use crate::money;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A package given either by code or as an already-resolved value.
#[derive(Debug, Clone, PartialEq)]
pub enum PackageSource {
    Code(String),
    Package(Package),
}

impl From<&str> for PackageSource {
    fn from(code: &str) -> Self {
        PackageSource::Code(code.to_string())
    }
}

impl From<String> for PackageSource {
    fn from(code: String) -> Self {
        PackageSource::Code(code)
    }
}

impl From<Package> for PackageSource {
    fn from(package: Package) -> Self {
        PackageSource::Package(package)
    }
}

/// One stored variant entry: a raw code waiting for resolution, or a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantRef {
    Code(String),
    Resolved(Variant),
}

impl VariantRef {
    pub fn code(&self) -> &str {
        match self {
            VariantRef::Code(code) => code,
            VariantRef::Resolved(variant) => &variant.code,
        }
    }

    pub fn as_resolved(&self) -> Option<&Variant> {
        match self {
            VariantRef::Resolved(variant) => Some(variant),
            VariantRef::Code(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, VariantRef::Resolved(_))
    }
}

impl From<&str> for VariantRef {
    fn from(code: &str) -> Self {
        VariantRef::Code(code.to_string())
    }
}

impl From<String> for VariantRef {
    fn from(code: String) -> Self {
        VariantRef::Code(code)
    }
}

impl From<Variant> for VariantRef {
    fn from(variant: Variant) -> Self {
        VariantRef::Resolved(variant)
    }
}

/// A coupon given either by code or as an already-resolved value.
///
/// Resolved coupons are trusted as they are: no lookup and no cap.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponSource {
    Code(String),
    Coupon(Coupon),
}

impl From<&str> for CouponSource {
    fn from(code: &str) -> Self {
        CouponSource::Code(code.to_string())
    }
}

impl From<String> for CouponSource {
    fn from(code: String) -> Self {
        CouponSource::Code(code)
    }
}

impl From<Coupon> for CouponSource {
    fn from(coupon: Coupon) -> Self {
        CouponSource::Coupon(coupon)
    }
}

/// Optional settings for [`Purchase::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseOptions {
    pub organization: Option<String>,
    pub variants: Vec<String>,
    pub coupon_code: Option<String>,
}

impl PurchaseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn variants<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn variant(mut self, code: impl Into<String>) -> Self {
        self.variants.push(code.into());
        self
    }

    pub fn coupon_code(mut self, code: impl Into<String>) -> Self {
        self.coupon_code = Some(code.into());
        self
    }
}

/// Purchase parameters as they arrive over an API boundary.
///
/// Unknown fields are rejected. `variants` stays an untyped JSON value so a
/// wrongly shaped list is reported as [`CatalogError::InvalidArgument`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseRequest {
    pub package: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default = "empty_list")]
    pub variants: Value,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

// ---------------------------------------------------------------------------
// PurchaseSummary — Display/API form with derived totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub package: Package,
    pub variants: Vec<Variant>,
    pub coupon: Option<Coupon>,
    pub organization: Option<String>,
    pub subtotal_in_cents: u64,
    pub subtotal: f64,
    pub total_in_cents: i64,
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Purchase
// ---------------------------------------------------------------------------

/// One package, its chosen variants and an optional coupon.
///
/// Borrows the catalog it resolves codes against. Not meant to be shared
/// between threads while being edited.
pub struct Purchase<'a> {
    catalog: &'a dyn CatalogLookup,
    package: Package,
    variants: Vec<VariantRef>,
    coupon: Option<Coupon>,
    organization: Option<String>,
}

impl<'a> Purchase<'a> {
    /// Build a purchase.
    ///
    /// A package code is looked up through `catalog` and fails with
    /// [`CatalogError::PackageNotFound`] when the catalog has no such package.
    /// Variant codes are stored unresolved. A coupon code is looked up and
    /// capped at the subtotal, which resolves the variants and can therefore
    /// fail with [`CatalogError::VariantNotFound`]. An unknown coupon code is
    /// not an error; the purchase simply carries no coupon.
    pub fn new(
        catalog: &'a dyn CatalogLookup,
        package: impl Into<PackageSource>,
        options: PurchaseOptions,
    ) -> Result<Self> {
        let package = match package.into() {
            PackageSource::Package(package) => package,
            PackageSource::Code(code) => match catalog.lookup_package(&code) {
                Some(package) => package,
                None => {
                    debug!(code = %code, "package lookup came back empty");
                    return Err(CatalogError::PackageNotFound(code));
                }
            },
        };

        let mut purchase = Self {
            catalog,
            package,
            variants: Vec::new(),
            coupon: None,
            organization: options.organization,
        };
        purchase.set_variants(options.variants.into_iter().map(VariantRef::Code).collect());
        purchase.assign_coupon(options.coupon_code.map(CouponSource::Code))?;
        Ok(purchase)
    }

    /// Build a purchase from a decoded [`PurchaseRequest`].
    pub fn from_request(catalog: &'a dyn CatalogLookup, request: PurchaseRequest) -> Result<Self> {
        let PurchaseRequest {
            package,
            organization,
            variants,
            coupon_code,
        } = request;

        let options = PurchaseOptions {
            organization,
            ..PurchaseOptions::default()
        };
        let mut purchase = Self::new(catalog, package, options)?;
        purchase.set_variants_value(variants)?;
        purchase.assign_coupon(coupon_code.map(CouponSource::Code))?;
        Ok(purchase)
    }

    /// Decode a JSON purchase request and build the purchase.
    pub fn from_json(catalog: &'a dyn CatalogLookup, json: &str) -> Result<Self> {
        let request: PurchaseRequest = serde_json::from_str(json)?;
        Self::from_request(catalog, request)
    }

    // -- Plain accessors ---------------------------------------------------

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Change the organization used for later coupon lookups.
    pub fn set_organization(&mut self, organization: Option<String>) {
        self.organization = organization;
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// The stored variant entries, which may still hold unresolved codes.
    pub fn raw_variants(&self) -> &[VariantRef] {
        &self.variants
    }

    // -- Variants ----------------------------------------------------------

    /// Replace the variant list. Nothing is resolved until the next read.
    pub fn set_variants(&mut self, variants: Vec<VariantRef>) -> &[VariantRef] {
        self.variants = variants;
        &self.variants
    }

    /// Append one entry. A code is resolved on the next read.
    pub fn add_variant(&mut self, variant: impl Into<VariantRef>) {
        self.variants.push(variant.into());
    }

    /// Replace the variant list from an untyped JSON value.
    ///
    /// The value must be an array whose elements are variant codes (strings)
    /// or variant objects. Anything else fails with
    /// [`CatalogError::InvalidArgument`] and leaves the stored list untouched.
    ///
    /// Variant objects are stored as resolved and passed through unchanged on
    /// read, like variants handed to [`set_variants`](Self::set_variants).
    /// They are not checked against the package's own variant list; only
    /// codes are resolved against it.
    pub fn set_variants_value(&mut self, value: Value) -> Result<&[VariantRef]> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(CatalogError::InvalidArgument(format!(
                    "variants must be a list, got {}",
                    json_kind(&other)
                )))
            }
        };

        let refs = items
            .into_iter()
            .map(|item| match item {
                Value::String(code) => Ok(VariantRef::Code(code)),
                obj @ Value::Object(_) => serde_json::from_value(obj)
                    .map(VariantRef::Resolved)
                    .map_err(|e| {
                        CatalogError::InvalidArgument(format!("malformed variant: {}", e))
                    }),
                other => Err(CatalogError::InvalidArgument(format!(
                    "variant entries must be codes or variants, got {}",
                    json_kind(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.set_variants(refs))
    }

    /// Read the variants, resolving any stored codes against the package.
    ///
    /// Fails with [`CatalogError::VariantNotFound`] on the first code the
    /// package does not offer. A failed read leaves the stored list as it
    /// was, so a retry resolves from scratch.
    pub fn variants(&mut self) -> Result<Vec<&Variant>> {
        self.resolve_variants()?;
        Ok(self
            .variants
            .iter()
            .filter_map(VariantRef::as_resolved)
            .collect())
    }

    fn resolve_variants(&mut self) -> Result<()> {
        if self.variants.iter().all(VariantRef::is_resolved) {
            return Ok(());
        }

        let package = &self.package;
        let resolved = self
            .variants
            .iter()
            .map(|entry| match entry {
                VariantRef::Resolved(variant) => Ok(VariantRef::Resolved(variant.clone())),
                VariantRef::Code(code) => package
                    .find_variant_by_code(code)
                    .cloned()
                    .map(VariantRef::Resolved)
                    .ok_or_else(|| CatalogError::VariantNotFound(code.clone())),
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(package = %self.package.code, count = resolved.len(), "resolved purchase variants");
        self.variants = resolved;
        Ok(())
    }

    // -- Coupon ------------------------------------------------------------

    /// Assign, replace or clear the coupon.
    ///
    /// - `None` clears it.
    /// - A resolved coupon is stored as given.
    /// - A code is looked up for this purchase's package and organization. An
    ///   unknown code clears the coupon. A found coupon has its discount capped
    ///   at the current subtotal before being stored.
    pub fn assign_coupon(&mut self, source: Option<CouponSource>) -> Result<Option<&Coupon>> {
        self.coupon = match source {
            None => None,
            Some(CouponSource::Coupon(coupon)) => Some(coupon),
            Some(CouponSource::Code(code)) => self.resolve_coupon(&code)?,
        };
        Ok(self.coupon.as_ref())
    }

    /// Look up a coupon code and attach it. See [`assign_coupon`](Self::assign_coupon).
    pub fn apply_coupon_code(&mut self, code: &str) -> Result<Option<&Coupon>> {
        self.assign_coupon(Some(CouponSource::Code(code.to_string())))
    }

    /// Attach an already-resolved coupon without looking it up or capping it.
    pub fn set_coupon(&mut self, coupon: Coupon) {
        self.coupon = Some(coupon);
    }

    pub fn clear_coupon(&mut self) {
        self.coupon = None;
    }

    fn resolve_coupon(&mut self, code: &str) -> Result<Option<Coupon>> {
        let found = self.catalog.lookup_coupon(
            code,
            &self.package.code,
            self.organization.as_deref(),
        );
        let Some(mut coupon) = found else {
            debug!(coupon = code, package = %self.package.code, "coupon not found; purchase carries no coupon");
            return Ok(None);
        };

        let subtotal = self.subtotal_in_cents()?;
        let requested = coupon.discount_in_cents;
        if coupon.clamp_discount(subtotal) {
            info!(
                coupon = %coupon.code,
                requested,
                applied = coupon.discount_in_cents,
                "coupon discount capped at purchase subtotal"
            );
        }
        Ok(Some(coupon))
    }

    // -- Pricing -----------------------------------------------------------

    /// Package cost plus the cost of every chosen variant.
    ///
    /// Fails with [`CatalogError::InvalidArgument`] when the sum does not fit
    /// in a `u64`.
    pub fn subtotal_in_cents(&mut self) -> Result<u64> {
        let base = self.package.cost_in_cents;
        self.variants()?
            .iter()
            .try_fold(base, |acc, v| acc.checked_add(v.cost_in_cents))
            .ok_or_else(|| CatalogError::InvalidArgument("subtotal overflows".to_string()))
    }

    /// Subtotal minus the coupon discount. Negative only when a resolved
    /// coupon larger than the subtotal was attached directly.
    ///
    /// Fails with [`CatalogError::InvalidArgument`] when the subtotal or the
    /// discount does not fit in an `i64`.
    pub fn total_in_cents(&mut self) -> Result<i64> {
        let subtotal = i64::try_from(self.subtotal_in_cents()?)
            .map_err(|_| CatalogError::InvalidArgument("subtotal overflows".to_string()))?;
        let discount = i64::try_from(self.coupon.as_ref().map_or(0, |c| c.discount_in_cents))
            .map_err(|_| CatalogError::InvalidArgument("discount overflows".to_string()))?;
        // Both operands are non-negative, so the difference cannot overflow.
        Ok(subtotal - discount)
    }

    pub fn subtotal(&mut self) -> Result<f64> {
        Ok(money::unsigned_to_dollars(self.subtotal_in_cents()?))
    }

    pub fn total(&mut self) -> Result<f64> {
        Ok(money::to_dollars(self.total_in_cents()?))
    }

    /// Snapshot of the purchase with freshly computed totals.
    pub fn summary(&mut self) -> Result<PurchaseSummary> {
        let subtotal_in_cents = self.subtotal_in_cents()?;
        let total_in_cents = self.total_in_cents()?;
        let variants = self.variants()?.into_iter().cloned().collect();
        Ok(PurchaseSummary {
            package: self.package.clone(),
            variants,
            coupon: self.coupon.clone(),
            organization: self.organization.clone(),
            subtotal_in_cents,
            subtotal: money::unsigned_to_dollars(subtotal_in_cents),
            total_in_cents,
            total: money::to_dollars(total_in_cents),
        })
    }

    /// The summary as a JSON value.
    pub fn to_json(&mut self) -> Result<Value> {
        Ok(serde_json::to_value(self.summary()?)?)
    }
}

impl fmt::Debug for Purchase<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Purchase")
            .field("package", &self.package.code)
            .field("variants", &self.variants)
            .field("coupon", &self.coupon)
            .field("organization", &self.organization)
            .finish()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
