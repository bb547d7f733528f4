//! Coupon queries.

use crate::lookup::CatalogLookup;
use crate::models::Coupon;

/// Query interface for coupons, scoped to a default organization.
pub struct CouponQuery<'a> {
    lookup: &'a dyn CatalogLookup,
    organization: Option<&'a str>,
}

impl<'a> CouponQuery<'a> {
    pub fn new(lookup: &'a dyn CatalogLookup, organization: Option<&'a str>) -> Self {
        Self {
            lookup,
            organization,
        }
    }

    /// Find a coupon issued for `product_key` in the default organization.
    pub fn find(&self, code: &str, product_key: &str) -> Option<Coupon> {
        self.lookup.lookup_coupon(code, product_key, self.organization)
    }

    /// Find a coupon issued for `product_key` in an explicit organization.
    pub fn find_for(
        &self,
        code: &str,
        product_key: &str,
        organization: Option<&str>,
    ) -> Option<Coupon> {
        self.lookup.lookup_coupon(code, product_key, organization)
    }
}
