use serde::{Deserialize, Serialize};

use crate::money;

// ---------------------------------------------------------------------------
// Coupon — Discount issued against one package code
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub discount_in_cents: u64,
    pub organization: Option<String>,
    /// Code of the package the coupon was issued for.
    pub product_key: String,
}

impl Coupon {
    pub fn discount(&self) -> f64 {
        money::unsigned_to_dollars(self.discount_in_cents)
    }

    /// Cap the discount at `limit_in_cents`, returning `true` if it changed.
    pub fn clamp_discount(&mut self, limit_in_cents: u64) -> bool {
        if self.discount_in_cents > limit_in_cents {
            self.discount_in_cents = limit_in_cents;
            true
        } else {
            false
        }
    }
}
