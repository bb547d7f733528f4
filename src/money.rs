//! Money conversions.
//!
//! Amounts are carried as integer cents everywhere. Dollars exist only for
//! display and are derived with plain floating-point division.

/// Convert a signed amount in cents to dollars.
pub fn to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Convert an unsigned amount in cents to dollars.
pub fn unsigned_to_dollars(cents: u64) -> f64 {
    cents as f64 / 100.0
}
