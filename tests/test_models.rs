//! Entity tests: variant lookup, activity, equality, validation and JSON shape.

mod common;

use catalog_sdk::{money, CatalogError, Coupon, Package};

// ---------------------------------------------------------------------------
// Package
// ---------------------------------------------------------------------------

#[test]
fn find_variant_by_code_returns_matching_variant() {
    let package = common::vitamins();
    let found = package.find_variant_by_code("vitamin_b").unwrap();
    assert_eq!(found.name, "Vitamin B");
    assert_eq!(found.cost_in_cents, 1000);
}

#[test]
fn find_variant_by_code_is_case_sensitive() {
    let package = common::vitamins();
    assert!(package.find_variant_by_code("VITAMIN_D").is_none());
    assert!(package.find_variant_by_code("vitamin_z").is_none());
}

#[test]
fn is_active_treats_missing_flag_as_inactive() {
    let mut package = common::vitamins();
    assert!(package.is_active());

    package.active = Some(false);
    assert!(!package.is_active());

    package.active = None;
    assert!(!package.is_active());
}

#[test]
fn packages_compare_by_value() {
    let a = common::vitamins();
    let b = common::vitamins();
    assert_eq!(a, b);

    let mut c = common::vitamins();
    c.variants[0].cost_in_cents += 1;
    assert_ne!(a, c);
}

#[test]
fn validate_rejects_duplicate_variant_codes() {
    let mut package = common::vitamins();
    assert!(package.validate().is_ok());

    package
        .variants
        .push(common::variant("vitamin_d", "Vitamin D again", 10));
    let err = package.validate().unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArgument(_)));
}

#[test]
fn package_cost_in_dollars() {
    assert_eq!(common::vitamins().cost(), 149.0);
    assert_eq!(common::vitamins().variants[0].cost(), 40.0);
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[test]
fn package_deserializes_from_camel_case_json() {
    let package: Package = serde_json::from_value(common::vitamins_json()).unwrap();
    assert_eq!(package, common::vitamins());
}

#[test]
fn package_without_variants_defaults_to_empty_list() {
    let package: Package = serde_json::from_value(serde_json::json!({
        "code": "basic",
        "name": "Basic",
        "description": null,
        "costInCents": 100,
        "active": null
    }))
    .unwrap();
    assert!(package.variants.is_empty());
    assert!(!package.is_active());
}

#[test]
fn negative_cost_is_rejected() {
    let result: Result<Package, _> = serde_json::from_value(serde_json::json!({
        "code": "broken",
        "name": "Broken",
        "costInCents": -5
    }));
    assert!(result.is_err());
}

#[test]
fn package_serializes_camel_case_fields() {
    let value = serde_json::to_value(common::vitamins()).unwrap();
    assert_eq!(value["costInCents"], 14900);
    assert_eq!(value["variants"][1]["costInCents"], 1000);
}

// ---------------------------------------------------------------------------
// Coupon
// ---------------------------------------------------------------------------

#[test]
fn coupon_deserializes_from_camel_case_json() {
    let coupon: Coupon = serde_json::from_value(serde_json::json!({
        "code": "WELCOME",
        "discountInCents": 2500,
        "organization": "acme",
        "productKey": "vitamins"
    }))
    .unwrap();
    assert_eq!(coupon, common::coupon("WELCOME", 2500, Some("acme")));
    assert_eq!(coupon.discount(), 25.0);
}

#[test]
fn clamp_discount_caps_and_reports_change() {
    let mut coupon = common::coupon("BIG", 9_999_999, None);
    assert!(coupon.clamp_discount(14900));
    assert_eq!(coupon.discount_in_cents, 14900);

    assert!(!coupon.clamp_discount(20000));
    assert_eq!(coupon.discount_in_cents, 14900);
}

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

#[test]
fn dollars_use_plain_division() {
    assert_eq!(money::to_dollars(19900), 199.0);
    assert_eq!(money::to_dollars(-250), -2.5);
    assert_eq!(money::unsigned_to_dollars(1), 0.01);
}
