//! Shared test fixtures for the catalog SDK integration tests.
//!
//! Provides a sample "vitamins" package, an in-memory catalog holding it, a
//! lookup wrapper that counts calls, and `StubServer`, a tiny HTTP server on
//! a loopback port that replays canned JSON responses.

#![allow(dead_code)]

use std::cell::Cell;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use catalog_sdk::{CatalogLookup, Coupon, InMemoryCatalog, Package, Variant};

/// Install a test-writer tracing subscriber (honours `RUST_LOG`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn variant(code: &str, name: &str, cost_in_cents: u64) -> Variant {
    Variant {
        code: code.to_string(),
        name: name.to_string(),
        cost_in_cents,
    }
}

/// Package costing 14900 with `vitamin_d` (4000) and `vitamin_b` (1000).
pub fn vitamins() -> Package {
    Package {
        code: "vitamins".to_string(),
        name: "Vitamin Panel".to_string(),
        description: Some("Core vitamin levels".to_string()),
        cost_in_cents: 14900,
        active: Some(true),
        variants: vec![
            variant("vitamin_d", "Vitamin D", 4000),
            variant("vitamin_b", "Vitamin B", 1000),
        ],
    }
}

/// Inactive package with no variants.
pub fn legacy_panel() -> Package {
    Package {
        code: "legacy".to_string(),
        name: "Legacy Panel".to_string(),
        description: None,
        cost_in_cents: 5000,
        active: None,
        variants: Vec::new(),
    }
}

pub fn coupon(code: &str, discount_in_cents: u64, organization: Option<&str>) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount_in_cents,
        organization: organization.map(str::to_string),
        product_key: "vitamins".to_string(),
    }
}

/// Catalog with `vitamins`, `legacy`, a `BIGSAVE` coupon worth 9999999, a
/// `TENOFF` coupon worth 1000 and an `ACMEONLY` coupon scoped to `acme`.
pub fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_package(vitamins())
        .with_package(legacy_panel())
        .with_coupon(coupon("BIGSAVE", 9_999_999, None))
        .with_coupon(coupon("TENOFF", 1000, None))
        .with_coupon(coupon("ACMEONLY", 2500, Some("acme")))
}

pub fn vitamins_json() -> serde_json::Value {
    serde_json::json!({
        "code": "vitamins",
        "name": "Vitamin Panel",
        "description": "Core vitamin levels",
        "costInCents": 14900,
        "active": true,
        "variants": [
            { "code": "vitamin_d", "name": "Vitamin D", "costInCents": 4000 },
            { "code": "vitamin_b", "name": "Vitamin B", "costInCents": 1000 }
        ]
    })
}

// ---------------------------------------------------------------------------
// CountingCatalog
// ---------------------------------------------------------------------------

/// Wraps a lookup and counts how often each operation is called.
pub struct CountingCatalog<L> {
    pub inner: L,
    pub package_calls: Cell<usize>,
    pub list_calls: Cell<usize>,
    pub coupon_calls: Cell<usize>,
}

impl<L: CatalogLookup> CountingCatalog<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            package_calls: Cell::new(0),
            list_calls: Cell::new(0),
            coupon_calls: Cell::new(0),
        }
    }
}

impl<L: CatalogLookup> CatalogLookup for CountingCatalog<L> {
    fn lookup_package(&self, code: &str) -> Option<Package> {
        self.package_calls.set(self.package_calls.get() + 1);
        self.inner.lookup_package(code)
    }

    fn list_packages(&self) -> Option<Vec<Package>> {
        self.list_calls.set(self.list_calls.get() + 1);
        self.inner.list_packages()
    }

    fn lookup_coupon(
        &self,
        code: &str,
        product_key: &str,
        organization: Option<&str>,
    ) -> Option<Coupon> {
        self.coupon_calls.set(self.coupon_calls.get() + 1);
        self.inner.lookup_coupon(code, product_key, organization)
    }
}

// ---------------------------------------------------------------------------
// StubServer
// ---------------------------------------------------------------------------

/// A canned response for one request path (query string excluded).
#[derive(Clone)]
pub struct Route {
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn json(path: &str, body: serde_json::Value) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn raw(path: &str, status: u16, body: &str) -> Self {
        Self {
            path: path.to_string(),
            status,
            body: body.to_string(),
        }
    }
}

/// Loopback HTTP server answering each connection with the matching route,
/// or 404 when no route matches. Records every request target it sees.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header) {
                        Ok(0) => break,
                        Ok(_) if header == "\r\n" || header == "\n" => break,
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }

                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                seen.lock().unwrap().push(target.clone());

                let path = target.split('?').next().unwrap_or("/");
                let (status, body) = routes
                    .iter()
                    .find(|r| r.path == path)
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, r#"{"error":"not found"}"#.to_string()));

                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self {
            base_url: format!("http://{}/", addr),
            requests,
        }
    }

    /// Request targets (path plus query) received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Base URL of a loopback port nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}
