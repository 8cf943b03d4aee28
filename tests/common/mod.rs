//! Test utilities and fixtures for purchasekit integration tests

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;

use serde_json::json;

pub use purchasekit::blocking;
pub use purchasekit::{
    keys, MemoryStore, PreferenceStore, PurchaseClient, PurchaseOptions, StoreProfile,
    TransactionOutcome,
};

/// A config document in the wrapped form the production endpoint serves
pub const WRAPPED_CONFIG: &str = r#"{
    "purchaseConfig": {
        "appPrice": 6.0,
        "needPurchase": true,
        "needKeyboardPurchase": false,
        "hidePurchaseEntry": false,
        "tryRatingTriggerCount": 2,
        "ratedTriggerCount": 3
    }
}"#;

/// A store lookup response with one result
pub const LOOKUP_RESPONSE: &str = r#"{
    "resultCount": 1,
    "results": [{"trackName": "Test App", "price": 1.99}]
}"#;

/// A profile pointing at unroutable endpoints; fine for offline tests.
pub fn test_profile() -> StoreProfile {
    StoreProfile {
        product_id: "com.example.TestApp_NoAds".to_string(),
        config_url: "http://127.0.0.1:1/iap_config.json".to_string(),
        lookup_url: "http://127.0.0.1:1/lookup".to_string(),
        reviews_url: "http://127.0.0.1:1/reviews".to_string(),
        enforce_after: "2020-07-01".to_string(),
    }
}

/// Async client over a fresh in-memory store; returns the store too so
/// tests can seed and inspect it.
pub fn memory_client(profile: StoreProfile) -> (PurchaseClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let client = PurchaseClient::new(
        profile,
        PurchaseOptions {
            storage: Some(store.clone()),
        },
    )
    .expect("Failed to create client");
    (client, store)
}

/// Blocking client over a fresh in-memory store.
pub fn blocking_memory_client(
    profile: StoreProfile,
) -> (blocking::PurchaseClient, Arc<MemoryStore>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Arc::new(MemoryStore::new());
    let client = blocking::PurchaseClient::with_options(
        profile,
        dir.path(),
        blocking::PurchaseOptions {
            storage: Some(store.clone()),
        },
    )
    .expect("Failed to create client");
    (client, store)
}

/// Mark the store as purchased, the way a recorded transaction would.
pub fn seed_purchased(store: &MemoryStore) {
    store.set(keys::IS_PURCHASED, &json!(true));
}

/// Serve exactly one HTTP response on a local port and return its URL.
pub fn serve_once(status: u16, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener addr");

    let response = format!(
        "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{}", addr)
}
