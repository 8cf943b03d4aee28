//! Config and price reload behavior: mirroring into the store, and the
//! failure paths that must leave cached values untouched.

use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn reload_mirrors_config_into_store() {
    let url = serve_once(200, WRAPPED_CONFIG);
    let profile = StoreProfile {
        config_url: url,
        ..test_profile()
    };
    let (client, store) = memory_client(profile);

    let config = client.reload_config().await.expect("reload should succeed");

    assert_eq!(config.need_purchase, Some(true));
    assert_eq!(config.app_price, Some(6.0));
    assert_eq!(store.get_bool(keys::NEED_PURCHASE), Some(true));
    assert_eq!(store.get_f64(keys::APP_PRICE), Some(6.0));
    assert_eq!(store.get_i64(keys::TRY_RATING_TRIGGER_COUNT), Some(2));
    assert_eq!(store.get_i64(keys::RATED_TRIGGER_COUNT), Some(3));
    assert_eq!(client.cached_app_price(), Some(6.0));
}

#[test]
fn blocking_reload_mirrors_config_into_store() {
    let url = serve_once(200, WRAPPED_CONFIG);
    let profile = StoreProfile {
        config_url: url,
        ..test_profile()
    };
    let (client, store) = blocking_memory_client(profile);

    let config = client.reload_config().expect("reload should succeed");

    assert_eq!(config.need_purchase, Some(true));
    assert_eq!(store.get_bool(keys::NEED_PURCHASE), Some(true));
    assert_eq!(store.get_f64(keys::APP_PRICE), Some(6.0));
}

#[tokio::test]
async fn network_failure_keeps_cached_values() {
    // test_profile points config_url at an unroutable port.
    let (client, store) = memory_client(test_profile());
    store.set(keys::NEED_PURCHASE, &json!(true));
    store.set(keys::APP_PRICE, &json!(3.5));

    assert!(client.reload_config().await.is_err());

    assert_eq!(store.get_bool(keys::NEED_PURCHASE), Some(true));
    assert_eq!(store.get_f64(keys::APP_PRICE), Some(3.5));
}

#[tokio::test]
async fn malformed_body_keeps_cached_values() {
    let url = serve_once(200, "not json at all");
    let profile = StoreProfile {
        config_url: url,
        ..test_profile()
    };
    let (client, store) = memory_client(profile);
    store.set(keys::NEED_PURCHASE, &json!(false));

    assert!(client.reload_config().await.is_err());
    assert_eq!(store.get_bool(keys::NEED_PURCHASE), Some(false));
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let url = serve_once(404, r#"{"error": "gone"}"#);
    let profile = StoreProfile {
        config_url: url,
        ..test_profile()
    };
    let (client, _store) = memory_client(profile);

    let err = client.reload_config().await.expect_err("404 should fail");
    assert_eq!(err.code, purchasekit::PurchaseErrorCode::NotFound);
    assert_eq!(err.status, Some(404));
}

#[tokio::test]
async fn partial_config_leaves_absent_keys_alone() {
    let url = serve_once(200, r#"{"purchaseConfig": {"needPurchase": false}}"#);
    let profile = StoreProfile {
        config_url: url,
        ..test_profile()
    };
    let (client, store) = memory_client(profile);
    store.set(keys::APP_PRICE, &json!(9.99));
    store.set(keys::TRY_RATING_TRIGGER_COUNT, &json!(7));

    client.reload_config().await.expect("reload should succeed");

    assert_eq!(store.get_bool(keys::NEED_PURCHASE), Some(false));
    assert_eq!(store.get_f64(keys::APP_PRICE), Some(9.99));
    assert_eq!(store.get_i64(keys::TRY_RATING_TRIGGER_COUNT), Some(7));
}

#[test]
fn seed_defaults_fill_only_missing_keys() {
    let (client, store) = memory_client(test_profile());
    store.set(keys::NEED_PURCHASE, &json!(false));

    client.seed_default_config();

    // The fetched value survives; the rest get the built-in defaults.
    assert_eq!(store.get_bool(keys::NEED_PURCHASE), Some(false));
    assert_eq!(store.get_bool(keys::HIDE_PURCHASE_ENTRY), Some(false));
    assert_eq!(store.get_i64(keys::TRY_RATING_TRIGGER_COUNT), Some(20));
    assert_eq!(store.get_i64(keys::RATED_TRIGGER_COUNT), Some(100));
}

#[test]
fn seed_defaults_is_idempotent() {
    let (client, store) = memory_client(test_profile());

    client.seed_default_config();
    store.set(keys::TRY_RATING_TRIGGER_COUNT, &json!(99));
    client.seed_default_config();

    assert_eq!(store.get_i64(keys::TRY_RATING_TRIGGER_COUNT), Some(99));
}

#[tokio::test]
async fn price_reload_caches_the_price() {
    let url = serve_once(200, LOOKUP_RESPONSE);
    let profile = StoreProfile {
        lookup_url: url,
        ..test_profile()
    };
    let (client, store) = memory_client(profile);

    let price = client.reload_app_price().await.expect("lookup should succeed");
    assert_eq!(price, 1.99);
    assert_eq!(store.get_f64(keys::APP_PRICE), Some(1.99));
}

#[tokio::test]
async fn price_reload_failure_keeps_cached_price() {
    let (client, store) = memory_client(test_profile());
    store.set(keys::APP_PRICE, &json!(6.0));

    assert!(client.reload_app_price().await.is_err());
    assert_eq!(client.cached_app_price(), Some(6.0));
    assert_eq!(store.get_f64(keys::APP_PRICE), Some(6.0));
}

#[test]
fn blocking_price_reload_caches_the_price() {
    let url = serve_once(200, LOOKUP_RESPONSE);
    let profile = StoreProfile {
        lookup_url: url,
        ..test_profile()
    };
    let (client, store) = blocking_memory_client(profile);

    let price = client.reload_app_price().expect("lookup should succeed");
    assert_eq!(price, 1.99);
    assert_eq!(store.get_f64(keys::APP_PRICE), Some(1.99));
}
