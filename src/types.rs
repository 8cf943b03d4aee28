//! Type definitions for the purchasekit SDK

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{PurchaseError, Result};

/// Purchase configuration as served by the remote config endpoint.
///
/// Every field is optional: the endpoint may carry any subset, and only
/// the fields actually present are mirrored into the preference store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseConfig {
    /// Current app price. Served as either a JSON number or a numeric
    /// string depending on the endpoint.
    #[serde(deserialize_with = "flexible_price", skip_serializing_if = "Option::is_none")]
    pub app_price: Option<f64>,
    /// Paywall enforcement on/off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need_purchase: Option<bool>,
    /// Keyboard extension paywall on/off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need_keyboard_purchase: Option<bool>,
    /// Hide the purchase entry point entirely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_purchase_entry: Option<bool>,
    /// Trigger count at which the first rating prompt fires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub try_rating_trigger_count: Option<i64>,
    /// Trigger interval between repeat rating prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_trigger_count: Option<i64>,
    /// Running trigger counter (rarely served, supported for completeness)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_trigger_count: Option<i64>,
}

impl PurchaseConfig {
    /// Parse a config payload from an already-deserialized JSON value.
    ///
    /// Accepts both the wrapped document form `{"purchaseConfig": {...}}`
    /// and the flat form `{...}`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let payload = match value.get("purchaseConfig") {
            Some(inner) => inner,
            None => value,
        };

        if !payload.is_object() {
            return Err(PurchaseError::parse("Config payload is not a JSON object"));
        }

        serde_json::from_value(payload.clone())
            .map_err(|e| PurchaseError::parse(format!("Failed to parse purchase config: {}", e)))
    }
}

/// Parse a purchase configuration document from a response body.
pub fn parse_config_document(body: &str) -> Result<PurchaseConfig> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| PurchaseError::parse(format!("Config document is not JSON: {}", e)))?;
    PurchaseConfig::from_value(&value)
}

/// Extract the app price from a store lookup payload.
///
/// The lookup endpoint returns `{"results": [{"price": ...}, ...]}`; the
/// first result's price wins. The price itself may be a number or a
/// numeric string.
pub fn lookup_price_from_value(value: &Value) -> Result<f64> {
    let price = value
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .and_then(|first| first.get("price"))
        .ok_or_else(|| PurchaseError::parse("Lookup response has no results[0].price"))?;

    match price {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PurchaseError::parse("Price is not representable as f64")),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| PurchaseError::parse(format!("Price string is not numeric: {:?}", s))),
        other => Err(PurchaseError::parse(format!(
            "Price has unexpected type: {}",
            other
        ))),
    }
}

/// Parse a store lookup response body into an app price.
pub fn parse_lookup_price(body: &str) -> Result<f64> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| PurchaseError::parse(format!("Lookup response is not JSON: {}", e)))?;
    lookup_price_from_value(&value)
}

/// Outcome reported by the platform store's transaction queue.
///
/// The SDK only records outcomes; running the purchase/restore flow is the
/// platform's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Payment transaction completed
    Purchased,
    /// A previous purchase was restored
    Restored,
    /// Transaction failed
    Failed,
    /// User cancelled the payment sheet
    Cancelled,
}

/// Decision from registering a rating trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingPrompt {
    /// Conditions met: present the platform review dialog now
    Show,
    /// Not this time
    Skip,
}

fn flexible_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    let raw: Option<Raw> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Text(s)) => s.parse::<f64>().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_document() {
        let body = r#"{"purchaseConfig": {"needPurchase": true, "appPrice": 6.0, "tryRatingTriggerCount": 20}}"#;
        let config = parse_config_document(body).unwrap();
        assert_eq!(config.need_purchase, Some(true));
        assert_eq!(config.app_price, Some(6.0));
        assert_eq!(config.try_rating_trigger_count, Some(20));
        assert_eq!(config.need_keyboard_purchase, None);
    }

    #[test]
    fn parses_flat_document() {
        let body = r#"{"needPurchase": false, "needKeyboardPurchase": true}"#;
        let config = parse_config_document(body).unwrap();
        assert_eq!(config.need_purchase, Some(false));
        assert_eq!(config.need_keyboard_purchase, Some(true));
        assert_eq!(config.app_price, None);
    }

    #[test]
    fn price_accepts_string_form() {
        let body = r#"{"purchaseConfig": {"appPrice": "3.5"}}"#;
        let config = parse_config_document(body).unwrap();
        assert_eq!(config.app_price, Some(3.5));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let body = r#"{"purchaseConfig": {"needPurchase": true, "banner": "hello"}}"#;
        let config = parse_config_document(body).unwrap();
        assert_eq!(config.need_purchase, Some(true));
    }

    #[test]
    fn rejects_non_object_payload() {
        assert!(parse_config_document(r#"[1, 2, 3]"#).is_err());
        assert!(parse_config_document("not json at all").is_err());
        assert!(parse_config_document(r#"{"purchaseConfig": 42}"#).is_err());
    }

    #[test]
    fn lookup_price_number_and_string() {
        let numeric = r#"{"resultCount": 1, "results": [{"price": 6.0, "trackName": "App"}]}"#;
        assert_eq!(parse_lookup_price(numeric).unwrap(), 6.0);

        let text = r#"{"results": [{"price": "1.99"}]}"#;
        assert_eq!(parse_lookup_price(text).unwrap(), 1.99);
    }

    #[test]
    fn lookup_price_first_result_wins() {
        let body = r#"{"results": [{"price": 2.0}, {"price": 9.0}]}"#;
        assert_eq!(parse_lookup_price(body).unwrap(), 2.0);
    }

    #[test]
    fn lookup_price_missing_is_error() {
        assert!(parse_lookup_price(r#"{"results": []}"#).is_err());
        assert!(parse_lookup_price(r#"{"resultCount": 0}"#).is_err());
        assert!(parse_lookup_price(r#"{"results": [{"price": true}]}"#).is_err());
    }
}
