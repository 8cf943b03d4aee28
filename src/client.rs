//! Async purchase client using reqwest

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::{keys, StoreProfile};
use crate::error::{map_status_to_error_code, PurchaseError, Result};
use crate::storage::{MemoryStore, PreferenceStore};
use crate::types::{
    lookup_price_from_value, PurchaseConfig, RatingPrompt, TransactionOutcome,
};
use crate::{eligibility, rating};

/// Built-in fallback when the remote config was never fetched
const DEFAULT_TRY_RATING_TRIGGER_COUNT: i64 = 50;
const DEFAULT_RATED_TRIGGER_COUNT: i64 = 200;

/// Configuration options for the purchase client
#[derive(Clone, Default)]
pub struct PurchaseOptions {
    /// Custom preference store (default: MemoryStore)
    pub storage: Option<Arc<dyn PreferenceStore>>,
}

impl std::fmt::Debug for PurchaseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseOptions")
            .field("storage", &"<storage>")
            .finish()
    }
}

/// Purchase eligibility client.
///
/// Holds a [`StoreProfile`] and a [`PreferenceStore`]; fetches the remote
/// purchase configuration, mirrors it into the store, and answers the
/// paywall questions the host app asks on launch. The platform store's own
/// purchase/restore flow stays outside: the client only records its
/// outcome via [`record_transaction`](Self::record_transaction).
///
/// # Example
/// ```rust,ignore
/// use purchasekit::{PurchaseClient, StoreProfile};
///
/// let client = PurchaseClient::new(StoreProfile::default(), Default::default())?;
///
/// // On launch: refresh config, then decide whether to show the paywall.
/// if client.reload_config().await.is_err() {
///     client.seed_default_config();
/// }
/// if client.is_need_purchase() {
///     show_paywall(client.cached_app_price());
/// }
/// ```
pub struct PurchaseClient {
    profile: StoreProfile,
    storage: Arc<dyn PreferenceStore>,
    http: HttpClient,
}

impl PurchaseClient {
    /// Create a new purchase client.
    ///
    /// # Arguments
    /// * `profile` - Per-app store configuration
    /// * `options` - Optional configuration
    pub fn new(profile: StoreProfile, options: PurchaseOptions) -> Result<Self> {
        validate_profile(&profile)?;

        let storage: Arc<dyn PreferenceStore> = options
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));

        let http = HttpClient::builder()
            .user_agent(concat!("purchasekit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PurchaseError::network(e.to_string()))?;

        Ok(Self {
            profile,
            storage,
            http,
        })
    }

    /// The profile this client was created with.
    pub fn profile(&self) -> &StoreProfile {
        &self.profile
    }

    // ==================== Remote Config ====================

    /// Fetch the purchase configuration and mirror it into the store.
    ///
    /// Single attempt, platform-default timeout. On network or parse
    /// failure nothing is written: previously cached values stay intact
    /// and the error is returned to the caller.
    pub async fn reload_config(&self) -> Result<PurchaseConfig> {
        let document = match self.get_json(&self.profile.config_url).await {
            Ok(v) => v,
            Err(e) => {
                warn!(url = %self.profile.config_url, error = %e, "config reload failed");
                return Err(e);
            }
        };

        let config = match PurchaseConfig::from_value(&document) {
            Ok(c) => c,
            Err(e) => {
                warn!(url = %self.profile.config_url, error = %e, "config reload failed");
                return Err(e);
            }
        };

        self.apply_config(&config);
        Ok(config)
    }

    /// Mirror every present field of a config into the preference store.
    ///
    /// Absent fields leave their cached values untouched.
    pub fn apply_config(&self, config: &PurchaseConfig) {
        if let Some(price) = config.app_price {
            self.storage.set(keys::APP_PRICE, &json!(price));
        }
        if let Some(flag) = config.need_purchase {
            self.storage.set(keys::NEED_PURCHASE, &json!(flag));
        }
        if let Some(flag) = config.need_keyboard_purchase {
            self.storage.set(keys::NEED_KEYBOARD_PURCHASE, &json!(flag));
        }
        if let Some(flag) = config.hide_purchase_entry {
            self.storage.set(keys::HIDE_PURCHASE_ENTRY, &json!(flag));
        }
        if let Some(count) = config.try_rating_trigger_count {
            self.storage.set(keys::TRY_RATING_TRIGGER_COUNT, &json!(count));
        }
        if let Some(count) = config.rated_trigger_count {
            self.storage.set(keys::RATED_TRIGGER_COUNT, &json!(count));
        }
        if let Some(count) = config.current_trigger_count {
            self.storage.set(keys::CURRENT_TRIGGER_COUNT, &json!(count));
        }
        debug!("purchase config applied");
    }

    /// Seed the built-in default configuration.
    ///
    /// Only keys with no cached value are written, so a previously fetched
    /// config is never clobbered. Intended for first run when the remote
    /// endpoint is unreachable.
    pub fn seed_default_config(&self) {
        let defaults: [(&str, Value); 4] = [
            (keys::NEED_PURCHASE, json!(true)),
            (keys::HIDE_PURCHASE_ENTRY, json!(false)),
            (keys::TRY_RATING_TRIGGER_COUNT, json!(20)),
            (keys::RATED_TRIGGER_COUNT, json!(100)),
        ];

        for (key, value) in defaults {
            if self.storage.get(key).is_none() {
                self.storage.set(key, &value);
            }
        }
    }

    /// Fetch the current app price from the store lookup endpoint and
    /// cache it.
    ///
    /// Failure leaves any cached price intact.
    pub async fn reload_app_price(&self) -> Result<f64> {
        let document = match self.get_json(&self.profile.lookup_url).await {
            Ok(v) => v,
            Err(e) => {
                warn!(url = %self.profile.lookup_url, error = %e, "price reload failed");
                return Err(e);
            }
        };

        let price = lookup_price_from_value(&document)?;
        self.storage.set(keys::APP_PRICE, &json!(price));
        Ok(price)
    }

    /// The last fetched app price, if any.
    pub fn cached_app_price(&self) -> Option<f64> {
        self.storage.get_f64(keys::APP_PRICE)
    }

    // ==================== Eligibility ====================

    /// Whether the paywall must be shown before allowing full app use.
    ///
    /// Once a purchase has been recorded this is false forever, regardless
    /// of what the remote config says.
    pub fn is_need_purchase(&self) -> bool {
        self.is_need_purchase_on(Utc::now().date_naive())
    }

    /// [`is_need_purchase`](Self::is_need_purchase) with an explicit
    /// "today", for deterministic tests.
    pub fn is_need_purchase_on(&self, today: NaiveDate) -> bool {
        let purchased = self.storage.get_bool(keys::IS_PURCHASED).unwrap_or(false);
        let flag = self.storage.get_bool(keys::NEED_PURCHASE).unwrap_or(false);
        let reached = eligibility::reached_threshold(&self.profile.enforce_after, today);
        eligibility::need_purchase(purchased, flag, reached)
    }

    /// Whether the user counts as purchased.
    ///
    /// True when a transaction was recorded, or when the app does not
    /// require purchase at all.
    pub fn is_purchased(&self) -> bool {
        if self.storage.get_bool(keys::IS_PURCHASED).unwrap_or(false) {
            return true;
        }
        !self.is_need_purchase()
    }

    /// Whether the purchase entry point should be hidden entirely.
    pub fn hide_purchase_entry(&self) -> bool {
        self.storage
            .get_bool(keys::HIDE_PURCHASE_ENTRY)
            .unwrap_or(false)
    }

    /// Whether the keyboard extension has its own paywall.
    pub fn need_keyboard_purchase(&self) -> bool {
        self.storage
            .get_bool(keys::NEED_KEYBOARD_PURCHASE)
            .unwrap_or(false)
    }

    // ==================== Transactions ====================

    /// Record the outcome of a platform store transaction.
    ///
    /// `Purchased` and `Restored` persist the purchased flag; `Failed` and
    /// `Cancelled` change nothing. The flag is set once and never cleared.
    /// Returns the resulting purchased state.
    pub fn record_transaction(&self, outcome: TransactionOutcome) -> bool {
        match outcome {
            TransactionOutcome::Purchased | TransactionOutcome::Restored => {
                self.storage.set(keys::IS_PURCHASED, &json!(true));
                debug!(?outcome, "purchase recorded");
            }
            TransactionOutcome::Failed | TransactionOutcome::Cancelled => {}
        }
        self.storage.get_bool(keys::IS_PURCHASED).unwrap_or(false)
    }

    // ==================== Rating ====================

    /// Count one rating trigger and decide whether to prompt.
    ///
    /// Reads the pacing values mirrored from the remote config, increments
    /// the persistent counter, and returns whether the host app should
    /// request the platform review dialog now.
    pub fn register_rating_trigger(&self) -> RatingPrompt {
        let try_at = self
            .storage
            .get_i64(keys::TRY_RATING_TRIGGER_COUNT)
            .unwrap_or(DEFAULT_TRY_RATING_TRIGGER_COUNT);
        let repeat_every = self
            .storage
            .get_i64(keys::RATED_TRIGGER_COUNT)
            .unwrap_or(DEFAULT_RATED_TRIGGER_COUNT);
        let current = self
            .storage
            .get_i64(keys::CURRENT_TRIGGER_COUNT)
            .unwrap_or(0);

        let prompt = if rating::should_prompt(current, try_at, repeat_every) {
            RatingPrompt::Show
        } else {
            RatingPrompt::Skip
        };

        self.storage
            .set(keys::CURRENT_TRIGGER_COUNT, &json!(current + 1));

        prompt
    }

    // ==================== Internal Helpers ====================

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PurchaseError::network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = format!("Request failed with status {}", status);
            let code = map_status_to_error_code(status);
            return Err(PurchaseError::with_status(code, message, status));
        }

        response
            .json()
            .await
            .map_err(|e| PurchaseError::parse(e.to_string()))
    }
}

impl std::fmt::Debug for PurchaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseClient")
            .field("profile", &self.profile)
            .finish()
    }
}

/// Reject profiles whose endpoints are not absolute URLs.
pub(crate) fn validate_profile(profile: &StoreProfile) -> Result<()> {
    for (name, value) in [
        ("config_url", &profile.config_url),
        ("lookup_url", &profile.lookup_url),
        ("reviews_url", &profile.reviews_url),
    ] {
        Url::parse(value)
            .map_err(|_| PurchaseError::validation(format!("{} is not a valid URL", name)))?;
    }

    if profile.product_id.is_empty() {
        return Err(PurchaseError::validation("product_id is required"));
    }

    Ok(())
}
