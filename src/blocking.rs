//! Blocking purchase client using ureq

use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::validate_profile;
use crate::config::{keys, StoreProfile};
use crate::error::{map_status_to_error_code, PurchaseError, Result};
use crate::storage::{FileStore, PreferenceStore};
use crate::types::{
    lookup_price_from_value, PurchaseConfig, RatingPrompt, TransactionOutcome,
};
use crate::{eligibility, rating};

const DEFAULT_TRY_RATING_TRIGGER_COUNT: i64 = 50;
const DEFAULT_RATED_TRIGGER_COUNT: i64 = 200;

const USER_AGENT: &str = concat!("purchasekit/", env!("CARGO_PKG_VERSION"));

/// Configuration options for the blocking purchase client
#[derive(Clone, Default)]
pub struct PurchaseOptions {
    /// Custom preference store (default: FileStore in the storage dir)
    pub storage: Option<Arc<dyn PreferenceStore>>,
}

impl std::fmt::Debug for PurchaseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseOptions")
            .field("storage", &"<storage>")
            .finish()
    }
}

/// Purchase eligibility client (blocking).
///
/// Same surface as [`crate::PurchaseClient`] minus async: config fetches
/// block the calling thread for one request. Defaults to a [`FileStore`]
/// in the given storage directory so the purchased flag survives restarts.
///
/// # Example
/// ```rust,ignore
/// use purchasekit::blocking::PurchaseClient;
/// use purchasekit::StoreProfile;
/// use std::path::PathBuf;
///
/// let data_dir = PathBuf::from("/path/to/app/data");
/// let client = PurchaseClient::new(StoreProfile::default(), &data_dir)?;
///
/// if client.reload_config().is_err() {
///     client.seed_default_config();
/// }
/// if client.is_need_purchase() {
///     show_paywall(client.cached_app_price());
/// }
/// ```
pub struct PurchaseClient {
    profile: StoreProfile,
    storage: Arc<dyn PreferenceStore>,
}

impl PurchaseClient {
    /// Create a blocking client with file-backed storage.
    ///
    /// The directory is created if it doesn't exist; preferences land in
    /// `{storage_dir}/preferences.json`.
    pub fn new(profile: StoreProfile, storage_dir: &Path) -> Result<Self> {
        Self::with_options(profile, storage_dir, PurchaseOptions::default())
    }

    /// Create a blocking client with custom options.
    pub fn with_options(
        profile: StoreProfile,
        storage_dir: &Path,
        options: PurchaseOptions,
    ) -> Result<Self> {
        validate_profile(&profile)?;

        if !storage_dir.exists() {
            std::fs::create_dir_all(storage_dir).map_err(|e| {
                PurchaseError::validation(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let storage: Arc<dyn PreferenceStore> = match options.storage {
            Some(s) => s,
            None => Arc::new(
                FileStore::new(storage_dir)
                    .ok_or_else(|| PurchaseError::validation("Failed to initialize storage"))?,
            ),
        };

        Ok(Self { profile, storage })
    }

    /// The profile this client was created with.
    pub fn profile(&self) -> &StoreProfile {
        &self.profile
    }

    // ==================== Remote Config ====================

    /// Fetch the purchase configuration and mirror it into the store.
    ///
    /// Blocking equivalent of the async client's `reload_config`: single
    /// attempt, failure leaves cached values intact.
    pub fn reload_config(&self) -> Result<PurchaseConfig> {
        let document = match self.get_json(&self.profile.config_url) {
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

    /// Seed the built-in default configuration for keys with no cached
    /// value.
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
    pub fn reload_app_price(&self) -> Result<f64> {
        let document = match self.get_json(&self.profile.lookup_url) {
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
    /// `Cancelled` change nothing. Returns the resulting purchased state.
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

    // ==================== Internal HTTP Helpers ====================

    fn get_json(&self, url: &str) -> Result<Value> {
        let response = ureq::get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(map_ureq_error)?;

        response
            .into_body()
            .read_json()
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

fn map_ureq_error(error: ureq::Error) -> PurchaseError {
    match error {
        ureq::Error::StatusCode(status) => {
            let message = format!("Request failed with status {}", status);
            let code = map_status_to_error_code(status);
            PurchaseError::with_status(code, message, status)
        }
        _ => PurchaseError::network(error.to_string()),
    }
}
