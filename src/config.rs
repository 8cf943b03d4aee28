//! Per-app store configuration.
//!
//! Host apps ship with differing product identifiers, config endpoints and
//! enforcement dates. All of that is plain data on [`StoreProfile`]; the
//! crate holds no global state.

/// Preference keys shared between the host app and its extension.
///
/// The key strings are part of the on-disk format and must not change:
/// existing installations already carry values under these names.
pub mod keys {
    /// Purchase completed successfully (set once, never cleared)
    pub const IS_PURCHASED: &str = "Key_isPurchasedSuccessedUser";
    /// Legacy rating counter slot
    pub const RATING_TRIGGER_COUNT: &str = "Key_RatingTriggerCount";
    /// Cached app price from the store lookup endpoint
    pub const APP_PRICE: &str = "appPrice";
    /// Remote flag: paywall enforcement on/off
    pub const NEED_PURCHASE: &str = "needPurchase";
    /// Remote flag: keyboard extension paywall on/off
    pub const NEED_KEYBOARD_PURCHASE: &str = "needKeyboardPurchase";
    /// Remote flag: hide the purchase entry point entirely
    pub const HIDE_PURCHASE_ENTRY: &str = "hidePurchaseEntry";
    /// Trigger count at which the first rating prompt fires
    pub const TRY_RATING_TRIGGER_COUNT: &str = "tryRatingTriggerCount";
    /// Trigger interval between repeat rating prompts
    pub const RATED_TRIGGER_COUNT: &str = "ratedTriggerCount";
    /// Running trigger counter
    pub const CURRENT_TRIGGER_COUNT: &str = "currentTriggerCount";
}

/// Configuration for one app's purchase setup.
///
/// # Example
/// ```rust
/// use purchasekit::StoreProfile;
///
/// let profile = StoreProfile {
///     product_id: "com.example.MyApp_NoAds".into(),
///     config_url: "https://example.com/iap_config.json".into(),
///     enforce_after: "2021-03-01".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct StoreProfile {
    /// In-app purchase product identifier
    pub product_id: String,
    /// Endpoint serving the purchase configuration document
    pub config_url: String,
    /// Store lookup endpoint for the current app price
    pub lookup_url: String,
    /// Customer reviews feed (informational)
    pub reviews_url: String,
    /// Installations on or after this day (yyyy-MM-dd) are subject to
    /// paywall enforcement
    pub enforce_after: String,
}

impl Default for StoreProfile {
    fn default() -> Self {
        Self {
            product_id: "com.wodedata.WBInputMethod_NoAds".to_string(),
            config_url: "http://wodedata.com/MyResource/WBInput/data_iapconfig.json".to_string(),
            lookup_url: "http://itunes.apple.com/cn/lookup?id=1335365550".to_string(),
            reviews_url: "https://itunes.apple.com/cn/rss/customerreviews/id=1522850307/json"
                .to_string(),
            enforce_after: "2020-12-05".to_string(),
        }
    }
}
