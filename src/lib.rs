//! # purchasekit
//!
//! Client SDK for paywall eligibility: remote purchase configuration,
//! shared preferences, and platform store transaction outcomes.
//!
//! The platform store runs the actual purchase/restore flow and the host
//! app owns all UI; this crate decides *whether* the paywall must be shown
//! and keeps that decision stable across the host app and its extensions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use purchasekit::{PurchaseClient, StoreProfile, TransactionOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let profile = StoreProfile {
//!         product_id: "com.example.MyApp_NoAds".into(),
//!         config_url: "https://example.com/iap_config.json".into(),
//!         enforce_after: "2021-03-01".into(),
//!         ..Default::default()
//!     };
//!     let client = PurchaseClient::new(profile, Default::default())?;
//!
//!     // Refresh the remote config; a failure keeps the cached values.
//!     if client.reload_config().await.is_err() {
//!         client.seed_default_config();
//!     }
//!
//!     // Decide whether to show the paywall (works offline).
//!     if client.is_need_purchase() {
//!         // present the purchase screen, then report the outcome:
//!         client.record_transaction(TransactionOutcome::Purchased);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Offline-First Design
//!
//! - `is_need_purchase()`, `is_purchased()`, `register_rating_trigger()`
//!   work without network, off the mirrored preference values
//! - A recorded purchase is permanent: once the purchased flag is set,
//!   eligibility never flips back, whatever the remote config says
//! - Config fetches are a single attempt; failures keep the last known
//!   configuration intact
//! - `blocking::PurchaseClient` offers the same surface without an async
//!   runtime

pub mod blocking;
pub mod client;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod rating;
pub mod storage;
pub mod types;

// Main client
pub use client::{PurchaseClient, PurchaseOptions};

// Configuration
pub use config::{keys, StoreProfile};

// Error types
pub use error::{PurchaseError, PurchaseErrorCode, Result};

// Storage
pub use storage::{FileStore, MemoryStore, PreferenceStore};

// Types
pub use types::{
    parse_config_document, parse_lookup_price, PurchaseConfig, RatingPrompt, TransactionOutcome,
};

// Re-export decision helpers
pub use eligibility::{days_between, need_purchase, parse_day, reached_threshold};
pub use rating::should_prompt;
