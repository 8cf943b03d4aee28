//! Paywall eligibility decisions.
//!
//! Date handling is by calendar day only: thresholds are `yyyy-MM-dd`
//! strings, time of day is ignored. A threshold that fails to parse counts
//! as not reached, so a bad config can never charge a user.

use chrono::NaiveDate;

/// Parse a `yyyy-MM-dd` day string
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Calendar days from `from` to `to`; negative if `to` is earlier.
///
/// Returns 0 when either side fails to parse.
pub fn days_between(from: &str, to: &str) -> i64 {
    match (parse_day(from), parse_day(to)) {
        (Some(from), Some(to)) => (to - from).num_days(),
        _ => 0,
    }
}

/// Whether `today` is on or after the threshold day
pub fn reached_threshold(threshold: &str, today: NaiveDate) -> bool {
    match parse_day(threshold) {
        Some(threshold) => today >= threshold,
        None => false,
    }
}

/// The eligibility decision itself.
///
/// A completed purchase wins over everything; otherwise enforcement needs
/// both the remote flag and the threshold day to have arrived.
pub fn need_purchase(is_purchased: bool, need_purchase_flag: bool, threshold_reached: bool) -> bool {
    if is_purchased {
        return false;
    }
    need_purchase_flag && threshold_reached
}
