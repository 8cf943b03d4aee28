//! Rating prompt pacing.
//!
//! The counter counts app launches (or whatever trigger the host app picks).
//! The first prompt fires when the counter hits `try_at`, then again every
//! `repeat_every` triggers after that.

/// Whether the prompt should fire at this trigger count
pub fn should_prompt(current: i64, try_at: i64, repeat_every: i64) -> bool {
    if current == try_at {
        return true;
    }
    repeat_every > 0 && (current - try_at) % repeat_every == 0
}
