//! Snapshot of the core API budget.

use octocrab::models::Rate;

/// Remaining core API budget at the time it was queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Whether fewer than `threshold` requests are left.
    #[must_use]
    pub fn is_low(&self, threshold: u32) -> bool {
        self.remaining < threshold
    }

    /// Seconds until the window resets, or `None` if it already has.
    #[must_use]
    pub fn seconds_until_reset(&self, now: u64) -> Option<u64> {
        self.reset.checked_sub(now).filter(|secs| *secs > 0)
    }
}

impl From<&Rate> for RateLimitInfo {
    fn from(rate: &Rate) -> Self {
        Self {
            remaining: u32::try_from(rate.remaining).unwrap_or(u32::MAX),
            reset: rate.reset,
            limit: u32::try_from(rate.limit).unwrap_or(u32::MAX),
        }
    }
}
