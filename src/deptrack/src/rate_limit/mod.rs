//! GitHub API rate limit handling for discovery.
//!
//! Organization listings page through the core API. Before each page the remaining budget
//! is queried; when it is nearly spent, discovery sleeps until the window resets instead
//! of failing part way through a listing.

mod info;

pub use info::RateLimitInfo;

use octocrab::Octocrab;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Longest single wait for a reset.
const MAX_WAIT: Duration = Duration::from_secs(60 * 60);

/// Below this many remaining requests, discovery waits for the reset.
const LOW_BUDGET: u32 = 5;

/// Queries the core API budget.
///
/// # Errors
///
/// Returns an error if the rate limit endpoint cannot be reached.
pub async fn core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let limits = octocrab.ratelimit().get().await?;
    Ok(RateLimitInfo::from(&limits.resources.core))
}

/// How long to pause before the next core call, given the budget at `now` (Unix seconds).
///
/// `None` when enough budget is left or the window has already reset. Waits are capped
/// at one hour.
#[must_use]
pub fn reset_delay(info: &RateLimitInfo, now: u64) -> Option<Duration> {
    if !info.is_low(LOW_BUDGET) {
        return None;
    }
    let wait = Duration::from_secs(info.seconds_until_reset(now)?);
    if wait > MAX_WAIT {
        warn!(
            wait_secs = wait.as_secs(),
            "Rate limit resets more than an hour from now, capping the wait"
        );
    }
    Some(wait.min(MAX_WAIT))
}

/// Sleeps until the core budget resets if it is nearly spent.
///
/// Returns how long it slept, if at all.
///
/// # Errors
///
/// Returns an error if the budget cannot be queried.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<Option<Duration>, octocrab::Error> {
    let info = core_rate_limit(octocrab).await?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let Some(delay) = reset_delay(&info, now) else {
        debug!(remaining = info.remaining, limit = info.limit, "Rate limit ok");
        return Ok(None);
    };

    info!(
        remaining = info.remaining,
        limit = info.limit,
        wait_secs = delay.as_secs(),
        "Rate limit nearly exhausted, waiting for reset"
    );
    tokio::time::sleep(delay).await;
    Ok(Some(delay))
}
