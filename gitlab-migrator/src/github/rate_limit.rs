//! Core API rate limit guard.
//!
//! Checked before every mutating call. When the remaining quota drops below
//! a threshold the guard sleeps until the window resets.

use octocrab::Octocrab;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Rate limit information for the core API.
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
    /// How long to wait at `now` (unix seconds) before the next request.
    ///
    /// `None` when there is enough quota left or the reset already passed.
    /// The wait is capped at one hour.
    #[must_use]
    pub fn wait_at(&self, now: u64) -> Option<Duration> {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now {
            return None;
        }

        let wait_secs = self.reset - now;
        if wait_secs > MAX_WAIT_SECS {
            warn!(
                wait_secs,
                max_wait = MAX_WAIT_SECS,
                "Rate limit reset too far in future, capping wait time"
            );
        }
        Some(Duration::from_secs(wait_secs.min(MAX_WAIT_SECS)))
    }
}

/// Fetches the current core rate limit.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: core.remaining as u32,
        reset: core.reset,
        limit: core.limit as u32,
    })
}

/// Sleeps until the core quota resets if it is nearly used up.
///
/// # Errors
///
/// Returns an error if the rate limit check fails.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let info = check_core_rate_limit(octocrab).await?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if let Some(wait) = info.wait_at(now) {
        info!(
            remaining = info.remaining,
            limit = info.limit,
            wait_secs = wait.as_secs(),
            "Rate limit low, waiting for reset"
        );
        tokio::time::sleep(wait).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(remaining: u32, reset: u64) -> RateLimitInfo {
        RateLimitInfo {
            remaining,
            reset,
            limit: 5000,
        }
    }

    #[test]
    fn no_wait_with_quota_left() {
        assert_eq!(info(100, 2_000).wait_at(1_000), None);
    }

    #[test]
    fn no_wait_when_reset_passed() {
        assert_eq!(info(1, 500).wait_at(1_000), None);
    }

    #[test]
    fn waits_until_reset() {
        assert_eq!(
            info(2, 1_030).wait_at(1_000),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn wait_is_capped_at_one_hour() {
        assert_eq!(
            info(0, 100_000).wait_at(1_000),
            Some(Duration::from_secs(MAX_WAIT_SECS))
        );
    }
}
