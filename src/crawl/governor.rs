// src/crawl/governor.rs
// =============================================================================
// Rate limiting shared by every request a scraper makes.
//
// This replaces the fixed 100ms sleep the crawler used to do after each page.
// A sleep only slows down one task; with many tasks in flight we need a
// single bucket of tokens that all of them draw from, so the total request
// rate stays capped no matter how wide the crawl fans out.
//
// How it works:
// - One token is added every `interval`, up to `burst` tokens
// - acquire() waits for a token
// - If the crawl is cancelled while waiting, acquire() gives up
//
// Rust concepts:
// - Arc: shared ownership, so cloning the governor shares the same bucket
// - tokio::select!: wait on whichever future finishes first
// =============================================================================

use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, RateLimiter};
use tokio_util::sync::CancellationToken;

use crate::config::GovernorConfig;
use crate::error::{ConfigError, ScrapeError};

/// Token bucket shared by all clones
#[derive(Clone)]
pub struct RateGovernor {
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl RateGovernor {
    pub fn new(config: &GovernorConfig) -> Result<Self, ConfigError> {
        let quota = config.quota()?;
        Ok(Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Waits for a token, or fails with `ScrapeError::Cancelled` if `cancel`
    /// fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), ScrapeError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
            _ = self.limiter.until_ready() => Ok(()),
        }
    }
}

impl std::fmt::Debug for RateGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGovernor").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `biased;` in select!?
//    - Normally select! picks a random ready branch
//    - biased checks branches top to bottom
//    - So an already-cancelled crawl never takes a token
//
// 2. Why does cloning share the bucket?
//    - The limiter lives behind an Arc
//    - clone() copies the pointer, not the limiter
//    - Every task of a crawl holds a clone of the same governor
// -----------------------------------------------------------------------------
