// src/config.rs
// =============================================================================
// Settings for the scrapers: timeouts, rate limits and concurrency.
//
// Each scraper has its own preset, matching how hard it is allowed to hit
// the remote site:
// - discovery: 10s timeout, 1 request/second with bursts of 5
// - search:    30s timeout, 1 request/second with bursts of 5
// - sitemap:   30s timeout, 1 request/second with bursts of 2
//
// The CLI can override the discovery preset with flags (see cli.rs).
//
// Rust concepts:
// - Duration: type-safe time spans
// - NonZeroU32: an integer the compiler knows can't be zero
// =============================================================================

use std::num::NonZeroU32;
use std::time::Duration;

use governor::Quota;

use crate::error::ConfigError;

/// Token-bucket parameters: one token every `interval`, at most `burst`
/// tokens saved up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorConfig {
    pub interval: Duration,
    pub burst: u32,
}

impl GovernorConfig {
    pub fn new(interval: Duration, burst: u32) -> Self {
        Self { interval, burst }
    }

    /// Converts the settings into a governor quota
    pub fn quota(&self) -> Result<Quota, ConfigError> {
        let burst = NonZeroU32::new(self.burst).ok_or(ConfigError::ZeroBurst)?;
        let quota = Quota::with_period(self.interval).ok_or(ConfigError::ZeroInterval)?;
        Ok(quota.allow_burst(burst))
    }
}

/// Settings shared by every scraper
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
    /// Aggregate request rate for this scraper instance
    pub rate: GovernorConfig,
    /// Maximum number of pages being explored at once (discovery only)
    pub max_concurrency: usize,
    /// Optional User-Agent header for every request
    pub user_agent: Option<String>,
}

impl ScraperSettings {
    /// Preset used by page discovery
    pub fn discovery() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            rate: GovernorConfig::new(Duration::from_secs(1), 5),
            max_concurrency: 64,
            user_agent: None,
        }
    }

    /// Preset used by the search result scraper
    pub fn search() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            rate: GovernorConfig::new(Duration::from_secs(1), 5),
            max_concurrency: 64,
            user_agent: Some(BROWSER_USER_AGENT.to_string()),
        }
    }

    /// Preset used by the sitemap scraper
    pub fn sitemap() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            rate: GovernorConfig::new(Duration::from_secs(1), 2),
            max_concurrency: 1,
            user_agent: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_rate(mut self, rate: GovernorConfig) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Rejects settings that would make the scraper hang or panic
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        self.rate.quota()?;
        Ok(())
    }

    /// Builds a reqwest client honouring the timeout and User-Agent
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.request_timeout);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self::discovery()
    }
}

/// Search engines serve a stripped-down page to unknown clients
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
