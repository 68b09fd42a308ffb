// src/scrape/types.rs
// =============================================================================
// Request and result types shared by the CLI and the HTTP server.
//
// All of them are plain data with serde derives, so the server can decode
// them from JSON request bodies and the CLI can print them with --json.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Options for the search and sitemap scrapers.
///
/// Every field is optional in JSON; missing ones take their default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScraperConfig {
    /// Search terms, one results page is fetched per keyword
    pub keywords: Vec<String>,
    /// Results requested per keyword
    pub num_results: u32,
    /// Interface language (hl), e.g. "en"
    pub language: String,
    /// Result country (gl), e.g. "us"
    pub country_code: String,
    /// Site or sitemap URL for the sitemap scraper
    pub url: String,
}

/// One organic search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
}

/// One <url> entry of a sitemap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SitemapResult {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_freq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

/// Body of a page discovery request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub url: String,
    #[serde(default)]
    pub max_depth: usize,
}

impl DiscoveryRequest {
    /// Depth used when the request leaves it out (or sends 0)
    pub const DEFAULT_MAX_DEPTH: usize = 3;

    pub fn effective_max_depth(&self) -> usize {
        if self.max_depth == 0 {
            Self::DEFAULT_MAX_DEPTH
        } else {
            self.max_depth
        }
    }
}
