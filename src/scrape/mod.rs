// src/scrape/mod.rs
// =============================================================================
// Single-shot scrapers that sit next to the crawler:
// - google: search result pages for a list of keywords
// - sitemap: a site's sitemap.xml
//
// Both keep their own rate limit for as long as the scraper value lives,
// so the server creates them once and shares them across requests.
// =============================================================================

mod google;
mod sitemap;
mod types;

pub use google::GoogleScraper;
pub use sitemap::SitemapScraper;
pub use types::{DiscoveryRequest, ScraperConfig, SearchResult, SitemapResult};
