// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling starting from a seed URL
// - Same-host restriction (doesn't crawl external sites)
// - Configurable depth limit
// - Polite crawling through a shared token-bucket rate limit
//
// Submodules, leaves first:
// - governor: the shared rate limit
// - registry: URLs claimed so far (each one is fetched at most once)
// - fetch: one HTTP GET, HTML only
// - links: link extraction and normalization
// - results: pages fetched successfully
// - coordinator: ties it all together
// =============================================================================

mod coordinator;
mod fetch;
mod governor;
mod links;
mod registry;
mod results;

// Re-export what the rest of the app uses
pub use coordinator::PageDiscovery;
pub use governor::RateGovernor;
