// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Subcommands:
// - pages:   crawl a site and list every page found
// - sitemap: list the entries of a site's sitemap.xml
// - search:  scrape search results for some keywords
// - serve:   run the JSON HTTP server
// =============================================================================

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{GovernorConfig, ScraperSettings};
use crate::scrape::DiscoveryRequest;

#[derive(Parser, Debug)]
#[command(
    name = "site-scout",
    version,
    about = "Discover the pages of a website, read its sitemap or scrape search results",
    long_about = "site-scout crawls a website from a starting URL and lists every same-domain page \
                  it can reach. It can also read sitemaps, scrape search results, and serve all \
                  of this over a small JSON HTTP API."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and list the pages it links to
    ///
    /// Example: site-scout pages https://example.com --max-depth 2
    Pages {
        /// Website URL to start from (e.g., https://example.com)
        website_url: String,

        /// Maximum crawl depth
        ///
        /// Depth 0 = just the starting page
        /// Depth 1 = starting page + all pages it links to
        /// etc.
        #[arg(long, default_value_t = DiscoveryRequest::DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Output results in JSON format instead of a list
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        limits: CrawlLimits,
    },

    /// List the URLs in a website's sitemap.xml
    ///
    /// Example: site-scout sitemap https://example.com
    Sitemap {
        /// Website URL or sitemap URL
        url: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Scrape search results for one or more keywords
    ///
    /// Example: site-scout search "rust crawler" "tokio tutorial" --num-results 5
    Search {
        /// Keywords to search for (one results page each)
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Number of results to ask for per keyword
        #[arg(long, default_value_t = 10)]
        num_results: u32,

        /// Interface language, e.g. "en"
        #[arg(long, default_value = "en")]
        language: String,

        /// Country to search from, e.g. "us"
        #[arg(long, default_value = "us")]
        country_code: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Serve the scrapers over HTTP
    ///
    /// Example: site-scout serve --addr 127.0.0.1:8080
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,

        #[command(flatten)]
        limits: CrawlLimits,
    },
}

/// Overrides for the page discovery preset
#[derive(Args, Debug, Clone)]
pub struct CrawlLimits {
    /// Timeout for each page request, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// One request token is added every this many milliseconds
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// Requests that can be made back to back before the rate limit kicks in
    #[arg(long, default_value_t = 5)]
    pub burst: u32,

    /// Maximum number of pages fetched at the same time
    #[arg(long, default_value_t = 64)]
    pub max_concurrency: usize,
}

impl CrawlLimits {
    pub fn settings(&self) -> ScraperSettings {
        ScraperSettings::discovery()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_rate(GovernorConfig::new(
                Duration::from_millis(self.interval_ms),
                self.burst,
            ))
            .with_max_concurrency(self.max_concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_defaults() {
        let cli = Cli::parse_from(["site-scout", "pages", "https://example.com"]);
        match cli.command {
            Commands::Pages {
                website_url,
                max_depth,
                json,
                limits,
            } => {
                assert_eq!(website_url, "https://example.com");
                assert_eq!(max_depth, 3);
                assert!(!json);
                let settings = limits.settings();
                assert_eq!(settings.rate.burst, 5);
                assert_eq!(settings.request_timeout, Duration::from_secs(10));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_crawl_limit_overrides() {
        let cli = Cli::parse_from([
            "site-scout",
            "serve",
            "--interval-ms",
            "250",
            "--burst",
            "10",
            "--max-concurrency",
            "8",
        ]);
        match cli.command {
            Commands::Serve { addr, limits } => {
                assert_eq!(addr, "0.0.0.0:8080");
                let settings = limits.settings();
                assert_eq!(settings.rate.interval, Duration::from_millis(250));
                assert_eq!(settings.rate.burst, 10);
                assert_eq!(settings.max_concurrency, 8);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_keywords() {
        assert!(Cli::try_parse_from(["site-scout", "search"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It pulls the fields of another struct into this subcommand
//    - pages and serve share the same --timeout-secs/--burst/... flags
//      without repeating them
//
// 2. Why default_value_t vs default_value?
//    - default_value_t takes a typed Rust value (usize, u32, ...)
//    - default_value takes a string that clap parses like user input
// -----------------------------------------------------------------------------
