// src/error.rs
// =============================================================================
// Typed errors shared by the crawler, the scrapers and the HTTP server.
//
// The application layer (main.rs, cli handlers) keeps using anyhow::Result,
// but the scrapers return these enums so callers can tell a bad seed URL
// (the caller's fault) apart from an upstream failure (the site's fault).
//
// Rust concepts:
// - thiserror: derive Display and Error for enums
// - #[from]: automatic conversion so the ? operator works across error types
// =============================================================================

use thiserror::Error;

/// Invalid scraper settings, caught before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate limit interval must be greater than zero")]
    ZeroInterval,

    #[error("rate limit burst must be greater than zero")]
    ZeroBurst,

    #[error("max concurrency must be greater than zero")]
    ZeroConcurrency,
}

/// Everything that can go wrong while scraping.
///
/// For page discovery only the seed variants are ever returned to the caller;
/// the rest abandon a single branch and are logged.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("rate limit wait cancelled")]
    Cancelled,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("not an HTML page ({content_type}): {url}")]
    NotHtml { url: String, content_type: String },

    #[error("failed to parse sitemap XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScrapeError {
    /// True when the request itself was bad, as opposed to the remote site
    /// misbehaving.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScrapeError::InvalidUrl { .. }
                | ScrapeError::UnsupportedScheme { .. }
                | ScrapeError::MissingHost(_)
                | ScrapeError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_errors_are_client_errors() {
        let err = ScrapeError::MissingHost("data:text/plain,hi".to_string());
        assert!(err.is_client_error());

        let err = ScrapeError::Status {
            url: "https://example.com".to_string(),
            status: 500,
        };
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_config_error_message() {
        let err = ScrapeError::from(ConfigError::ZeroConcurrency);
        assert_eq!(err.to_string(), "max concurrency must be greater than zero");
        assert!(err.is_client_error());
    }
}
