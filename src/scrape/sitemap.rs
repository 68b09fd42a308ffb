// src/scrape/sitemap.rs
// =============================================================================
// Downloads and parses a site's sitemap.xml.
//
// Strategy:
// - Accept either a site URL ("https://example.com") or the sitemap URL
//   itself ("https://example.com/sitemap.xml")
// - Wait for the rate limit, fetch, deserialize the <urlset>
//
// Only the plain <urlset> format is supported. A sitemap index
// (<sitemapindex>) parses as an empty list.
// =============================================================================

use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

use super::types::{ScraperConfig, SitemapResult};
use crate::config::ScraperSettings;
use crate::crawl::RateGovernor;
use crate::error::ScrapeError;

#[derive(Debug, Deserialize)]
struct UrlSet {
    #[serde(rename = "url", default)]
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    loc: String,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<f64>,
}

impl From<UrlEntry> for SitemapResult {
    fn from(entry: UrlEntry) -> Self {
        SitemapResult {
            url: entry.loc.trim().to_string(),
            last_modified: entry.lastmod,
            change_freq: entry.changefreq,
            priority: entry.priority,
        }
    }
}

/// Sitemap scraper with its own rate limit
#[derive(Debug, Clone)]
pub struct SitemapScraper {
    client: Client,
    governor: RateGovernor,
}

impl SitemapScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self, ScrapeError> {
        settings.validate()?;
        Ok(Self {
            client: settings.http_client()?,
            governor: RateGovernor::new(&settings.rate)?,
        })
    }

    /// Fetches the sitemap for `config.url` and returns its entries
    pub async fn scrape_sitemap(
        &self,
        config: &ScraperConfig,
    ) -> Result<Vec<SitemapResult>, ScrapeError> {
        let raw = sitemap_url(&config.url);
        let sitemap_url = Url::parse(&raw).map_err(|source| ScrapeError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        self.governor.acquire(&CancellationToken::new()).await?;

        let response = self.client.get(sitemap_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: sitemap_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let results = parse_sitemap(&body)?;

        info!(url = %sitemap_url, entries = results.len(), "sitemap fetched");
        Ok(results)
    }
}

/// Appends "/sitemap.xml" unless the URL already points at it
pub fn sitemap_url(url: &str) -> String {
    if url.ends_with("sitemap.xml") {
        url.to_string()
    } else {
        format!("{}/sitemap.xml", url.strip_suffix('/').unwrap_or(url))
    }
}

/// Deserializes a <urlset> document
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapResult>, ScrapeError> {
    let set: UrlSet = quick_xml::de::from_str(xml)?;
    Ok(set.urls.into_iter().map(SitemapResult::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GovernorConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://example.com/</loc>
    <lastmod>2024-01-15</lastmod>
    <changefreq>daily</changefreq>
    <priority>1.0</priority>
  </url>
  <url>
    <loc>https://example.com/about</loc>
  </url>
</urlset>"#;

    #[test]
    fn test_sitemap_url() {
        assert_eq!(sitemap_url("https://example.com"), "https://example.com/sitemap.xml");
        assert_eq!(sitemap_url("https://example.com/"), "https://example.com/sitemap.xml");
        assert_eq!(
            sitemap_url("https://example.com/blog/sitemap.xml"),
            "https://example.com/blog/sitemap.xml"
        );
    }

    #[test]
    fn test_parse_sitemap() {
        let results = parse_sitemap(SITEMAP).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://example.com/");
        assert_eq!(results[0].last_modified.as_deref(), Some("2024-01-15"));
        assert_eq!(results[0].change_freq.as_deref(), Some("daily"));
        assert_eq!(results[0].priority, Some(1.0));
        assert_eq!(results[1].url, "https://example.com/about");
        assert_eq!(results[1].priority, None);
    }

    #[test]
    fn test_parse_invalid_xml() {
        assert!(parse_sitemap("<urlset><url><loc>oops</url>").is_err());
    }

    #[tokio::test]
    async fn test_scrape_sitemap_from_site_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SITEMAP, "application/xml"))
            .expect(1)
            .mount(&server)
            .await;

        let settings = ScraperSettings::sitemap()
            .with_rate(GovernorConfig::new(Duration::from_millis(1), 2));
        let scraper = SitemapScraper::new(&settings).unwrap();
        let config = ScraperConfig {
            url: format!("{}/", server.uri()),
            ..Default::default()
        };

        let results = scraper.scrape_sitemap(&config).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_sitemap_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let scraper = SitemapScraper::new(&ScraperSettings::sitemap()).unwrap();
        let config = ScraperConfig {
            url: server.uri(),
            ..Default::default()
        };

        let err = scraper.scrape_sitemap(&config).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_empty_url_is_a_client_error() {
        let scraper = SitemapScraper::new(&ScraperSettings::sitemap()).unwrap();
        let err = scraper
            .scrape_sitemap(&ScraperConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }
}
