// src/scrape/google.rs
// =============================================================================
// Scrapes search result pages for a list of keywords.
//
// How it works:
// 1. For each keyword, build a results page URL
// 2. Fetch all keywords concurrently, each one waiting on the shared
//    rate limit first
// 3. Pull title, link and description out of every result card
//
// A keyword that fails (timeout, non-200, blocked...) is logged and left out
// of the returned map; the other keywords still come back.
//
// Note: the result card markup (.g / h3 / .VwiC3b) is whatever the search
// engine serves today. When it changes, parse_results() finds nothing.
// =============================================================================

use std::collections::HashMap;
use std::sync::LazyLock;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::types::{ScraperConfig, SearchResult};
use crate::config::ScraperSettings;
use crate::crawl::RateGovernor;
use crate::error::ScrapeError;

const DEFAULT_BASE_URL: &str = "https://www.google.com";
const DEFAULT_NUM_RESULTS: u32 = 10;
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_COUNTRY: &str = "us";

static CARD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector(".g"));
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector(".VwiC3b"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Search result scraper.
///
/// Keep one instance around: its rate limit then covers every request it
/// ever makes, across unrelated calls.
#[derive(Debug, Clone)]
pub struct GoogleScraper {
    client: Client,
    governor: RateGovernor,
    base_url: Url,
    concurrency: usize,
}

impl GoogleScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self, ScrapeError> {
        settings.validate()?;
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|source| ScrapeError::InvalidUrl {
            url: DEFAULT_BASE_URL.to_string(),
            source,
        })?;
        Ok(Self {
            client: settings.http_client()?,
            governor: RateGovernor::new(&settings.rate)?,
            base_url,
            concurrency: settings.max_concurrency,
        })
    }

    /// Points the scraper at a mock server
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Fetches one results page per keyword.
    ///
    /// Returns a map from keyword to its results; keywords that failed are
    /// missing from the map.
    pub async fn scrape(
        &self,
        config: &ScraperConfig,
    ) -> Result<HashMap<String, Vec<SearchResult>>, ScrapeError> {
        let cancel = CancellationToken::new();

        let futures = config.keywords.iter().cloned().map(|keyword| {
            let cancel = cancel.clone();
            async move {
                let outcome = self.scrape_keyword(&keyword, config, &cancel).await;
                (keyword, outcome)
            }
        });

        let outcomes: Vec<_> = stream::iter(futures)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut results = HashMap::new();
        for (keyword, outcome) in outcomes {
            match outcome {
                Ok(found) => {
                    debug!(keyword = %keyword, results = found.len(), "keyword scraped");
                    results.insert(keyword, found);
                }
                Err(e) => warn!(keyword = %keyword, error = %e, "failed to scrape keyword"),
            }
        }

        Ok(results)
    }

    async fn scrape_keyword(
        &self,
        keyword: &str,
        config: &ScraperConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, ScrapeError> {
        self.governor.acquire(cancel).await?;

        let url = self.search_url(keyword, config)?;
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        Ok(parse_results(&html))
    }

    /// Builds `{base}/search?q=..&num=..&hl=..&gl=..`
    fn search_url(&self, keyword: &str, config: &ScraperConfig) -> Result<Url, ScrapeError> {
        let num = if config.num_results == 0 {
            DEFAULT_NUM_RESULTS
        } else {
            config.num_results
        };
        let language = non_empty_or(&config.language, DEFAULT_LANGUAGE);
        let country = non_empty_or(&config.country_code, DEFAULT_COUNTRY);

        let mut url = self
            .base_url
            .join("/search")
            .map_err(|source| ScrapeError::InvalidUrl {
                url: self.base_url.to_string(),
                source,
            })?;
        url.query_pairs_mut()
            .append_pair("q", keyword)
            .append_pair("num", &num.to_string())
            .append_pair("hl", language)
            .append_pair("gl", country);
        Ok(url)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Extracts every result card from a results page.
///
/// Cards without a title or a link are skipped.
pub fn parse_results(html: &str) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    document
        .select(&CARD_SELECTOR)
        .filter_map(|card| {
            let title = text_of(card, &TITLE_SELECTOR);
            let url = card
                .select(&LINK_SELECTOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            let description = text_of(card, &DESCRIPTION_SELECTOR);

            if title.is_empty() || url.is_empty() {
                return None;
            }
            Some(SearchResult {
                title,
                url,
                description,
            })
        })
        .collect()
}

/// Concatenated text of every element matching `selector` under `card`
fn text_of(card: ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector).flat_map(|el| el.text()).collect()
}
