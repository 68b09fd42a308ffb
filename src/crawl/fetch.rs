// src/crawl/fetch.rs
// =============================================================================
// Fetches a single page and checks that it is really an HTML page.
//
// A fetch fails when:
// - the request fails (DNS, connection refused, timeout...)
// - the server answers with a non-2xx status
// - the Content-Type header doesn't contain "text/html"
// - the body can't be read
//
// A failure only abandons the page being fetched; the crawler logs it and
// carries on with everything else.
// =============================================================================

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::config::ScraperSettings;
use crate::error::ScrapeError;

/// An HTML page that passed every check
#[derive(Debug)]
pub struct FetchedPage {
    pub url: Url,
    pub html: String,
}

/// Thin wrapper around a reqwest client with the crawl's timeout applied
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(settings: &ScraperSettings) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: settings.http_client()?,
        })
    }

    /// GETs `url` and returns the body if it is an HTML page
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, ScrapeError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(ScrapeError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let html = response.text().await?;
        Ok(FetchedPage {
            url: url.clone(),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(&ScraperSettings::discovery()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let page = fetcher().fetch(&url).await.unwrap();
        assert!(page.html.contains("hi"));
        assert_eq!(page.url, url);
    }

    #[tokio::test]
    async fn test_reject_non_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/data.json", server.uri())).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, ScrapeError::NotHtml { .. }));
    }

    #[tokio::test]
    async fn test_reject_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/broken", server.uri())).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 500, .. }));
    }
}
