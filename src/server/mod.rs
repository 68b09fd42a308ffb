// src/server/mod.rs
// =============================================================================
// JSON HTTP server exposing the scrapers.
//
// Routes (all POST, JSON in, JSON out):
// - /scrape/google  -> search results per keyword
// - /scrape/sitemap -> sitemap entries
// - /scrape/pages   -> pages discovered by crawling
//
// Other methods on these paths get 405 Method Not Allowed from axum.
// =============================================================================

mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::post;
use axum::Router;
use tracing::info;

use crate::config::ScraperSettings;
use crate::scrape::{GoogleScraper, SitemapScraper};

/// Shared by every request.
///
/// The search and sitemap scrapers are built once so their rate limits
/// apply across requests; page discovery only keeps its settings.
#[derive(Clone)]
pub struct AppState {
    google: Arc<GoogleScraper>,
    sitemap: Arc<SitemapScraper>,
    discovery: Arc<ScraperSettings>,
}

impl AppState {
    pub fn new(
        google: GoogleScraper,
        sitemap: SitemapScraper,
        discovery: ScraperSettings,
    ) -> Self {
        Self {
            google: Arc::new(google),
            sitemap: Arc::new(sitemap),
            discovery: Arc::new(discovery),
        }
    }

    /// Every scraper with its default preset
    pub fn with_defaults(discovery: ScraperSettings) -> Result<Self> {
        let google = GoogleScraper::new(&ScraperSettings::search())?;
        let sitemap = SitemapScraper::new(&ScraperSettings::sitemap())?;
        Ok(Self::new(google, sitemap, discovery))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scrape/google", post(handlers::scrape_google))
        .route("/scrape/sitemap", post(handlers::scrape_sitemap))
        .route("/scrape/pages", post(handlers::discover_pages))
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %listener.local_addr()?, "starting server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GovernorConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app() -> Router {
        let discovery = ScraperSettings::discovery()
            .with_rate(GovernorConfig::new(Duration::from_millis(1), 100));
        router(AppState::with_defaults(discovery).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_discover_pages_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"<a href="/about">About</a>"#, "text/html"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>about</p>", "text/html"))
            .mount(&server)
            .await;

        let body = format!(r#"{{"url": "{}/"}}"#, server.uri());
        let response = test_app()
            .oneshot(post_json("/scrape/pages", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let mut pages: Vec<String> = serde_json::from_value(json_body(response).await).unwrap();
        pages.sort();
        assert_eq!(
            pages,
            vec![format!("{}/", server.uri()), format!("{}/about", server.uri())]
        );
    }

    #[tokio::test]
    async fn test_invalid_seed_is_bad_request() {
        let response = test_app()
            .oneshot(post_json("/scrape/pages", r#"{"url": "not a url"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("not a url"));
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/scrape/pages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_sitemap_upstream_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let body = format!(r#"{{"url": "{}"}}"#, server.uri());
        let response = test_app()
            .oneshot(post_json("/scrape/sitemap", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
