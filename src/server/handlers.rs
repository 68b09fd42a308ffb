// src/server/handlers.rs
// =============================================================================
// One handler per endpoint. Each one decodes the JSON body, calls a
// scraper and encodes the result as JSON.
//
// Errors come back as {"error": "..."}:
// - 400 when the request itself is bad (invalid URL, ...)
// - 502 when the remote site failed
// - 500 for anything else
// =============================================================================

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{info, warn};

use super::AppState;
use crate::crawl::PageDiscovery;
use crate::error::ScrapeError;
use crate::scrape::{DiscoveryRequest, ScraperConfig, SearchResult, SitemapResult};

/// A scraper error on its way to becoming an HTTP response
#[derive(Debug)]
pub struct ApiError(ScrapeError);

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            match &self.0 {
                ScrapeError::Http(_)
                | ScrapeError::Status { .. }
                | ScrapeError::NotHtml { .. }
                | ScrapeError::Xml(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            }
        };

        warn!(status = status.as_u16(), error = %self.0, "request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// POST /scrape/google
pub async fn scrape_google(
    State(state): State<AppState>,
    Json(config): Json<ScraperConfig>,
) -> Result<Json<HashMap<String, Vec<SearchResult>>>, ApiError> {
    info!(keywords = config.keywords.len(), "search scrape requested");
    let results = state.google.scrape(&config).await?;
    Ok(Json(results))
}

/// POST /scrape/sitemap
pub async fn scrape_sitemap(
    State(state): State<AppState>,
    Json(config): Json<ScraperConfig>,
) -> Result<Json<Vec<SitemapResult>>, ApiError> {
    info!(url = %config.url, "sitemap scrape requested");
    let results = state.sitemap.scrape_sitemap(&config).await?;
    Ok(Json(results))
}

/// POST /scrape/pages
///
/// Each request gets its own crawler, so one crawl's visited set never
/// leaks into another.
pub async fn discover_pages(
    State(state): State<AppState>,
    Json(request): Json<DiscoveryRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    let max_depth = request.effective_max_depth();
    info!(url = %request.url, max_depth, "page discovery requested");

    let discovery = PageDiscovery::new(&state.discovery)?;
    let pages = discovery.discover_pages(&request.url, max_depth).await?;
    Ok(Json(pages))
}
