// src/crawl/coordinator.rs
// =============================================================================
// Concurrent page discovery.
//
// How it works:
// 1. Start with the seed URL as level 0
// 2. Spawn a task per URL of the current level, up to max_concurrency at once
// 3. Each task:
//    - stops if its depth is past max_depth
//    - claims its URL in the VisitedRegistry (losers stop here)
//    - waits for a token from the RateGovernor
//    - fetches the page and records it in PageResults
//    - returns the page's same-host links as tasks at depth + 1, unless the
//      page already sits at max_depth
// 4. Once every task of the level has finished, its children (minus
//    duplicates and URLs already claimed) become the next level
// 5. When a level comes back empty, the crawl is done
//
// A failure (timeout, 404, not HTML...) only ends that one branch. The
// caller always gets Ok with whatever pages were found.
//
// Rust concepts:
// - JoinSet: a set of spawned tasks we can await one by one
// - Arc: the per-crawl state is shared by every spawned task
// - HashSet: drops repeated links before they become tasks
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::fetch::Fetcher;
use super::governor::RateGovernor;
use super::links::{extract_links, normalize};
use super::registry::VisitedRegistry;
use super::results::PageResults;
use crate::config::ScraperSettings;
use crate::error::ScrapeError;

/// A page waiting to be explored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: usize, // How many link hops from the seed
}

impl CrawlTask {
    fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

/// State shared by every task of one discovery call
struct CrawlContext {
    registry: VisitedRegistry,
    results: PageResults,
    fetcher: Fetcher,
    governor: RateGovernor,
    target_host: String,
    max_depth: usize,
    cancel: CancellationToken,
}

/// Discovers the pages of one site.
///
/// The rate governor lives as long as this value, so every crawl started
/// from the same `PageDiscovery` shares one request budget.
#[derive(Debug, Clone)]
pub struct PageDiscovery {
    fetcher: Fetcher,
    governor: RateGovernor,
    max_concurrency: usize,
}

impl PageDiscovery {
    pub fn new(settings: &ScraperSettings) -> Result<Self, ScrapeError> {
        settings.validate()?;
        Ok(Self {
            fetcher: Fetcher::new(settings)?,
            governor: RateGovernor::new(&settings.rate)?,
            max_concurrency: settings.max_concurrency,
        })
    }

    /// Crawls from `seed` and returns every page fetched within `max_depth`
    /// link hops.
    ///
    /// Only a bad seed URL is an error; pages that fail to load are left out.
    pub async fn discover_pages(
        &self,
        seed: &str,
        max_depth: usize,
    ) -> Result<Vec<String>, ScrapeError> {
        self.discover_pages_with_cancellation(seed, max_depth, CancellationToken::new())
            .await
    }

    /// Same as `discover_pages`, but stops early once `cancel` fires.
    ///
    /// Tasks still waiting for a rate limit token give up; pages already
    /// fetched are returned.
    pub async fn discover_pages_with_cancellation(
        &self,
        seed: &str,
        max_depth: usize,
        cancel: CancellationToken,
    ) -> Result<Vec<String>, ScrapeError> {
        let (seed_url, target_host) = parse_seed(seed)?;

        info!(seed = %seed_url, max_depth, "starting page discovery");

        let ctx = Arc::new(self.context(target_host, max_depth, cancel));

        let mut level = vec![CrawlTask::seed(seed_url)];
        let mut depth = 0;

        while !level.is_empty() {
            debug!(depth, tasks = level.len(), "exploring level");
            level = self.explore_level(&ctx, level).await;
            depth += 1;
        }

        let pages = ctx.results.take();
        info!(
            pages = pages.len(),
            claimed = ctx.registry.len(),
            "page discovery finished"
        );
        Ok(pages)
    }

    fn context(
        &self,
        target_host: String,
        max_depth: usize,
        cancel: CancellationToken,
    ) -> CrawlContext {
        CrawlContext {
            registry: VisitedRegistry::new(),
            results: PageResults::new(),
            fetcher: self.fetcher.clone(),
            governor: self.governor.clone(),
            target_host,
            max_depth,
            cancel,
        }
    }

    /// Runs every task of one depth level and returns the next level.
    ///
    /// No task of the next level starts before the whole level is done, so
    /// a URL is always claimed at the shortest depth it can be reached at,
    /// however slow the pages on that path are.
    async fn explore_level(
        &self,
        ctx: &Arc<CrawlContext>,
        level: Vec<CrawlTask>,
    ) -> Vec<CrawlTask> {
        let mut pending = level.into_iter();
        let mut in_flight = JoinSet::new();
        let mut seen = HashSet::new();
        let mut next = Vec::new();

        loop {
            while in_flight.len() < self.max_concurrency {
                let Some(task) = pending.next() else {
                    break;
                };
                let ctx = Arc::clone(ctx);
                in_flight.spawn(async move { explore(&ctx, task).await });
            }

            // None means nothing is running, and the loop above just
            // drained the level, so every task has finished
            match in_flight.join_next().await {
                Some(Ok(children)) => next.extend(
                    children
                        .into_iter()
                        .filter(|child| seen.insert(child.url.as_str().to_owned())),
                ),
                Some(Err(e)) => warn!(error = %e, "crawl task panicked"),
                None => break,
            }
        }

        // Siblings may have claimed some of these while the level ran.
        // The claim inside the task stays the real check.
        next.retain(|child| !ctx.registry.contains(&child.url));
        next
    }
}

/// Validates the seed and returns it normalized, plus the host to stay on
fn parse_seed(seed: &str) -> Result<(Url, String), ScrapeError> {
    let url = Url::parse(seed).map_err(|source| ScrapeError::InvalidUrl {
        url: seed.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScrapeError::UnsupportedScheme {
            url: seed.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    let host = url
        .host_str()
        .ok_or_else(|| ScrapeError::MissingHost(seed.to_string()))?
        .to_string();

    Ok((normalize(url), host))
}

/// Runs one task to completion and returns the tasks it discovered
async fn explore(ctx: &CrawlContext, task: CrawlTask) -> Vec<CrawlTask> {
    if task.depth > ctx.max_depth {
        return Vec::new();
    }

    if !ctx.registry.claim_if_new(&task.url) {
        return Vec::new();
    }

    if let Err(e) = ctx.governor.acquire(&ctx.cancel).await {
        warn!(url = %task.url, error = %e, "abandoning page");
        return Vec::new();
    }

    debug!(url = %task.url, depth = task.depth, "fetching page");

    let page = match ctx.fetcher.fetch(&task.url).await {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %task.url, depth = task.depth, error = %e, "failed to fetch page");
            return Vec::new();
        }
    };

    ctx.results.append(page.url.to_string());

    // Children would land past max_depth
    if task.depth >= ctx.max_depth {
        return Vec::new();
    }

    let links = extract_links(&page.html, &page.url, &ctx.target_host);
    debug!(url = %task.url, links = links.len(), "page parsed");

    links.into_iter().map(|link| task.child(link)).collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why one level at a time?
//    - The first task to claim a URL decides its depth
//    - If level 2 could start while a slow level 1 page is still loading,
//      a page 2 hops away might be claimed at depth 3 through a longer
//      path, and its own links would then fall past max_depth
//    - Finishing each level first means every claim happens at the
//      shortest depth
//
// 2. Why a JoinSet inside each level?
//    - The JoinSet holds the tasks that are running right now
//    - max_concurrency caps how many pages are in flight, so a huge site
//      can't spawn a million requests at once
//
// 3. How do we know the crawl is finished?
//    - Tasks only come from the level before them
//    - So once a level produces no children, nothing new can ever appear
//
// 4. Why claim before fetching instead of after?
//    - Two tasks can find the same link at the same time
//    - Claiming first means only one of them fetches it
//    - It's also why a page that fails is not retried later in the crawl
//
// 5. Why is depth still checked inside the task?
//    - Keeps every rule about a task in one place
//    - A task past max_depth ends without touching the registry
//    - Pages at max_depth skip link extraction, so they never hand back
//      children that would only be thrown away
// -----------------------------------------------------------------------------
