// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Print results as a list/table or as JSON
// 5. Exit with proper code (0 = success, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - timeouts, rate limits, concurrency
mod crawl;     // src/crawl/ - concurrent page discovery
mod error;     // src/error.rs - typed errors
mod scrape;    // src/scrape/ - search and sitemap scrapers
mod server;    // src/server/ - JSON HTTP API
mod telemetry; // src/telemetry.rs - logging setup

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use cli::{Cli, Commands, CrawlLimits};
use config::ScraperSettings;
use crawl::PageDiscovery;
use scrape::{GoogleScraper, ScraperConfig, SearchResult, SitemapResult, SitemapScraper};

#[tokio::main]
async fn main() {
    telemetry::init_telemetry();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "fatal error");
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pages {
            website_url,
            max_depth,
            json,
            limits,
        } => handle_pages(&website_url, max_depth, json, &limits).await,
        Commands::Sitemap { url, json } => handle_sitemap(url, json).await,
        Commands::Search {
            keywords,
            num_results,
            language,
            country_code,
            json,
        } => {
            let config = ScraperConfig {
                keywords,
                num_results,
                language,
                country_code,
                url: String::new(),
            };
            handle_search(&config, json).await
        }
        Commands::Serve { addr, limits } => {
            let settings = limits.settings();
            settings.validate()?;
            let state = server::AppState::with_defaults(settings)?;
            server::serve(&addr, state).await?;
            Ok(0)
        }
    }
}

// Handles the 'pages' subcommand
async fn handle_pages(
    website_url: &str,
    max_depth: usize,
    json: bool,
    limits: &CrawlLimits,
) -> Result<i32> {
    if !json {
        println!("🔍 Discovering pages on: {}", website_url);
        println!("📊 Max crawl depth: {}", max_depth);
    }

    // Ctrl-C stops the crawl and prints what was found so far
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing in-flight pages");
            trigger.cancel();
        }
    });

    let discovery = PageDiscovery::new(&limits.settings())?;
    let mut pages = discovery
        .discover_pages_with_cancellation(website_url, max_depth, cancel)
        .await?;
    pages.sort();

    if json {
        print_json(&pages)?;
    } else {
        println!("\n📄 Found {} page(s)\n", pages.len());
        for page in &pages {
            println!("   {}", page);
        }
    }

    Ok(0)
}

// Handles the 'sitemap' subcommand
async fn handle_sitemap(url: String, json: bool) -> Result<i32> {
    let scraper = SitemapScraper::new(&ScraperSettings::sitemap())?;
    let config = ScraperConfig {
        url,
        ..Default::default()
    };

    let entries = scraper.scrape_sitemap(&config).await?;

    if json {
        print_json(&entries)?;
    } else {
        print_sitemap_table(&entries);
    }
    Ok(0)
}

// Handles the 'search' subcommand
async fn handle_search(config: &ScraperConfig, json: bool) -> Result<i32> {
    let scraper = GoogleScraper::new(&ScraperSettings::search())?;
    let results = scraper.scrape(config).await?;

    if json {
        print_json(&results)?;
        return Ok(0);
    }

    // Keep the keyword order the user typed
    for keyword in &config.keywords {
        match results.get(keyword) {
            Some(found) => print_search_results(keyword, found),
            None => println!("⚠️  No results for \"{}\" (see log for details)\n", keyword),
        }
    }
    Ok(0)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    println!("{}", json_output);
    Ok(())
}

fn print_sitemap_table(entries: &[SitemapResult]) {
    println!("{:<60} {:<12} {:<10} {:<8}", "URL", "MODIFIED", "FREQ", "PRIORITY");
    println!("{}", "=".repeat(93));

    for entry in entries {
        let priority = entry
            .priority
            .map(|p| format!("{:.1}", p))
            .unwrap_or_default();
        println!(
            "{:<60} {:<12} {:<10} {:<8}",
            truncate(&entry.url, 57),
            entry.last_modified.as_deref().unwrap_or(""),
            entry.change_freq.as_deref().unwrap_or(""),
            priority
        );
    }

    println!();
    println!("📋 Total: {}", entries.len());
}

fn print_search_results(keyword: &str, results: &[SearchResult]) {
    println!("🔎 {} ({} result(s))", keyword, results.len());
    for result in results {
        println!("   {}", result.title);
        println!("   {}", result.url);
        if !result.description.is_empty() {
            println!("   {}", truncate(&result.description, 100));
        }
        println!();
    }
}

// Truncates long text for display, on a char boundary
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
