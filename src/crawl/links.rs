// src/crawl/links.rs
// =============================================================================
// Extracts the links a crawl should follow from an HTML page.
//
// For every <a href="..."> in the page:
// 1. Resolve the href against the page URL (relative, protocol-relative
//    and absolute hrefs all work, like in a browser)
// 2. Drop it unless the scheme is http/https and the host is exactly the
//    host we are crawling
// 3. Strip the #fragment and ?query so variants of a page collapse into one
//
// Links come back in document order. Duplicates on the same page are kept;
// the VisitedRegistry deduplicates across the whole crawl.
//
// Rust concepts:
// - LazyLock: build the CSS selector once, on first use
// - Option chaining: skip links that don't resolve
// =============================================================================

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::trace;
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Returns the same-host links of `html` as normalized absolute URLs
///
/// Parameters:
///   html: the page body
///   page_url: where the page was fetched from (for relative links)
///   target_host: the only host the crawl may visit
pub fn extract_links(html: &str, page_url: &Url, target_host: &str) -> Vec<Url> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(page_url, href))
        .filter(|url| is_crawlable(url, target_host))
        .map(normalize)
        .collect()
}

/// Resolves an href against the page it appeared on
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            trace!(page = %base, href, error = %e, "skipping unresolvable link");
            None
        }
    }
}

/// http/https on exactly the crawl's host
fn is_crawlable(url: &Url, target_host: &str) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str() == Some(target_host)
}

/// Strips the fragment and query; everything else is kept verbatim
pub fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);
    url.set_query(None);
    url
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does Url::join do?
//    - It resolves a reference the way a browser does
//    - "https://ex.com/a/b" + "../c"         = "https://ex.com/c"
//    - "https://ex.com/a"   + "//ex.com/x"   = "https://ex.com/x"
//    - "https://ex.com/a"   + "mailto:x@y"   = "mailto:x@y" (dropped later)
//
// 2. Why no case or trailing-slash normalization?
//    - "/a" and "/a/" can be different pages on a real server
//    - The url crate already lowercases scheme and host when parsing
//
// 3. Why is the selector in a LazyLock?
//    - Parsing a selector isn't free and the crawl calls this per page
//    - LazyLock runs the closure once and hands out &Selector afterwards
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    fn strings(urls: Vec<Url>) -> Vec<String> {
        urls.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a><a href="../about">About</a>"#;
        let links = extract_links(html, &page("https://example.com/page/sub"), "example.com");
        assert_eq!(
            strings(links),
            vec!["https://example.com/docs", "https://example.com/about"]
        );
    }

    #[test]
    fn test_protocol_relative_link_uses_page_scheme() {
        let html = r#"<a href="//example.com/x">X</a>"#;
        let links = extract_links(html, &page("http://example.com/"), "example.com");
        assert_eq!(strings(links), vec!["http://example.com/x"]);
    }

    #[test]
    fn test_skip_other_hosts_and_schemes() {
        let html = r#"
            <a href="https://other.com/page">Other</a>
            <a href="https://sub.example.com/page">Subdomain</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="javascript:void(0)">JS</a>
            <a href="ftp://example.com/file">FTP</a>
            <a href="/kept">Kept</a>
        "#;
        let links = extract_links(html, &page("https://example.com/"), "example.com");
        assert_eq!(strings(links), vec!["https://example.com/kept"]);
    }

    #[test]
    fn test_fragment_and_query_are_stripped() {
        let html = r#"
            <a href="http://ex.com/b#frag">B1</a>
            <a href="http://ex.com/b?x=1">B2</a>
            <a href="http://other.com/c">C</a>
        "#;
        let links = extract_links(html, &page("http://ex.com/a"), "ex.com");
        // Both variants survive here; the registry collapses them
        assert_eq!(strings(links), vec!["http://ex.com/b", "http://ex.com/b"]);
    }

    #[test]
    fn test_anchor_only_link_points_back_at_page() {
        let html = r##"<a href="#section">Jump</a>"##;
        let links = extract_links(html, &page("https://example.com/page?q=1"), "example.com");
        assert_eq!(strings(links), vec!["https://example.com/page"]);
    }

    #[test]
    fn test_scheme_switch_on_same_host_is_kept() {
        let html = r#"<a href="https://example.com/secure">S</a>"#;
        let links = extract_links(html, &page("http://example.com/"), "example.com");
        assert_eq!(strings(links), vec!["https://example.com/secure"]);
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<a name="top">Top</a><a href="/x">X</a>"#;
        let links = extract_links(html, &page("https://example.com/"), "example.com");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let html = r#"<a href="./b/../c?x=1#y">C</a>"#;
        let base = page("https://example.com/a/");
        let first = extract_links(html, &base, "example.com");
        let second = extract_links(html, &base, "example.com");
        assert_eq!(first, second);
        assert_eq!(normalize(first[0].clone()), first[0]);
    }
}
