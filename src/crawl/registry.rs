// src/crawl/registry.rs
// =============================================================================
// The set of URLs that have been claimed for exploration.
//
// Every task calls claim_if_new() before fetching. Exactly one caller wins
// for a given URL, even when many tasks discover the same link at the same
// moment. This is also what stops cycles (A -> B -> A) from running forever.
//
// Rust concepts:
// - DashSet: a HashSet split into shards, each with its own lock, so
//   insert() is atomic without one big Mutex around the whole set
//
// contains() lets the coordinator skip links that are already taken before
// spawning tasks for them. It never replaces the claim.
// =============================================================================

use dashmap::DashSet;
use url::Url;

/// URLs claimed during one discovery call
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    claimed: DashSet<String>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for the caller.
    ///
    /// Returns true only for the first caller; the check and the insert
    /// happen under the same shard lock.
    pub fn claim_if_new(&self, url: &Url) -> bool {
        self.claimed.insert(url.as_str().to_owned())
    }

    /// True once `url` has been claimed. Only a hint: the answer can be
    /// stale by the time the caller acts on it.
    pub fn contains(&self, url: &Url) -> bool {
        self.claimed.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }
}
