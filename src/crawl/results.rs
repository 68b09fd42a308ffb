// src/crawl/results.rs
// =============================================================================
// The pages a crawl found.
//
// Only pages that were fetched and parsed successfully end up here. Many
// tasks append at the same time; the coordinator takes the whole list out
// once the last level has finished.
//
// Order is whatever order tasks happened to finish in. Callers that want a
// stable order sort it themselves (main.rs does).
//
// Rust concepts:
// - parking_lot::Mutex: like std's Mutex, but lock() can't be poisoned, so
//   there's no Result to unwrap
// - &self methods: the lock gives us mutation through a shared reference,
//   so the list can sit inside an Arc
// - std::mem::take: swaps the Vec out for an empty one without cloning
// =============================================================================

use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct PageResults {
    pages: Mutex<Vec<String>>,
}

impl PageResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock is held for the push only
    pub fn append(&self, url: String) {
        self.pages.lock().push(url);
    }

    /// Takes the collected pages out, leaving the list empty.
    ///
    /// Called once every task has finished, so nothing can append after it.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.pages.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_all_kept() {
        let results = Arc::new(PageResults::new());

        let mut handles = Vec::new();
        for i in 0..200 {
            let results = Arc::clone(&results);
            handles.push(tokio::spawn(async move {
                results.append(format!("https://example.com/{}", i));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut pages = results.take();
        pages.sort();
        pages.dedup();
        assert_eq!(pages.len(), 200);
        assert!(results.take().is_empty());
    }
}
