//! Cursor-based collection of time-ranged records.
//!
//! EdgeX list endpoints take `{from}/{to}/{limit}` and return at most
//! `limit` records ordered by creation time. [`PagedFetch::collect`] walks a
//! range by moving the lower bound to the `created` stamp of the last raw
//! record of each page. Because records sharing that stamp appear on both
//! pages, admitted records are deduplicated by id.
//!
//! Fetching stops on the first short page or after `max_rounds` pages. The
//! latter is reported through [`Fetched::truncated`].

use std::collections::HashSet;

use async_trait::async_trait;
use edgex_transit::Map;
use tracing::{debug, warn};

use crate::upstream::UpstreamError;

const FETCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::fetch");

/// Record returned by a paged source.
pub trait PagedRecord {
    /// Creation stamp in milliseconds, used as the next cursor.
    fn created(&self) -> Option<i64>;
    /// Identity used for deduplication.
    fn identity(&self) -> Option<String>;
}

impl PagedRecord for Map {
    fn created(&self) -> Option<i64> {
        // EdgeX stamps are whole milliseconds, so they always decode as integers.
        match self.get_keyword("created")? {
            edgex_transit::Value::Int(stamp) => Some(*stamp),
            _ => None,
        }
    }

    fn identity(&self) -> Option<String> {
        match self.get_keyword("id")? {
            edgex_transit::Value::String(id) => Some(id.clone()),
            edgex_transit::Value::Keyword(id) => Some(id.as_str().to_owned()),
            edgex_transit::Value::Int(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Inclusive time range in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Lower bound.
    pub from: i64,
    /// Upper bound.
    pub to: i64,
}

impl TimeRange {
    /// Creates a range.
    #[must_use]
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }
}

/// Parameters of one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Current cursor.
    pub from: i64,
    /// Fixed upper bound.
    pub to: i64,
    /// Page size.
    pub limit: usize,
}

/// Downstream endpoint that can be read page by page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Record type.
    type Record: PagedRecord + Send;

    /// Requests one raw page.
    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<Self::Record>, UpstreamError>;

    /// Filters or decorates a raw page before deduplication.
    async fn admit(&self, page: Vec<Self::Record>) -> Result<Vec<Self::Record>, UpstreamError> {
        Ok(page)
    }
}

/// Records collected from a range.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    /// Admitted, deduplicated records in arrival order.
    pub items: Vec<T>,
    /// Pages requested.
    pub rounds: usize,
    /// Whether the round limit stopped the walk while pages were still full.
    pub truncated: bool,
}

/// Pagination limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagedFetch {
    page_size: usize,
    max_rounds: usize,
}

impl Default for PagedFetch {
    fn default() -> Self {
        Self::new(
            edgex_ui_config::DEFAULT_PAGE_SIZE,
            edgex_ui_config::DEFAULT_MAX_ROUNDS,
        )
    }
}

impl PagedFetch {
    /// Creates a fetcher; `max_rounds` of zero still issues one request.
    #[must_use]
    pub fn new(page_size: usize, max_rounds: usize) -> Self {
        Self {
            page_size,
            max_rounds,
        }
    }

    /// Records requested per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Walks `range` and returns every admitted record once.
    ///
    /// # Errors
    ///
    /// The first page or admission failure aborts the walk.
    pub async fn collect<S>(
        &self,
        source: &S,
        range: TimeRange,
    ) -> Result<Fetched<S::Record>, UpstreamError>
    where
        S: PageSource + ?Sized,
    {
        let mut cursor = range.from;
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        let mut rounds = 0;

        loop {
            let window = PageWindow {
                from: cursor,
                to: range.to,
                limit: self.page_size,
            };
            let page = source.fetch_page(window).await?;
            rounds += 1;
            let count = page.len();
            if let Some(created) = page.last().and_then(PagedRecord::created) {
                cursor = created;
            }

            for record in source.admit(page).await? {
                if let Some(id) = record.identity() {
                    if !seen.insert(id) {
                        continue;
                    }
                }
                items.push(record);
            }
            debug!(target: FETCH_TARGET, rounds, count, cursor, "page fetched");

            let full = count == self.page_size;
            if !full || rounds >= self.max_rounds {
                let truncated = full && count > 0;
                if truncated {
                    warn!(
                        target: FETCH_TARGET,
                        rounds,
                        cursor,
                        to = range.to,
                        "round limit reached; results truncated"
                    );
                }
                return Ok(Fetched {
                    items,
                    rounds,
                    truncated,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    struct Record {
        id: String,
        created: i64,
        device: &'static str,
    }

    impl PagedRecord for Record {
        fn created(&self) -> Option<i64> {
            Some(self.created)
        }

        fn identity(&self) -> Option<String> {
            Some(self.id.clone())
        }
    }

    /// Serves scripted pages and records the windows it was asked for.
    struct Scripted {
        pages: Mutex<Vec<Vec<Record>>>,
        windows: Mutex<Vec<PageWindow>>,
        device: Option<&'static str>,
    }

    impl Scripted {
        fn new(pages: Vec<Vec<Record>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                windows: Mutex::new(Vec::new()),
                device: None,
            }
        }

        fn windows(&self) -> Vec<PageWindow> {
            self.windows.lock().map(|w| w.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl PageSource for Scripted {
        type Record = Record;

        async fn fetch_page(&self, window: PageWindow) -> Result<Vec<Record>, UpstreamError> {
            if let Ok(mut windows) = self.windows.lock() {
                windows.push(window);
            }
            let next = self.pages.lock().ok().and_then(|mut pages| pages.pop());
            next.ok_or_else(|| UpstreamError::Transport {
                url: "scripted".to_owned(),
                message: "no more pages".to_owned(),
            })
        }

        async fn admit(&self, page: Vec<Record>) -> Result<Vec<Record>, UpstreamError> {
            Ok(match self.device {
                Some(device) => page.into_iter().filter(|r| r.device == device).collect(),
                None => page,
            })
        }
    }

    /// Always answers with a full page starting at the requested cursor.
    ///
    /// With `overlap`, each page repeats the record sitting on the cursor,
    /// as EdgeX does for records sharing the boundary stamp.
    struct Endless {
        overlap: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageSource for Endless {
        type Record = Record;

        async fn fetch_page(&self, window: PageWindow) -> Result<Vec<Record>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let first = if self.overlap { window.from } else { window.from + 1 };
            Ok((first..)
                .take(window.limit)
                .map(|stamp| record(&format!("r{stamp}"), stamp))
                .collect())
        }
    }

    fn record(id: &str, created: i64) -> Record {
        Record {
            id: id.to_owned(),
            created,
            device: "d1",
        }
    }

    /// Page of `len` records stamped from `start` upwards.
    fn run(start: i64, len: i64) -> Vec<Record> {
        (start..start + len)
            .map(|stamp| record(&format!("r{stamp}"), stamp))
            .collect()
    }

    #[rstest]
    #[tokio::test]
    async fn short_first_page_issues_one_request() {
        let source = Scripted::new(vec![vec![record("a", 10), record("b", 20)]]);
        let fetched = PagedFetch::new(3, 100)
            .collect(&source, TimeRange::new(0, 99))
            .await
            .ok();

        assert_eq!(fetched.as_ref().map(|f| f.items.len()), Some(2));
        assert_eq!(fetched.as_ref().map(|f| f.truncated), Some(false));
        assert_eq!(source.windows().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn overlapping_stamps_are_deduplicated() {
        let source = Scripted::new(vec![
            vec![record("a", 10), record("b", 20), record("c", 30)],
            vec![record("c", 30), record("d", 40)],
        ]);
        let fetched = PagedFetch::new(3, 100)
            .collect(&source, TimeRange::new(0, 99))
            .await;

        let ids: Vec<_> = fetched
            .map(|f| f.items.into_iter().map(|r| r.id).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        let cursors: Vec<_> = source.windows().iter().map(|w| w.from).collect();
        assert_eq!(cursors, vec![0, 30]);
    }

    #[rstest]
    #[case::disjoint_pages(false, 10_000)]
    #[case::shared_boundary_stamps(true, 9_901)]
    #[tokio::test]
    async fn full_pages_stop_at_the_round_limit(#[case] overlap: bool, #[case] expected: usize) {
        let source = Endless {
            overlap,
            calls: AtomicUsize::new(0),
        };
        let fetched = PagedFetch::new(100, 100)
            .collect(&source, TimeRange::new(0, i64::MAX))
            .await
            .ok();

        assert_eq!(source.calls.load(Ordering::SeqCst), 100);
        assert_eq!(fetched.as_ref().map(|f| f.rounds), Some(100));
        assert_eq!(fetched.as_ref().map(|f| f.truncated), Some(true));
        let count = fetched.as_ref().map_or(0, |f| f.items.len());
        assert_eq!(count, expected);
        assert!(count <= 10_000);
    }

    #[rstest]
    #[case::disjoint_pages(vec![run(1, 100), run(101, 100), run(201, 37)], 237)]
    #[case::shared_boundary_stamps(vec![run(1, 100), run(100, 100), run(199, 37)], 235)]
    #[tokio::test]
    async fn short_third_page_ends_the_walk(#[case] pages: Vec<Vec<Record>>, #[case] expected: usize) {
        let source = Scripted::new(pages);
        let fetched = PagedFetch::new(100, 100)
            .collect(&source, TimeRange::new(0, i64::MAX))
            .await
            .ok();

        assert_eq!(source.windows().len(), 3);
        assert_eq!(fetched.as_ref().map(|f| f.items.len()), Some(expected));
        assert_eq!(fetched.as_ref().map(|f| f.truncated), Some(false));
        let cursors: Vec<_> = source.windows().iter().map(|w| w.from).collect();
        assert_eq!(cursors.first(), Some(&0));
    }

    #[rstest]
    #[tokio::test]
    async fn filtering_does_not_shorten_the_walk() {
        let mut other = record("x", 15);
        other.device = "d2";
        let mut source = Scripted::new(vec![
            vec![record("a", 10), other],
            vec![record("b", 20)],
        ]);
        source.device = Some("d1");
        let fetched = PagedFetch::new(2, 100)
            .collect(&source, TimeRange::new(0, 99))
            .await;

        let ids: Vec<_> = fetched
            .map(|f| f.items.into_iter().map(|r| r.id).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(source.windows().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn page_errors_abort_the_fetch() {
        let source = Scripted::new(vec![vec![record("a", 1), record("b", 2)]]);
        let fetched = PagedFetch::new(2, 100)
            .collect(&source, TimeRange::new(0, 99))
            .await;
        assert!(fetched.is_err());
    }

    #[rstest]
    fn float_stamps_are_not_cursors() {
        let mut map = Map::new();
        map.insert(edgex_transit::Value::keyword("created"), edgex_transit::Value::Float(1.5));
        assert_eq!(PagedRecord::created(&map), None);
    }
}
