use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{MovieRecord, MovieSource, SearchPage, SearchStub};

/// In-memory source for tests. Anything not registered is absent, the same
/// way a failed request is.
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    titles: HashMap<String, MovieRecord>,
    ids: HashMap<String, MovieRecord>,
    pages: HashMap<(String, u32), SearchPage>,
    delays: HashMap<String, Duration>,
    lookup_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_title(mut self, title: &str, record: MovieRecord) -> Self {
        self.titles.insert(title.to_string(), record);
        self
    }

    pub(crate) fn with_record(mut self, record: MovieRecord) -> Self {
        self.ids.insert(record.imdb_id.clone(), record);
        self
    }

    pub(crate) fn with_page(mut self, query: &str, page: u32, stubs: Vec<SearchStub>) -> Self {
        self.pages.insert(
            (query.to_string(), page),
            SearchPage {
                found: true,
                total_results: Some(stubs.len().to_string()),
                results: Some(stubs),
                error: None,
            },
        );
        self
    }

    /// Delays every search for `query` by `delay`.
    pub(crate) fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    /// Delays every title and id lookup by `delay`.
    pub(crate) fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub(crate) fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record_call(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    async fn lookup_pause(&self) {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

pub(crate) fn movie(id: &str, title: &str, year: &str, rating: &str) -> MovieRecord {
    MovieRecord {
        imdb_id: id.to_string(),
        title: title.to_string(),
        year: Some(year.to_string()),
        genre: Some("Action".to_string()),
        plot: Some(format!("Plot of {title}")),
        poster: Some(format!("https://img.example/{id}.jpg")),
        rating: Some(rating.to_string()),
        found: true,
        ..Default::default()
    }
}

pub(crate) fn stub(id: &str, title: &str) -> SearchStub {
    SearchStub {
        imdb_id: id.to_string(),
        title: title.to_string(),
        year: "2022".to_string(),
        kind: "movie".to_string(),
        poster: "N/A".to_string(),
    }
}

#[async_trait]
impl MovieSource for FakeSource {
    async fn lookup_title(&self, title: &str) -> Option<MovieRecord> {
        self.record_call(format!("t:{title}"));
        self.lookup_pause().await;
        self.titles.get(title).cloned()
    }

    async fn lookup_id(&self, imdb_id: &str) -> Option<MovieRecord> {
        self.record_call(format!("i:{imdb_id}"));
        self.lookup_pause().await;
        self.ids.get(imdb_id).cloned()
    }

    async fn search_page(&self, query: &str, page: u32) -> Option<SearchPage> {
        self.record_call(format!("s:{query}:{page}"));
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        self.pages.get(&(query.to_string(), page)).cloned()
    }
}
