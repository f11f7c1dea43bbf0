use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::catalog::{self, UPCOMING};
use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::omdb::{MovieRecord, MovieSource};
use crate::page::{Container, RenderTarget, SharedPage, SEARCH_RESULTS_TARGET};
use crate::render::{self, CardRenderer};
use crate::search::{self, DEFAULT_PAGES};

pub const DEFAULT_MIN_QUERY_LEN: usize = 3;
pub const MY_LIST_NOTICE: &str = "My List feature coming soon!";
pub const SERIES_QUERY: &str = "Series";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// No query.
    Idle,
    /// Query present but too short to search.
    Typing,
    /// Search pending or in flight.
    Searching,
    ResultsShown,
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchState::Idle => "idle",
            SearchState::Typing => "typing",
            SearchState::Searching => "searching",
            SearchState::ResultsShown => "results",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub struct SearchSettings {
    pub min_query_len: usize,
    pub pages: u32,
    pub debounce: Duration,
    /// Drop completions older than the latest fired search.
    pub guard_stale_results: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            pages: DEFAULT_PAGES,
            debounce: DEFAULT_DEBOUNCE,
            guard_stale_results: false,
        }
    }
}

/// Published once per completed search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub seq: u64,
    pub query: String,
    pub results: Vec<MovieRecord>,
    /// False when the stale guard kept the results off the page.
    pub applied: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavCategory {
    Home,
    Movies,
    Series,
    MyList,
}

impl NavCategory {
    pub const ALL: [NavCategory; 4] = [
        NavCategory::Home,
        NavCategory::Movies,
        NavCategory::Series,
        NavCategory::MyList,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "home" => Some(NavCategory::Home),
            "movies" => Some(NavCategory::Movies),
            "series" => Some(NavCategory::Series),
            "mylist" | "my-list" => Some(NavCategory::MyList),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavCategory::Home => "home",
            NavCategory::Movies => "movies",
            NavCategory::Series => "series",
            NavCategory::MyList => "mylist",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavOutcome {
    DefaultView,
    /// Container to bring into view.
    Focus(&'static str),
    Input(SearchState),
    Notice(&'static str),
}

struct Inner {
    source: Arc<dyn MovieSource>,
    page: SharedPage,
    renderer: CardRenderer,
    settings: SearchSettings,
    state: Mutex<SearchState>,
    issued: AtomicU64,
    generation: AtomicU64,
    outcomes: broadcast::Sender<SearchOutcome>,
}

impl Inner {
    fn set_state(&self, state: SearchState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    fn state(&self) -> SearchState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn run_search(&self, query: String, generation: u64) -> SearchOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        if self.is_current(generation) {
            self.set_state(SearchState::Searching);
        }
        debug!(seq, query = %query, "search fired");

        let results = search::search(self.source.as_ref(), &query, self.settings.pages).await;

        let stale = self.issued.load(Ordering::SeqCst) > seq;
        let applied = !(self.settings.guard_stale_results && stale);
        if applied {
            Container::new(self.page.clone(), SEARCH_RESULTS_TARGET)
                .replace(self.renderer.render(&results))
                .await;
            if self.is_current(generation) && self.state() == SearchState::Searching {
                self.set_state(SearchState::ResultsShown);
            }
        } else {
            debug!(seq, query = %query, "dropping stale search results");
        }

        let outcome = SearchOutcome {
            seq,
            query,
            results,
            applied,
        };
        // no subscribers is fine
        let _ = self.outcomes.send(outcome.clone());
        outcome
    }
}

/// Entry point for user interaction: typed input, genre cards and the
/// navigation bar.
pub struct Dispatcher {
    inner: Arc<Inner>,
    debouncer: Debouncer,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn MovieSource>,
        page: SharedPage,
        renderer: CardRenderer,
        settings: SearchSettings,
    ) -> Self {
        let (outcomes, _) = broadcast::channel(16);
        let debouncer = Debouncer::new(settings.debounce);
        Self {
            inner: Arc::new(Inner {
                source,
                page,
                renderer,
                settings,
                state: Mutex::new(SearchState::Idle),
                issued: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                outcomes,
            }),
            debouncer,
        }
    }

    pub fn state(&self) -> SearchState {
        self.inner.state()
    }

    pub fn page(&self) -> SharedPage {
        self.inner.page.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchOutcome> {
        self.inner.outcomes.subscribe()
    }

    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Input-change event. The raw value is stored as typed; the trimmed
    /// value decides what happens.
    pub async fn input(&self, raw: &str) -> SearchState {
        self.debouncer.cancel();
        let generation = self.inner.bump_generation();
        let query = raw.trim();

        let state = {
            let mut page = self.inner.page.lock().await;
            page.set_search_input(raw);
            if query.is_empty() {
                page.show_defaults();
                SearchState::Idle
            } else {
                page.show_search();
                if query.chars().count() < self.inner.settings.min_query_len {
                    SearchState::Typing
                } else {
                    SearchState::Searching
                }
            }
        };

        // set before scheduling so a zero-delay search cannot finish first
        self.inner.set_state(state);
        if state == SearchState::Searching {
            let inner = Arc::clone(&self.inner);
            let query = query.to_string();
            self.debouncer.schedule(async move {
                inner.run_search(query, generation).await;
            });
        }
        state
    }


    /// Genre card activation. Skips the debounce and waits for the search.
    /// A blank name fetches nothing and returns the page to its default view.
    pub async fn activate_genre(&self, name: &str) -> Option<SearchOutcome> {
        if name.trim().is_empty() {
            self.navigate(NavCategory::Home).await;
            return None;
        }
        self.debouncer.cancel();
        let generation = self.inner.bump_generation();
        let genre = catalog::find_genre(name)
            .map(|g| g.name.to_string())
            .unwrap_or_else(|| name.trim().to_string());
        info!(genre = %genre, "genre activated");

        {
            let mut page = self.inner.page.lock().await;
            page.set_search_input(&genre);
            page.show_search();
            page.replace(SEARCH_RESULTS_TARGET, render::finding(&genre));
        }
        self.inner.set_state(SearchState::Searching);
        Some(self.inner.run_search(genre, generation).await)
    }

    pub async fn navigate(&self, category: NavCategory) -> NavOutcome {
        debug!(category = category.as_str(), "navigation");
        match category {
            NavCategory::Home => {
                self.debouncer.cancel();
                self.inner.bump_generation();
                {
                    let mut page = self.inner.page.lock().await;
                    page.set_search_input("");
                    page.show_defaults();
                }
                self.inner.set_state(SearchState::Idle);
                NavOutcome::DefaultView
            }
            NavCategory::Movies => NavOutcome::Focus(UPCOMING.target),
            NavCategory::Series => NavOutcome::Input(self.input(SERIES_QUERY).await),
            NavCategory::MyList => NavOutcome::Notice(MY_LIST_NOTICE),
        }
    }
}
