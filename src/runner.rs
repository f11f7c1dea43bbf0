use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::catalog::{self, TitleList};
use crate::debounce::DEFAULT_DEBOUNCE;
use crate::dispatch::{
    Dispatcher, NavCategory, NavOutcome, SearchOutcome, SearchSettings, SearchState,
    DEFAULT_MIN_QUERY_LEN,
};
use crate::omdb::{MovieRecord, MovieSource, OmdbClient, DEFAULT_BASE_URL};
use crate::page::{Container, Page, SharedPage, SEARCH_RESULTS_TARGET};
use crate::render::{CardRenderer, DETAIL_URL_BASE, NO_IMAGE_PLACEHOLDER};
use crate::search::DEFAULT_PAGES;

const USER_AGENT: &str = concat!("cinegrid/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct Options {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub search_pages: u32,
    pub placeholder_poster: String,
    pub detail_url_base: String,
    pub guard_stale_results: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
            proxy: None,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            search_pages: DEFAULT_PAGES,
            placeholder_poster: NO_IMAGE_PLACEHOLDER.to_string(),
            detail_url_base: DETAIL_URL_BASE.to_string(),
            guard_stale_results: false,
        }
    }
}

impl Options {
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            min_query_len: self.min_query_len,
            pages: self.search_pages,
            debounce: Duration::from_millis(self.debounce_ms),
            guard_stale_results: self.guard_stale_results,
        }
    }

    pub fn card_renderer(&self) -> CardRenderer {
        CardRenderer::new(&self.placeholder_poster, &self.detail_url_base)
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("OMDb API key is required (use --api-key, the config file or OMDB_API_KEY)")]
    MissingApiKey,

    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("invalid search_pages {value}, expected at least 1")]
    InvalidSearchPages { value: u32 },

    #[error("invalid min_query_len {value}, expected at least 1")]
    InvalidMinQueryLen { value: usize },

    #[error("unknown list '{name}', expected one of: {expected}")]
    UnknownList { name: String, expected: String },

    #[error("unknown nav category '{value}', expected home, movies, series or mylist")]
    UnknownNavCategory { value: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Records one container ended up showing.
#[derive(Clone, Debug)]
pub struct SectionResult {
    pub target: String,
    pub heading: String,
    pub movies: Vec<MovieRecord>,
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub action: String,
    pub state: SearchState,
    pub sections: Vec<SectionResult>,
    pub notice: Option<String>,
}

impl RunReport {
    pub fn new(started_at: Instant, action: impl Into<String>, state: SearchState) -> Self {
        Self {
            started_at,
            elapsed: started_at.elapsed(),
            action: action.into(),
            state,
            sections: Vec::new(),
            notice: None,
        }
    }

    pub fn with_search_results(mut self, movies: Vec<MovieRecord>) -> Self {
        self.sections.push(search_section(movies));
        self
    }

    pub fn movie_count(&self) -> usize {
        self.sections.iter().map(|s| s.movies.len()).sum()
    }
}

pub struct Runner {
    options: Options,
    source: Arc<dyn MovieSource>,
    page: SharedPage,
    renderer: CardRenderer,
    dispatcher: Dispatcher,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        let api_key = options
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RunnerError::MissingApiKey)?
            .to_string();
        let base_url = parse_base_url(&options.base_url)?;
        let client = build_http_client(options.proxy.as_deref(), options.timeout_seconds)?;
        let source: Arc<dyn MovieSource> = Arc::new(OmdbClient::new(client, base_url, api_key));
        Self::with_source(options, source)
    }

    /// Builds a runner around an existing movie source. The API key and base
    /// URL are not used.
    pub fn with_source(
        options: Options,
        source: Arc<dyn MovieSource>,
    ) -> Result<Self, RunnerError> {
        if options.search_pages == 0 {
            return Err(RunnerError::InvalidSearchPages {
                value: options.search_pages,
            });
        }
        if options.min_query_len == 0 {
            return Err(RunnerError::InvalidMinQueryLen {
                value: options.min_query_len,
            });
        }
        let page = Page::home().shared();
        let renderer = options.card_renderer();
        let dispatcher = Dispatcher::new(
            Arc::clone(&source),
            page.clone(),
            renderer.clone(),
            options.search_settings(),
        );
        Ok(Self {
            options,
            source,
            page,
            renderer,
            dispatcher,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn source(&self) -> Arc<dyn MovieSource> {
        Arc::clone(&self.source)
    }

    pub fn page(&self) -> SharedPage {
        self.page.clone()
    }

    pub fn renderer(&self) -> &CardRenderer {
        &self.renderer
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn render_home(&self) -> RunReport {
        let started_at = Instant::now();
        let rendered =
            catalog::render_home(self.source(), self.page.clone(), &self.renderer).await;
        let mut report = RunReport::new(started_at, "page", self.dispatcher.state());
        report.sections = rendered
            .into_iter()
            .map(|(list, movies)| section_result(list, movies))
            .collect();
        info!(movies = report.movie_count(), "home page rendered");
        report
    }

    pub async fn render_list(&self, name: &str) -> Result<RunReport, RunnerError> {
        let list = catalog::find_list(name).ok_or_else(|| RunnerError::UnknownList {
            name: name.to_string(),
            expected: catalog::list_names().join(", "),
        })?;
        let started_at = Instant::now();
        let container = Container::new(self.page.clone(), list.target);
        let movies =
            catalog::render_catalog(self.source.as_ref(), list.titles, &container, &self.renderer)
                .await;
        let mut report = RunReport::new(
            started_at,
            format!("catalog {}", list.name),
            self.dispatcher.state(),
        );
        report.sections.push(section_result(list, movies));
        Ok(report)
    }

    /// Feeds `query` through the input path and waits for the debounced
    /// search, if one was scheduled.
    pub async fn search(&self, query: &str) -> RunReport {
        let started_at = Instant::now();
        let outcomes = self.dispatcher.subscribe();
        let state = self.dispatcher.input(query).await;
        let movies = self.settle(state, outcomes).await;
        let mut report = RunReport::new(started_at, format!("search {}", query.trim()), state);
        if let Some(movies) = movies {
            report.sections.push(search_section(movies));
            report.state = self.dispatcher.state();
        }
        report
    }

    pub async fn activate_genre(&self, name: &str) -> RunReport {
        let started_at = Instant::now();
        match self.dispatcher.activate_genre(name).await {
            Some(outcome) => RunReport::new(
                started_at,
                format!("genre {}", outcome.query),
                self.dispatcher.state(),
            )
            .with_search_results(outcome.results),
            None => RunReport::new(started_at, "genre", self.dispatcher.state()),
        }
    }

    pub async fn navigate(&self, value: &str) -> Result<(NavOutcome, RunReport), RunnerError> {
        let category =
            NavCategory::parse(value).ok_or_else(|| RunnerError::UnknownNavCategory {
                value: value.to_string(),
            })?;
        let started_at = Instant::now();
        let outcomes = self.dispatcher.subscribe();
        let outcome = self.dispatcher.navigate(category).await;

        let mut report = RunReport::new(
            started_at,
            format!("nav {}", category.as_str()),
            self.dispatcher.state(),
        );
        match &outcome {
            NavOutcome::Input(state) => {
                if let Some(movies) = self.settle(*state, outcomes).await {
                    report.sections.push(search_section(movies));
                }
                report.state = self.dispatcher.state();
            }
            NavOutcome::Notice(notice) => report.notice = Some(notice.to_string()),
            NavOutcome::Focus(target) => report.notice = Some(format!("focus {target}")),
            NavOutcome::DefaultView => {}
        }
        report.elapsed = started_at.elapsed();
        Ok((outcome, report))
    }

    async fn settle(
        &self,
        state: SearchState,
        mut outcomes: broadcast::Receiver<SearchOutcome>,
    ) -> Option<Vec<MovieRecord>> {
        if state != SearchState::Searching {
            return None;
        }
        loop {
            match outcomes.recv().await {
                Ok(outcome) if outcome.applied => return Some(outcome.results),
                Ok(outcome) => debug!(seq = outcome.seq, "skipping stale outcome"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "outcome receiver lagged"),
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

fn section_result(list: &TitleList, movies: Vec<MovieRecord>) -> SectionResult {
    SectionResult {
        target: list.target.to_string(),
        heading: list.heading.to_string(),
        movies,
    }
}

fn search_section(movies: Vec<MovieRecord>) -> SectionResult {
    SectionResult {
        target: SEARCH_RESULTS_TARGET.to_string(),
        heading: "Search Results".to_string(),
        movies,
    }
}

pub fn parse_base_url(raw: &str) -> Result<reqwest::Url, RunnerError> {
    let invalid = || RunnerError::InvalidBaseUrl {
        url: raw.to_string(),
    };
    let url = reqwest::Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(invalid()),
    }
}

pub fn build_http_client(
    proxy: Option<&str>,
    timeout_seconds: usize,
) -> Result<reqwest::Client, RunnerError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let timeout = Duration::from_secs(timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(timeout);

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| RunnerError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| RunnerError::HttpClientBuild { source: e })
}
