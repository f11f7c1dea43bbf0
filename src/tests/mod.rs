use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::dispatch::{NavOutcome, SearchState};
use crate::omdb::fake::{movie, stub, FakeSource};
use crate::omdb::MovieSource;
use crate::page::SEARCH_RESULTS_TARGET;
use crate::render;
use crate::runner::{Options, Runner, RunnerError};
use crate::search;

fn options_for(server: &MockServer) -> Options {
    Options {
        api_key: Some("test-key".to_string()),
        base_url: format!("{}/", server.uri()),
        timeout_seconds: 5,
        debounce_ms: 20,
        ..Options::default()
    }
}

fn detail(id: &str, title: &str, year: &str, rating: &str) -> serde_json::Value {
    json!({
        "Title": title,
        "Year": year,
        "imdbID": id,
        "Genre": "Action, Drama",
        "Plot": format!("{title} plot"),
        "Poster": "N/A",
        "imdbRating": rating,
        "Response": "True"
    })
}

const RRR_IDS: [(&str, &str, &str, &str); 5] = [
    ("tt8178634", "RRR", "2022", "7.8"),
    ("tt0000001", "RRR: Behind and Beyond", "2024", "7.4"),
    ("tt0000002", "Roar of RRR", "2022", "8.1"),
    ("tt0000003", "RRR Live", "N/A", "N/A"),
    ("tt0000004", "RRR (Series)", "2023–", "6.9"),
];

fn rrr_page(range: std::ops::Range<usize>) -> serde_json::Value {
    let search: Vec<serde_json::Value> = range
        .map(|i| {
            let (id, title, year, _) = RRR_IDS[i % RRR_IDS.len()];
            json!({"Title": title, "Year": year, "imdbID": id, "Type": "movie", "Poster": "N/A"})
        })
        .collect();
    json!({"Search": search, "totalResults": "25", "Response": "True"})
}

async fn mount_rrr(server: &MockServer) {
    for (page, range) in [(1, 0..10), (2, 10..20), (3, 20..25)] {
        Mock::given(method("GET"))
            .and(query_param("s", "RRR"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(rrr_page(range)))
            .expect(1)
            .mount(server)
            .await;
    }
    for page in [4, 5] {
        Mock::given(method("GET"))
            .and(query_param("s", "RRR"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(server)
            .await;
    }
    for (id, title, year, rating) in RRR_IDS {
        Mock::given(method("GET"))
            .and(query_param("i", id))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail(id, title, year, rating)))
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn rrr_search_end_to_end() {
    let server = MockServer::start().await;
    mount_rrr(&server).await;

    let runner = Runner::new(options_for(&server)).unwrap();
    let report = runner.search("RRR").await;

    assert_eq!(report.state, SearchState::ResultsShown);
    assert_eq!(report.sections.len(), 1);
    let ids: Vec<&str> = report.sections[0]
        .movies
        .iter()
        .map(|m| m.imdb_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["tt0000001", "tt0000004", "tt0000002", "tt8178634", "tt0000003"]
    );

    let detail_calls = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.query_pairs().any(|(k, _)| k == "i"))
        .count();
    assert_eq!(detail_calls, 5);

    let page = runner.page();
    let page = page.lock().await;
    assert!(page.search_visible());
    let html = page.content(SEARCH_RESULTS_TARGET).unwrap().to_string();
    assert_eq!(html.matches(r#"class="movie-card""#).count(), 5);
    assert!(html.contains(render::NO_IMAGE_PLACEHOLDER));
}

#[tokio::test]
async fn home_page_fails_soft_per_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("t", "RRR"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(detail("tt8178634", "RRR", "2022", "7.8")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("t", "Sholay"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("t", "Dangal"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"Response": "False", "Error": "Movie not found!"})),
        )
        .mount(&server)
        .await;

    let runner = Runner::new(options_for(&server)).unwrap();
    let report = runner.render_home().await;

    assert_eq!(report.sections.len(), 5);
    assert_eq!(report.movie_count(), 1);
    let bollywood = report
        .sections
        .iter()
        .find(|s| s.target == "bollywoodGrid")
        .unwrap();
    assert_eq!(bollywood.movies[0].title, "RRR");

    let page = runner.page();
    let page = page.lock().await;
    assert_eq!(page.content("marvelGrid"), Some(&render::no_results()));
    assert!(page.content("genreList").unwrap().as_str().contains("genre-card"));
    assert!(page.defaults_visible());
}

#[tokio::test]
async fn short_query_never_reaches_the_server() {
    let server = MockServer::start().await;
    let runner = Runner::new(options_for(&server)).unwrap();
    let report = runner.search("rr").await;
    assert_eq!(report.state, SearchState::Typing);
    assert!(report.sections.is_empty());
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 0);
}

#[test]
fn runner_requires_api_key() {
    let err = Runner::new(Options::default()).err().unwrap();
    assert!(matches!(err, RunnerError::MissingApiKey));

    let blank = Options {
        api_key: Some("  ".to_string()),
        ..Options::default()
    };
    assert!(matches!(
        Runner::new(blank).err().unwrap(),
        RunnerError::MissingApiKey
    ));
}

#[test]
fn runner_rejects_bad_settings() {
    let bad_url = Options {
        api_key: Some("k".to_string()),
        base_url: "omdb".to_string(),
        ..Options::default()
    };
    assert!(matches!(
        Runner::new(bad_url).err().unwrap(),
        RunnerError::InvalidBaseUrl { .. }
    ));

    let source: Arc<dyn MovieSource> = Arc::new(FakeSource::new());
    let no_pages = Options {
        search_pages: 0,
        ..Options::default()
    };
    assert!(matches!(
        Runner::with_source(no_pages, source).err().unwrap(),
        RunnerError::InvalidSearchPages { value: 0 }
    ));
}

fn fake_runner(source: FakeSource) -> Runner {
    let options = Options {
        debounce_ms: 10,
        ..Options::default()
    };
    Runner::with_source(options, Arc::new(source)).unwrap()
}

#[tokio::test]
async fn unknown_list_and_category_are_errors() {
    let runner = fake_runner(FakeSource::new());
    assert!(matches!(
        runner.render_list("horror").await.err().unwrap(),
        RunnerError::UnknownList { .. }
    ));
    assert!(matches!(
        runner.navigate("tv").await.err().unwrap(),
        RunnerError::UnknownNavCategory { .. }
    ));
}

#[tokio::test]
async fn catalog_command_renders_one_list() {
    let runner = fake_runner(
        FakeSource::new()
            .with_title("Logan", movie("tt3315342", "Logan", "2017", "8.1"))
            .with_title("Speed", movie("tt0111257", "Speed", "1994", "7.3")),
    );
    let report = runner.render_list("ACTION").await.unwrap();
    assert_eq!(report.action, "catalog action");
    let ids: Vec<&str> = report.sections[0]
        .movies
        .iter()
        .map(|m| m.imdb_id.as_str())
        .collect();
    // list order, not sorted
    assert_eq!(ids, vec!["tt3315342", "tt0111257"]);
}

#[tokio::test]
async fn series_navigation_runs_a_search() {
    let runner = fake_runner(
        FakeSource::new()
            .with_page("Series", 1, vec![stub("tt9", "Series of Events")])
            .with_record(movie("tt9", "Series of Events", "2017", "7.7")),
    );
    let (outcome, report) = runner.navigate("series").await.unwrap();
    assert_eq!(outcome, NavOutcome::Input(SearchState::Searching));
    assert_eq!(report.state, SearchState::ResultsShown);
    assert_eq!(report.movie_count(), 1);

    let (outcome, report) = runner.navigate("mylist").await.unwrap();
    assert_eq!(outcome, NavOutcome::Notice("My List feature coming soon!"));
    assert_eq!(report.notice.as_deref(), Some("My List feature coming soon!"));
}

#[tokio::test]
async fn genre_search_matches_typed_search() {
    let source = FakeSource::new()
        .with_page("Drama", 1, vec![stub("tt1", "One"), stub("tt2", "Two")])
        .with_page("Drama", 2, vec![stub("tt2", "Two")])
        .with_record(movie("tt1", "One", "1999", "8.0"))
        .with_record(movie("tt2", "Two", "2005", "7.0"));
    let direct = search::search(&source, "Drama", search::DEFAULT_PAGES).await;

    let runner = fake_runner(source);
    let report = runner.activate_genre("drama").await;
    assert_eq!(report.action, "genre Drama");
    assert_eq!(report.sections[0].movies, direct);
}

#[tokio::test]
async fn blank_genre_never_reaches_the_server() {
    let server = MockServer::start().await;
    let runner = Runner::new(options_for(&server)).unwrap();
    runner.search("Dune").await;
    let before = server.received_requests().await.unwrap_or_default().len();

    let report = runner.activate_genre("  ").await;
    assert_eq!(report.state, SearchState::Idle);
    assert!(report.sections.is_empty());
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), before);

    let page = runner.page();
    let page = page.lock().await;
    assert!(page.defaults_visible());
    assert_eq!(page.search_input(), "");
}
