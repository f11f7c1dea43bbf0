use std::cmp::Ordering;

use futures::future::join_all;
use itertools::Itertools;
use tracing::{debug, info};

use crate::omdb::{MovieRecord, MovieSource, SearchPage, SearchStub};
use crate::utils;

/// Result pages requested per query.
pub const DEFAULT_PAGES: u32 = 5;

/// Fetches `pages` result pages concurrently, deduplicates the stubs, looks
/// each one up by identifier and returns the found records newest first.
/// Never fails: anything that goes wrong just shrinks the result.
pub async fn search(source: &dyn MovieSource, query: &str, pages: u32) -> Vec<MovieRecord> {
    let requests = (1..=pages).map(|page| source.search_page(query, page));
    let combined = combine_pages(join_all(requests).await);
    let unique = dedup_by_id(combined);
    debug!(query, unique = unique.len(), "search pages combined");
    if unique.is_empty() {
        return Vec::new();
    }

    let lookups = unique.iter().map(|stub| source.lookup_id(&stub.imdb_id));
    let mut found: Vec<MovieRecord> = join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .filter(|m| m.found)
        .collect();
    sort_records(&mut found);
    info!(query, results = found.len(), "search completed");
    found
}

/// Concatenates the stubs of every successful page in page order.
pub fn combine_pages(pages: Vec<Option<SearchPage>>) -> Vec<SearchStub> {
    pages
        .into_iter()
        .flatten()
        .flat_map(SearchPage::into_stubs)
        .collect()
}

/// One stub per identifier, the first one seen wins.
pub fn dedup_by_id(stubs: Vec<SearchStub>) -> Vec<SearchStub> {
    stubs
        .into_iter()
        .unique_by(|s| s.imdb_id.clone())
        .collect()
}

pub fn extract_year(movie: &MovieRecord) -> i64 {
    movie
        .year
        .as_deref()
        .and_then(utils::parse_leading_int)
        .unwrap_or(0)
}

pub fn extract_rating(movie: &MovieRecord) -> f64 {
    movie
        .rating
        .as_deref()
        .and_then(utils::parse_leading_float)
        .unwrap_or(0.0)
}

pub fn compare_records(a: &MovieRecord, b: &MovieRecord) -> Ordering {
    extract_year(b)
        .cmp(&extract_year(a))
        .then_with(|| extract_rating(b).total_cmp(&extract_rating(a)))
}

/// Year descending, then rating descending. Stable for equal keys.
pub fn sort_records(records: &mut [MovieRecord]) {
    records.sort_by(compare_records);
}
