pub mod model;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub use model::{MovieRecord, SearchPage, SearchStub, NOT_AVAILABLE};

pub const DEFAULT_BASE_URL: &str = "http://www.omdbapi.com/";

/// The three upstream operations. Every one of them fails soft: a transport
/// error, a non-2xx status or a malformed payload comes back as `None`.
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn lookup_title(&self, title: &str) -> Option<MovieRecord>;

    async fn lookup_id(&self, imdb_id: &str) -> Option<MovieRecord>;

    async fn search_page(&self, query: &str, page: u32) -> Option<SearchPage>;
}

#[derive(Debug, Error)]
pub enum OmdbError {
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status}")]
    Status { status: reqwest::StatusCode },

    #[error("malformed payload: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug)]
pub struct OmdbClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
    api_key: String,
}

impl OmdbClient {
    pub fn new(client: reqwest::Client, base_url: reqwest::Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, OmdbError> {
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("apikey", self.api_key.as_str()));

        let resp = self
            .client
            .get(self.base_url.clone())
            .query(&query)
            .send()
            .await
            .map_err(|e| OmdbError::Request { source: e })?;
        if !resp.status().is_success() {
            return Err(OmdbError::Status {
                status: resp.status(),
            });
        }
        let body = resp
            .text()
            .await
            .map_err(|e| OmdbError::Request { source: e })?;
        serde_json::from_str::<T>(&body).map_err(|e| OmdbError::Decode { source: e })
    }
}

#[async_trait]
impl MovieSource for OmdbClient {
    async fn lookup_title(&self, title: &str) -> Option<MovieRecord> {
        debug!(title, "looking up title");
        match self.get_json::<MovieRecord>(&[("t", title)]).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(title, error = %e, "error fetching movie");
                None
            }
        }
    }

    async fn lookup_id(&self, imdb_id: &str) -> Option<MovieRecord> {
        debug!(imdb_id, "looking up identifier");
        match self.get_json::<MovieRecord>(&[("i", imdb_id)]).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(imdb_id, error = %e, "error fetching movie details");
                None
            }
        }
    }

    async fn search_page(&self, query: &str, page: u32) -> Option<SearchPage> {
        debug!(query, page, "searching");
        let page_param = page.to_string();
        match self
            .get_json::<SearchPage>(&[("s", query), ("page", page_param.as_str())])
            .await
        {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(query, page, error = %e, "error fetching search page");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OmdbClient {
        let base = reqwest::Url::parse(&format!("{}/", server.uri())).unwrap();
        OmdbClient::new(reqwest::Client::new(), base, "test-key")
    }

    #[tokio::test]
    async fn lookup_title_sends_title_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("t", "Iron Man"))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"Title":"Iron Man","Year":"2008","imdbID":"tt0371746","Response":"True"}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).lookup_title("Iron Man").await.unwrap();
        assert!(record.found);
        assert_eq!(record.imdb_id, "tt0371746");
    }

    #[tokio::test]
    async fn not_found_title_is_returned_with_flag_unset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("t", "Avatar 3"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"Response":"False","Error":"Movie not found!"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let record = client_for(&server).lookup_title("Avatar 3").await.unwrap();
        assert!(!record.found);
    }

    #[tokio::test]
    async fn server_error_and_garbage_are_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt0000001"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("i", "tt0000002"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.lookup_id("tt0000001").await.is_none());
        assert!(client.lookup_id("tt0000002").await.is_none());
    }

    #[tokio::test]
    async fn search_page_sends_page_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("s", "RRR"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"Search":[{"Title":"RRR","Year":"2022","imdbID":"tt8178634","Type":"movie","Poster":"N/A"}],"totalResults":"21","Response":"True"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let page = client_for(&server).search_page("RRR", 3).await.unwrap();
        assert!(page.found);
        assert_eq!(page.total_results.as_deref(), Some("21"));
    }

    #[tokio::test]
    async fn unreachable_host_is_absent() {
        let base = reqwest::Url::parse("http://127.0.0.1:9/").unwrap();
        let client = OmdbClient::new(reqwest::Client::new(), base, "k");
        assert!(client.search_page("anything", 1).await.is_none());
    }
}
