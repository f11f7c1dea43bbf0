use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel OMDb uses for missing poster, rating and other text fields.
pub const NOT_AVAILABLE: &str = "N/A";

// the detail record returned by a lookup-by-title or lookup-by-id request
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct MovieRecord {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "Genre", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "Plot", default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Poster", default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(rename = "Rated", default, skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(rename = "Runtime", default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Director", default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Actors", default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        rename = "Response",
        default,
        deserialize_with = "deserialize_response_flag",
        serialize_with = "serialize_response_flag"
    )]
    pub found: bool,
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MovieRecord {
    /// Poster URL, or `None` when OMDb has no image for the title.
    pub fn poster_url(&self) -> Option<&str> {
        self.poster
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != NOT_AVAILABLE)
    }

    pub fn rating_text(&self) -> &str {
        self.rating
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn year_text(&self) -> &str {
        self.year.as_deref().unwrap_or_default()
    }

    pub fn genre_text(&self) -> &str {
        self.genre.as_deref().unwrap_or_default()
    }

    pub fn plot_text(&self) -> &str {
        self.plot.as_deref().unwrap_or_default()
    }
}

// a single entry of a paginated keyword search
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SearchStub {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SearchPage {
    #[serde(
        rename = "Response",
        default,
        deserialize_with = "deserialize_response_flag",
        serialize_with = "serialize_response_flag"
    )]
    pub found: bool,
    #[serde(rename = "Search", default)]
    pub results: Option<Vec<SearchStub>>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl SearchPage {
    /// Stubs carried by a successful page; failed pages contribute nothing.
    pub fn into_stubs(self) -> Vec<SearchStub> {
        if !self.found {
            return Vec::new();
        }
        self.results.unwrap_or_default()
    }
}

// OMDb answers "True"/"False" as strings; a missing flag means not found.
fn deserialize_response_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Text(String),
        Bool(bool),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Text(value)) => value.trim().eq_ignore_ascii_case("true"),
        Some(Flag::Bool(value)) => value,
        None => false,
    })
}

fn serialize_response_flag<S>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *flag { "True" } else { "False" })
}
