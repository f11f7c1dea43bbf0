pub mod markup;

use crate::catalog::Genre;
use crate::omdb::MovieRecord;

pub use markup::{escape_html, Element, Fragment};

pub const NO_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/300x450?text=No+Image";
pub const DETAIL_URL_BASE: &str = "https://www.imdb.com/title/";

pub fn loading() -> Fragment {
    Element::new("div").class("loading").text("Loading...").into()
}

pub fn no_results() -> Fragment {
    Element::new("p")
        .class("no-results")
        .text("No movies found")
        .into()
}

pub fn finding(genre: &str) -> Fragment {
    Element::new("div")
        .class("loading")
        .text(format!("Finding {genre} movies..."))
        .into()
}

/// Turns movie records into cards. Holds the two URLs a card needs so they
/// can come from configuration.
#[derive(Clone, Debug)]
pub struct CardRenderer {
    placeholder_poster: String,
    detail_url_base: String,
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self {
            placeholder_poster: NO_IMAGE_PLACEHOLDER.to_string(),
            detail_url_base: DETAIL_URL_BASE.to_string(),
        }
    }
}

impl CardRenderer {
    pub fn new(placeholder_poster: impl Into<String>, detail_url_base: impl Into<String>) -> Self {
        Self {
            placeholder_poster: placeholder_poster.into(),
            detail_url_base: detail_url_base.into(),
        }
    }

    pub fn detail_url(&self, imdb_id: &str) -> String {
        format!("{}{}", self.detail_url_base, imdb_id)
    }

    pub fn poster_src<'a>(&'a self, movie: &'a MovieRecord) -> &'a str {
        movie.poster_url().unwrap_or(&self.placeholder_poster)
    }

    pub fn render(&self, movies: &[MovieRecord]) -> Fragment {
        if movies.is_empty() {
            return no_results();
        }
        let cards: Vec<Element> = movies.iter().map(|m| self.card(m)).collect();
        Fragment::from_elements(&cards)
    }

    fn card(&self, movie: &MovieRecord) -> Element {
        let poster = Element::new("div").class("poster-container").child(
            Element::new("img")
                .attr("src", self.poster_src(movie))
                .attr("alt", movie.title.as_str()),
        );

        let heading = Element::new("div")
            .child(
                Element::new("h3")
                    .class("movie-title")
                    .text(movie.title.as_str()),
            )
            .child(
                Element::new("p")
                    .class("movie-genre")
                    .text(movie.genre_text()),
            );

        let meta = Element::new("div")
            .class("movie-meta-row")
            .child(Element::new("span").text(movie.year_text()))
            .child(
                Element::new("span")
                    .class("rating")
                    .child(Element::new("i").class("fa-solid fa-star"))
                    .text(format!(" {}", movie.rating_text())),
            );

        let info = Element::new("div")
            .class("movie-info")
            .child(heading)
            .child(Element::new("p").class("movie-desc").text(movie.plot_text()))
            .child(meta);

        Element::new("a")
            .class("movie-card")
            .attr("href", self.detail_url(&movie.imdb_id))
            .attr("target", "_blank")
            .attr("rel", "noopener noreferrer")
            .child(poster)
            .child(info)
    }
}

pub fn render_cards(movies: &[MovieRecord]) -> Fragment {
    CardRenderer::default().render(movies)
}

pub fn render_genres(genres: &[Genre]) -> Fragment {
    let cards: Vec<Element> = genres
        .iter()
        .map(|genre| {
            Element::new("div")
                .class("genre-card")
                .attr("data-genre", genre.name)
                .attr("data-genre-id", genre.id.to_string())
                .child(Element::new("i").class(format!("fa-solid {}", genre.icon)))
                .child(Element::new("p").text(genre.name))
        })
        .collect();
    Fragment::from_elements(&cards)
}
