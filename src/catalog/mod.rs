use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use crate::omdb::{MovieRecord, MovieSource};
use crate::page::{Container, RenderTarget, SharedPage, GENRE_TARGET};
use crate::render::{self, CardRenderer};

/// A named, fixed list of titles and the container it renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TitleList {
    pub name: &'static str,
    pub target: &'static str,
    pub heading: &'static str,
    pub titles: &'static [&'static str],
}

pub const UPCOMING: TitleList = TitleList {
    name: "upcoming",
    target: "upcomingGrid",
    heading: "Upcoming Movies",
    titles: &[
        "Mufasa: The Lion King",
        "Captain America: Brave New World",
        "The Fantastic Four: First Steps",
        "Thunderbolts*",
        "Superman",
        "Avatar 3",
        "Blade",
        "Tron: Ares",
        "Mission: Impossible 8",
    ],
};

pub const MARVEL: TitleList = TitleList {
    name: "marvel",
    target: "marvelGrid",
    heading: "Marvel Universe",
    titles: &[
        "Avengers: Endgame",
        "Iron Man",
        "Thor: Ragnarok",
        "Black Panther",
        "Doctor Strange",
        "Guardians of the Galaxy",
        "Captain America: Civil War",
        "Spider-Man: No Way Home",
        "Avengers: Infinity War",
        "Black Widow",
        "Eternals",
        "Shang-Chi",
        "Ant-Man",
        "Deadpool",
    ],
};

pub const BOLLYWOOD: TitleList = TitleList {
    name: "bollywood",
    target: "bollywoodGrid",
    heading: "Bollywood Hits",
    titles: &[
        "3 Idiots",
        "Dangal",
        "RRR",
        "Jawan",
        "Pathaan",
        "PK",
        "Bajrangi Bhaijaan",
        "Sholay",
        "Lagaan",
        "Dilwale Dulhania Le Jayenge",
        "Gully Boy",
        "Queen",
        "Drishyam",
        "KGF Chapter 2",
    ],
};

pub const YEAR_2024: TitleList = TitleList {
    name: "year2024",
    target: "year2024Grid",
    heading: "Best of 2024",
    titles: &[
        "Dune: Part Two",
        "Civil War",
        "Godzilla x Kong",
        "Kung Fu Panda 4",
        "The Fall Guy",
        "Kingdom of the Planet of the Apes",
        "Furiosa: A Mad Max Saga",
        "Challengers",
        "Inside Out 2",
        "Bad Boys: Ride or Die",
        "A Quiet Place: Day One",
        "Deadpool & Wolverine",
    ],
};

pub const ACTION: TitleList = TitleList {
    name: "action",
    target: "actionGrid",
    heading: "Action Classics",
    titles: &[
        "The Dark Knight",
        "Gladiator",
        "Mad Max: Fury Road",
        "John Wick",
        "Die Hard",
        "Terminator 2",
        "The Matrix",
        "Inception",
        "Top Gun: Maverick",
        "Mission: Impossible - Fallout",
        "Logan",
        "Casino Royale",
        "Speed",
        "The Bourne Identity",
    ],
};

/// Page order of the curated sections.
pub static LISTS: [TitleList; 5] = [UPCOMING, MARVEL, BOLLYWOOD, YEAR_2024, ACTION];

pub fn find_list(name: &str) -> Option<&'static TitleList> {
    let name = name.trim();
    LISTS.iter().find(|l| l.name.eq_ignore_ascii_case(name))
}

pub fn list_names() -> Vec<&'static str> {
    LISTS.iter().map(|l| l.name).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: &'static str,
    pub icon: &'static str,
}

pub static GENRES: [Genre; 8] = [
    Genre { id: 28, name: "Action", icon: "fa-fire" },
    Genre { id: 12, name: "Adventure", icon: "fa-compass" },
    Genre { id: 16, name: "Animation", icon: "fa-dragon" },
    Genre { id: 35, name: "Comedy", icon: "fa-laugh-beam" },
    Genre { id: 80, name: "Crime", icon: "fa-mask" },
    Genre { id: 18, name: "Drama", icon: "fa-masks-theater" },
    Genre { id: 10751, name: "Family", icon: "fa-users" },
    Genre { id: 14, name: "Fantasy", icon: "fa-wand-magic-sparkles" },
];

pub fn find_genre(name: &str) -> Option<&'static Genre> {
    let name = name.trim();
    GENRES.iter().find(|g| g.name.eq_ignore_ascii_case(name))
}

/// Looks every title up concurrently and keeps the ones OMDb found, in list
/// order. A failed lookup drops out without affecting the others.
pub async fn fetch_catalog<T: AsRef<str>>(
    source: &dyn MovieSource,
    titles: &[T],
) -> Vec<MovieRecord> {
    let lookups = titles.iter().map(|t| source.lookup_title(t.as_ref()));
    join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .filter(|m| m.found)
        .collect()
}

pub async fn render_catalog<T, R>(
    source: &dyn MovieSource,
    titles: &[T],
    target: &R,
    renderer: &CardRenderer,
) -> Vec<MovieRecord>
where
    T: AsRef<str>,
    R: RenderTarget + ?Sized,
{
    target.replace(render::loading()).await;
    let movies = fetch_catalog(source, titles).await;
    info!(
        target_id = target.id(),
        requested = titles.len(),
        found = movies.len(),
        "catalog rendered"
    );
    target.replace(renderer.render(&movies)).await;
    movies
}

/// Start-up sequence of the page: the genre strip, then every curated list
/// loaded in parallel into its own container. Returns what each list
/// rendered, in page order.
pub async fn render_home(
    source: Arc<dyn MovieSource>,
    page: SharedPage,
    renderer: &CardRenderer,
) -> Vec<(&'static TitleList, Vec<MovieRecord>)> {
    Container::new(page.clone(), GENRE_TARGET)
        .replace(render::render_genres(&GENRES))
        .await;

    let sections = LISTS.iter().map(|list| {
        let source = Arc::clone(&source);
        let container = Container::new(page.clone(), list.target);
        async move {
            let movies = render_catalog(source.as_ref(), list.titles, &container, renderer).await;
            (list, movies)
        }
    });
    join_all(sections).await
}
