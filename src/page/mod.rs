use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::catalog::{TitleList, LISTS};
use crate::render::Fragment;

pub const SEARCH_RESULTS_TARGET: &str = "searchResultsGrid";
pub const GENRE_TARGET: &str = "genreList";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    /// The genre strip.
    Category,
    /// One of the curated title lists.
    Catalog,
    SearchResults,
}

#[derive(Clone, Debug)]
pub struct Section {
    pub target: String,
    pub heading: String,
    pub kind: SectionKind,
    pub visible: bool,
    pub content: Fragment,
}

/// The page state: containers addressed by id, their visibility, and the
/// value of the search input.
#[derive(Clone, Debug, Default)]
pub struct Page {
    sections: Vec<Section>,
    search_input: String,
}

pub type SharedPage = Arc<Mutex<Page>>;

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default layout: the search results section (hidden), the genre
    /// strip, then one section per curated list.
    pub fn home() -> Self {
        let mut page = Self::new();
        page.add_section(
            SEARCH_RESULTS_TARGET,
            "Search Results",
            SectionKind::SearchResults,
        );
        page.add_section(GENRE_TARGET, "Browse by Genre", SectionKind::Category);
        for list in LISTS.iter() {
            page.add_list(list);
        }
        page.show_defaults();
        page
    }

    pub fn shared(self) -> SharedPage {
        Arc::new(Mutex::new(self))
    }

    pub fn add_section(&mut self, target: &str, heading: &str, kind: SectionKind) {
        if self.section(target).is_some() {
            return;
        }
        self.sections.push(Section {
            target: target.to_string(),
            heading: heading.to_string(),
            kind,
            visible: kind != SectionKind::SearchResults,
            content: Fragment::default(),
        });
    }

    pub fn add_list(&mut self, list: &TitleList) {
        self.add_section(list.target, list.heading, SectionKind::Catalog);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, target: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.target == target)
    }

    pub fn content(&self, target: &str) -> Option<&Fragment> {
        self.section(target).map(|s| &s.content)
    }

    /// Full replace of a container's content. Unknown targets are ignored and
    /// reported as `false`.
    pub fn replace(&mut self, target: &str, fragment: Fragment) -> bool {
        match self.sections.iter_mut().find(|s| s.target == target) {
            Some(section) => {
                section.content = fragment;
                true
            }
            None => false,
        }
    }

    pub fn is_visible(&self, target: &str) -> bool {
        self.section(target).map(|s| s.visible).unwrap_or(false)
    }

    pub fn search_visible(&self) -> bool {
        self.sections
            .iter()
            .any(|s| s.kind == SectionKind::SearchResults && s.visible)
    }

    pub fn defaults_visible(&self) -> bool {
        self.sections
            .iter()
            .filter(|s| s.kind != SectionKind::SearchResults)
            .all(|s| s.visible)
    }

    pub fn show_defaults(&mut self) {
        for section in self.sections.iter_mut() {
            section.visible = section.kind != SectionKind::SearchResults;
        }
    }

    pub fn show_search(&mut self) {
        for section in self.sections.iter_mut() {
            section.visible = section.kind == SectionKind::SearchResults;
        }
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn set_search_input(&mut self, value: &str) {
        self.search_input = value.to_string();
    }
}

/// Something that accepts a full-replace markup fragment.
#[async_trait]
pub trait RenderTarget: Send + Sync {
    fn id(&self) -> &str;

    async fn replace(&self, fragment: Fragment);
}

/// Handle to one container of a shared page.
#[derive(Clone, Debug)]
pub struct Container {
    page: SharedPage,
    target: String,
}

impl Container {
    pub fn new(page: SharedPage, target: impl Into<String>) -> Self {
        Self {
            page,
            target: target.into(),
        }
    }
}

#[async_trait]
impl RenderTarget for Container {
    fn id(&self) -> &str {
        &self.target
    }

    async fn replace(&self, fragment: Fragment) {
        let mut page = self.page.lock().await;
        if !page.replace(&self.target, fragment) {
            tracing::warn!(target_id = %self.target, "render target not found on page");
        }
    }
}
