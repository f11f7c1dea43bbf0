pub mod report;

use serde::Serialize;

use crate::render::CardRenderer;
use crate::runner::RunReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// One rendered card, flattened for text and JSON output.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OutputRecord {
    pub section: String,
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub rating: String,
    pub genre: String,
    pub poster: String,
    pub url: String,
}

pub fn build_records(report: &RunReport, renderer: &CardRenderer) -> Vec<OutputRecord> {
    report
        .sections
        .iter()
        .flat_map(|section| {
            section.movies.iter().map(move |m| OutputRecord {
                section: section.target.clone(),
                imdb_id: m.imdb_id.clone(),
                title: m.title.clone(),
                year: m.year_text().to_string(),
                rating: m.rating_text().to_string(),
                genre: m.genre_text().to_string(),
                poster: renderer.poster_src(m).to_string(),
                url: renderer.detail_url(&m.imdb_id),
            })
        })
        .collect()
}

pub fn render_text(records: &[OutputRecord]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            r.section, r.year, r.rating, r.title, r.url
        ));
    }
    out.into_bytes()
}

pub fn render_json(records: &[OutputRecord]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::SearchState;
    use crate::omdb::fake::movie;
    use crate::runner::SectionResult;
    use tokio::time::Instant;

    fn report() -> RunReport {
        let mut blade = movie("tt2", "Blade", "2025", "N/A");
        blade.poster = None;
        RunReport {
            started_at: Instant::now(),
            elapsed: Default::default(),
            action: "catalog upcoming".to_string(),
            state: SearchState::Idle,
            sections: vec![SectionResult {
                target: "upcomingGrid".to_string(),
                heading: "Upcoming Movies".to_string(),
                movies: vec![movie("tt1", "Superman", "2025", "7.4"), blade],
            }],
            notice: None,
        }
    }

    #[test]
    fn formats_parse_and_infer() {
        assert_eq!(OutputFormat::parse(" HTML "), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert_eq!(infer_format_from_path("out/Home.HTM"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("cards.json"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("cards"), None);
    }

    #[test]
    fn records_carry_card_fields() {
        let records = build_records(&report(), &CardRenderer::default());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://www.imdb.com/title/tt1");
        assert_eq!(records[1].rating, "N/A");
        assert_eq!(records[1].poster, crate::render::NO_IMAGE_PLACEHOLDER);
    }

    #[test]
    fn text_is_one_line_per_record() {
        let records = build_records(&report(), &CardRenderer::default());
        let text = String::from_utf8(render_text(&records)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "upcomingGrid\t2025\t7.4\tSuperman\thttps://www.imdb.com/title/tt1"
        );
    }

    #[test]
    fn json_is_an_array_of_records() {
        let records = build_records(&report(), &CardRenderer::default());
        let value: serde_json::Value = serde_json::from_slice(&render_json(&records)).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[0]["imdb_id"], "tt1");
    }
}
