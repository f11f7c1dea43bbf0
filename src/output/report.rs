use crate::page::{Page, SectionKind};
use crate::render::escape_html;

use super::OutputRecord;

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn render_section(out: &mut String, page: &Page, index: usize) {
    let section = &page.sections()[index];
    let class = match section.kind {
        SectionKind::Category => "genre-section",
        SectionKind::Catalog => "catalog-section",
        SectionKind::SearchResults => "search-section",
    };
    let grid = match section.kind {
        SectionKind::Category => "genre-grid",
        _ => "movie-grid",
    };
    let hidden = if section.visible {
        ""
    } else {
        r#" style="display:none""#
    };
    out.push_str(&format!(
        "    <section id=\"{id}-section\" class=\"{class}\"{hidden}>\n      <h2 class=\"section-title\">{heading}</h2>\n      <div id=\"{id}\" class=\"{grid}\">{content}</div>\n    </section>\n",
        id = escape_html(&section.target),
        heading = escape_html(&section.heading),
        content = section.content,
    ));
}

/// The page as a standalone HTML document. Section contents are emitted as
/// rendered; everything else is escaped here.
pub fn render_document(page: &Page, records: &[OutputRecord]) -> Vec<u8> {
    let json = serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string());
    let json = json_for_script_tag(&json);

    let mut sections = String::new();
    for index in 0..page.sections().len() {
        render_section(&mut sections, page, index);
    }

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>cinegrid</title>
  <link href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css" rel="stylesheet"/>
  <style>
    body {{ background: #0f0f14; color: #f1f1f1; font-family: 'Inter', sans-serif; margin: 0; }}
    header {{ display: flex; gap: 1rem; align-items: center; padding: 1rem 2rem; }}
    header input {{ flex: 1; max-width: 28rem; padding: 0.5rem 0.75rem; border-radius: 0.5rem; border: 0; }}
    main {{ padding: 0 2rem 2rem; }}
    .section-title {{ font-size: 1.25rem; margin: 1.5rem 0 0.75rem; }}
    .movie-grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 1rem; }}
    .genre-grid {{ display: flex; flex-wrap: wrap; gap: 0.75rem; }}
    .genre-card {{ background: #1c1c24; border-radius: 0.75rem; padding: 0.75rem 1rem; text-align: center; }}
    .movie-card {{ background: #1c1c24; border-radius: 0.75rem; overflow: hidden; color: inherit; text-decoration: none; }}
    .poster-container img {{ width: 100%; aspect-ratio: 2 / 3; object-fit: cover; display: block; }}
    .movie-info {{ padding: 0.75rem; }}
    .movie-title {{ font-size: 1rem; margin: 0; }}
    .movie-genre, .movie-desc {{ color: #a1a1aa; font-size: 0.8rem; }}
    .movie-meta-row {{ display: flex; justify-content: space-between; font-size: 0.85rem; }}
    .rating i {{ color: #facc15; }}
    .loading, .no-results {{ color: #a1a1aa; padding: 1rem 0; }}
  </style>
</head>
<body>
  <header>
    <h1>cinegrid</h1>
    <input type="text" id="searchInput" placeholder="Search movies..." value="{input}"/>
  </header>
  <main>
{sections}  </main>
  <script type="application/json" id="cinegrid-data">{json}</script>
</body>
</html>
"####,
        input = escape_html(page.search_input()),
        sections = sections,
        json = json,
    );
    html.into_bytes()
}
