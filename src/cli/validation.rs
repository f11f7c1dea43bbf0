use crate::cli::args::{CliArgs, Command};
use crate::dispatch::NavCategory;
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.output_format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected text, json or html"))?;
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(pages) = args.search_pages {
        if pages == 0 || pages > 100 {
            return Err("invalid pages, expected 1 to 100".to_string());
        }
    }
    if let Some(min) = args.min_query_len {
        if min == 0 {
            return Err("invalid min-query-len, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.base_url.as_deref() {
        crate::runner::parse_base_url(raw).map_err(|e| e.to_string())?;
    }
    match &args.command {
        Command::Nav { category } if NavCategory::parse(category).is_none() => Err(format!(
            "invalid nav category '{category}', expected home, movies, series or mylist"
        )),
        Command::Catalog { list } if crate::catalog::find_list(list).is_none() => Err(format!(
            "unknown list '{list}', expected one of: {}",
            crate::catalog::list_names().join(", ")
        )),
        Command::Search { query } if query.join(" ").trim().is_empty() => {
            Err("search query is empty".to_string())
        }
        Command::Genre { name } if name.trim().is_empty() => {
            Err("genre name is empty".to_string())
        }
        _ => Ok(()),
    }
}
