use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cinegrid",
    version,
    about = "movie catalog and search renderer backed by OMDb",
    long_about = "cinegrid renders curated movie lists and debounced OMDb searches into a card grid.\n\nExamples:\n  cinegrid page -o home.html\n  cinegrid catalog marvel\n  cinegrid search \"RRR\" --output-format json\n  cinegrid genre Comedy\n  cinegrid watch --debounce-ms 300\n\nTip: put your api_key in ~/.cinegrid/config.yml (cinegrid config --init) or export OMDB_API_KEY."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.cinegrid/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'k',
        long = "api-key",
        value_name = "KEY",
        global = true,
        help_heading = "OMDb",
        help = "OMDb API key (falls back to config, then OMDB_API_KEY)."
    )]
    pub api_key: Option<String>,

    #[arg(
        long = "base-url",
        value_name = "URL",
        global = true,
        help_heading = "OMDb",
        help = "OMDb endpoint (default: http://www.omdbapi.com/)."
    )]
    pub base_url: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "OMDb",
        help = "Request timeout in seconds (default: 10)."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'x',
        long = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "OMDb",
        help = "Route requests through a proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "debounce-ms",
        value_name = "MS",
        global = true,
        help_heading = "Search",
        help = "Quiet period before a typed query is searched (default: 500)."
    )]
    pub debounce_ms: Option<u64>,

    #[arg(
        long = "min-query-len",
        value_name = "N",
        global = true,
        help_heading = "Search",
        help = "Characters needed before a typed query hits the network (default: 3)."
    )]
    pub min_query_len: Option<usize>,

    #[arg(
        long = "pages",
        value_name = "N",
        global = true,
        help_heading = "Search",
        help = "Result pages fetched per query (default: 5)."
    )]
    pub search_pages: Option<u32>,

    #[arg(
        long = "guard-stale",
        global = true,
        help_heading = "Search",
        help = "Drop search results that finish after a newer search was fired."
    )]
    pub guard_stale: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        global = true,
        help_heading = "Output",
        help = "Write output to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "output-format",
        value_name = "FORMAT",
        global = true,
        help_heading = "Output",
        help = "text, json or html (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Render the genre strip and every curated list.
    Page,
    /// Render one curated list.
    Catalog {
        #[arg(value_name = "LIST", help = "upcoming, marvel, bollywood, year2024 or action.")]
        list: String,
    },
    /// Type a query once and wait for the debounced search.
    Search {
        #[arg(value_name = "QUERY", num_args = 1.., help = "Query text; words are joined with spaces.")]
        query: Vec<String>,
    },
    /// Activate a genre card.
    Genre {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Trigger a navigation action.
    Nav {
        #[arg(value_name = "CATEGORY", help = "home, movies, series or mylist.")]
        category: String,
    },
    /// Read input values from stdin, one per line (:genre, :nav, :quit).
    Watch,
    /// Manage the config file.
    Config {
        #[arg(long = "init", help = "Write the default config file if it does not exist.")]
        init: bool,
    },
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::Page => "page",
            Command::Catalog { .. } => "catalog",
            Command::Search { .. } => "search",
            Command::Genre { .. } => "genre",
            Command::Nav { .. } => "nav",
            Command::Watch => "watch",
            Command::Config { .. } => "config",
        }
    }
}
