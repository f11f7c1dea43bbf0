use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

pub const API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(alias = "apikey")]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<usize>,
    pub proxy: Option<String>,
    pub debounce_ms: Option<u64>,
    pub min_query_len: Option<usize>,
    pub search_pages: Option<u32>,
    pub placeholder_poster: Option<String>,
    pub detail_url_base: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    pub guard_stale_results: Option<bool>,
}

const CONFIG_DIR: &str = ".cinegrid";
const CONFIG_FILE: &str = "config.yml";

// blank variables count as unset
fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .find_map(|var| env::var_os(var).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
}

/// `~/.cinegrid/config.yml`, when a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Resolves a leading `~` (alone or followed by a separator) against the
/// home directory. Anything else, including `~user`, is returned as is.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) => match rest.strip_prefix(['/', '\\']) {
            Some(rest) => rest,
            None => return PathBuf::from(path),
        },
        None => return PathBuf::from(path),
    };
    match home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// API key from the environment, ignoring blank values.
pub fn env_api_key() -> Option<String> {
    env::var(API_KEY_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_config(contents: &str, path: &Path) -> Result<ConfigFile, String> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
        .map_err(|e| format!("failed to parse config '{}': {e}", path.display()))
}

/// Reads and parses `path`. A missing file yields the all-unset config when
/// `allow_missing` is set (the default location), and is an error otherwise
/// (an explicit `--config`).
pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() != ErrorKind::NotFound => {
            return Err(format!("failed to read config '{}': {e}", path.display()));
        }
        Err(_) if allow_missing => return Ok(ConfigFile::default()),
        Err(_) => return Err(format!("config file not found '{}'", path.display())),
    };
    parse_config(&contents, path)
}

pub fn default_config_yaml() -> String {
    r#"# cinegrid config
#
# Location (default):
#   ~/.cinegrid/config.yml

# OMDb access. The key can also come from OMDB_API_KEY.
# api_key: your-key
base_url: http://www.omdbapi.com/
timeout: 10
# proxy: http://127.0.0.1:8080

# Search
debounce_ms: 500
min_query_len: 3
search_pages: 5
guard_stale_results: false

# Cards
placeholder_poster: https://via.placeholder.com/300x450?text=No+Image
detail_url_base: https://www.imdb.com/title/

# Output (optional)
# output: ./cinegrid.html
# output_format: html

# Output styling
no_color: false
"#
    .to_string()
}

/// Writes the default config unless something is already there. Returns
/// whether a file was created.
pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "failed to create config directory '{}': {e}",
                parent.display()
            )
        })?;
    }
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
