//! Configuration loading for locanote.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::notes::LoadPolicy;
use crate::search::{DEFAULT_LIMIT, DEFAULT_MIN_RELEVANCE, SearchOptions};
use crate::storage::{DEFAULT_EXCLUDES, DEFAULT_EXTENSIONS, ScanFilter};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LOCANOTE_CONFIG";

/// Environment variable overriding the notes directory.
pub const DIR_ENV: &str = "LOCANOTE_DIR";

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Where notes live and which files count as notes.
#[derive(Debug, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_notes_dir")]
    pub dir: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
    /// Skip unreadable or malformed files instead of failing the load.
    #[serde(default)]
    pub skip_invalid: bool,
}

/// Defaults applied to searches that do not set their own limits.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,
}

fn default_notes_dir() -> String {
    "~/notes".to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(ToString::to_string).collect()
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_min_relevance() -> f64 {
    DEFAULT_MIN_RELEVANCE
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            dir: default_notes_dir(),
            extensions: default_extensions(),
            exclude: default_excludes(),
            skip_invalid: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_relevance: default_min_relevance(),
        }
    }
}

impl Config {
    /// Load config from `$LOCANOTE_CONFIG` or ~/.config/locanote/config.toml,
    /// falling back to defaults, then apply `$LOCANOTE_DIR`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::config_path);

        let mut config = match config_path {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Config::default(),
        };

        if let Some(dir) = std::env::var_os(DIR_ENV)
            && !dir.is_empty()
        {
            config.notes.dir = dir.to_string_lossy().into_owned();
        }

        Ok(config)
    }

    /// Load config from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "locanote").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The notes directory with `~` expanded.
    #[must_use]
    pub fn notes_dir(&self) -> PathBuf {
        expand_tilde(&self.notes.dir)
    }

    #[must_use]
    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter {
            extensions: self
                .notes
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude: self.notes.exclude.clone(),
        }
    }

    #[must_use]
    pub fn load_policy(&self) -> LoadPolicy {
        if self.notes.skip_invalid {
            LoadPolicy::SkipInvalid
        } else {
            LoadPolicy::Strict
        }
    }

    /// Search options built from the configured defaults.
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.search.limit,
            min_relevance: self.search.min_relevance,
            include_content: false,
        }
    }
}

/// Expand ~ to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}
