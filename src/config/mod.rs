//! Configuration for the Tributary client.
//!
//! Read from `~/.config/tributary/config.toml`. A commented default file is
//! written the first time the client runs. Missing keys fall back to defaults.

pub mod keybindings;

pub use keybindings::{KeyAction, KeybindingConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::filter::{FilterSpec, SearchTarget, StatusFilter};
use crate::pagination::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub view: ViewConfig,
    pub keybindings: KeybindingConfig,
}

/// Where the Miniflux server lives and how to authenticate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub page_size: u64,
    pub search_target: SearchTarget,
    pub status: StatusFilter,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_target: SearchTarget::Title,
            status: StatusFilter::All,
        }
    }
}

impl ViewConfig {
    /// Filter the view starts with; no search text.
    pub fn filter(&self) -> FilterSpec {
        FilterSpec::new(self.search_target, self.status, "")
    }
}

impl Config {
    /// Load from the default path, creating a commented default file if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `~/.config/tributary/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tributary").join("config.toml"))
    }

    /// Command-line values win over the file.
    pub fn with_overrides(mut self, url: Option<String>, token: Option<String>) -> Self {
        if url.is_some() {
            self.server.url = url;
        }
        if token.is_some() {
            self.server.token = token;
        }
        self
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ConfigError::Io { path, source }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(path, Self::default_config_content()).map_err(io_error(path))
    }

    fn default_config_content() -> &'static str {
        r##"# Tributary configuration
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, Backspace, Delete, Home, End, PageUp, PageDown,
#   Up, Down, Left, Right, Esc, Space
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[server]
# Base URL of the Miniflux instance
# url = "https://reader.example.com"

# API token (Settings > API Keys)
# token = ""

# Request timeout in seconds
timeout_secs = 10

[view]
# Entries requested per page
page_size = 100

# Field the search text is matched against: "title" or "content"
search_target = "title"

# Entries shown: "all" or "unread"
status = "all"

[keybindings]
escape = ["Esc"]
previous = ["Left"]
next = ["Right"]
toggle_read = ["m"]
toggle_star = ["s"]
quit = ["q", "Ctrl+c"]
"##
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
