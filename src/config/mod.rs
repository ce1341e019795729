//! Configuration management for Newsroom.
//!
//! Configuration is read from `~/.config/newsroom/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;
pub mod reader;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;
pub use reader::{ReaderConfig, UrlNormalization};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
    pub reader: ReaderConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing the commented default file
    /// there first if nothing exists yet. Missing fields use defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the default config file path: `~/.config/newsroom/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("newsroom").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!("Wrote default config to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# Newsroom Configuration
#
# Colors can be named (Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
# DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
# LightCyan, White, Reset) or hex ("#RRGGBB" / "#RGB").
#
# Keys can be single characters ("a", "B", "/"), special keys (Enter, Tab,
# BackTab, Backspace, Delete, Home, End, PageUp, PageDown, Up, Down, Left,
# Right, Esc, Space, F1-F12) and may carry modifiers ("Ctrl+c", "Shift+Tab").

[reader]
# Feeds are fetched through this relay; the feed URL is percent-encoded and
# appended. Set to "" to fetch feeds directly.
proxy_url = "https://api.allorigins.win/raw?url="
timeout_secs = 15

# Articles shown per feed, and description length before it is cut with "…"
item_limit = 12
description_limit = 220

# strftime pattern used for publish dates
date_format = "%-m/%-d/%Y"

# When bare domains like "example.com/rss" get https:// prepended:
# "on_add" (stored normalized), "on_fetch" (stored as typed), or "off"
url_normalization = "on_add"
validate_urls = true

# Refuse to delete the built-in feeds
protect_default_feeds = false

# Oldest bookmarks beyond this count are dropped (0 = keep all)
bookmark_cap = 200

# Share opens this URL with "Check this out: <title> <link>" appended
share_intent_url = "https://twitter.com/intent/tweet?text="

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg_active = "Cyan"
selection_fg_active = "Black"
selection_bg_inactive = "DarkGray"
selection_fg_inactive = "White"
article_title = "White"
bookmarked = "Yellow"
metadata_date = "Yellow"
metadata_link = "Blue"
placeholder = "DarkGray"
error = "LightRed"
status_fg = "White"
status_bg = "DarkGray"
input_fg = "LightCyan"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
next_pane = ["Tab"]
prev_pane = ["BackTab", "Shift+Tab"]
select = ["Enter"]
open_in_browser = ["o"]
share = ["s"]
bookmark = ["b"]
toggle_bookmarks = ["B"]
add_feed = ["a"]
remove = ["d", "Delete"]
reset_feeds = ["X"]
filter_feeds = ["f"]
search = ["/"]
refresh = ["R"]
"##
    }
}

/// Configuration errors.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config = toml::from_str(Config::default_config_content())
            .expect("Default config should be valid TOML");

        assert_eq!(config.colors.active_border, ratatui::style::Color::Cyan);
        assert_eq!(config.keybindings.quit, vec!["q", "Ctrl+c"]);
        assert_eq!(config.reader.item_limit, 12);
        assert_eq!(config.reader.url_normalization, UrlNormalization::OnAdd);
        assert_eq!(config.reader.proxy_url, reader::DEFAULT_PROXY_URL);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[reader]
url_normalization = "on_fetch"
protect_default_feeds = true

[colors]
error = "#FF0000"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.reader.url_normalization, UrlNormalization::OnFetch);
        assert!(config.reader.protect_default_feeds);
        assert_eq!(config.reader.description_limit, 220);
        assert_eq!(config.colors.error, ratatui::style::Color::Rgb(255, 0, 0));
        assert_eq!(
            config.colors.inactive_border,
            ratatui::style::Color::DarkGray
        );
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.reader.bookmark_cap, 200);
        assert_eq!(config.keybindings.bookmark, vec!["b"]);
    }

    #[test]
    fn test_invalid_normalization_rejected() {
        let content = "[reader]\nurl_normalization = \"sometimes\"\n";
        assert!(toml::from_str::<Config>(content).is_err());
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.reader.item_limit, 12);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.reader.date_format, "%-m/%-d/%Y");
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[reader\nitem_limit = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
