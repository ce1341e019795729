//! Feed fetching, parsing and persistence settings (`[reader]` section).

use serde::Deserialize;

use crate::store::bookmarks::DEFAULT_BOOKMARK_CAP;

pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/raw?url=";
pub const DEFAULT_SHARE_INTENT_URL: &str = "https://twitter.com/intent/tweet?text=";

/// When bare domains get `https://` prepended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlNormalization {
    /// Normalize before the URL is stored.
    OnAdd,
    /// Store what the user typed, normalize right before fetching.
    OnFetch,
    /// Never rewrite URLs.
    Off,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Prefix the percent-encoded feed URL is appended to. Empty fetches
    /// feeds directly.
    pub proxy_url: String,
    pub timeout_secs: u64,
    /// Articles shown per feed.
    pub item_limit: usize,
    /// Characters kept from each description before "…".
    pub description_limit: usize,
    /// chrono strftime pattern for publish dates.
    pub date_format: String,
    pub url_normalization: UrlNormalization,
    pub validate_urls: bool,
    pub protect_default_feeds: bool,
    /// Oldest bookmarks past this count are dropped. 0 keeps everything.
    pub bookmark_cap: usize,
    pub share_intent_url: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            timeout_secs: 15,
            item_limit: 12,
            description_limit: 220,
            date_format: "%-m/%-d/%Y".to_string(),
            url_normalization: UrlNormalization::OnAdd,
            validate_urls: true,
            protect_default_feeds: false,
            bookmark_cap: DEFAULT_BOOKMARK_CAP,
            share_intent_url: DEFAULT_SHARE_INTENT_URL.to_string(),
        }
    }
}
