use serde::{Deserialize, Serialize};

/// A named RSS/Atom endpoint the user subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        }
    }
}

const DEFAULT_FEEDS: &[(&str, &str)] = &[
    ("BBC World News", "https://feeds.bbci.co.uk/news/world/rss.xml"),
    ("ABC News (US)", "https://feeds.abcnews.com/abcnews/topstories"),
    ("Fox News", "https://feeds.foxnews.com/foxnews/latest"),
    ("TMZ Entertainment", "https://www.tmz.com/rss.xml"),
    ("Variety", "https://variety.com/feed/"),
    ("TechCrunch", "https://techcrunch.com/feed/"),
];

/// The built-in seed list, used on first run and by "reset".
pub fn default_feeds() -> Vec<FeedSource> {
    DEFAULT_FEEDS
        .iter()
        .map(|(name, url)| FeedSource::new(*name, *url))
        .collect()
}

pub fn default_feed_count() -> usize {
    DEFAULT_FEEDS.len()
}
