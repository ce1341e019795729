use serde::{Deserialize, Serialize};

pub const NO_TITLE: &str = "No title";
pub const NO_LINK: &str = "#";

/// One normalized story extracted from a feed response.
///
/// Built once per fetch and never mutated. Missing dates and thumbnails are
/// empty strings, a missing link is `"#"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: String,
    pub thumbnail_url: String,
}

impl Default for ArticleRecord {
    fn default() -> Self {
        Self {
            title: NO_TITLE.to_string(),
            link: NO_LINK.to_string(),
            description: String::new(),
            published_at: String::new(),
            thumbnail_url: String::new(),
        }
    }
}

impl ArticleRecord {
    pub fn has_link(&self) -> bool {
        !self.link.is_empty() && self.link != NO_LINK
    }

    /// Case-insensitive match against title and description.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}
