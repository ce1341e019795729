use crate::domain::{ArticleRecord, Bookmark};
use crate::fetcher::search::SearchHit;
use crate::normalizer::text::truncate;
use crate::store::{BookmarkOutcome, BookmarkStore};

pub const SAVED: &str = "Saved to bookmarks";
pub const ALREADY_SAVED: &str = "Already bookmarked";
pub const NOTHING_TO_SAVE: &str = "This article has no link to bookmark";

/// Characters of description shown in bookmark rows.
const BOOKMARK_PREVIEW: usize = 120;

/// Everything needed to draw one article, whether it came from a live feed,
/// a search or the bookmark list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCard {
    pub title: String,
    pub link: String,
    pub description: String,
    pub date: String,
    pub thumbnail: Option<String>,
    /// Feed name, set for search results.
    pub source: Option<String>,
}

impl ArticleCard {
    pub fn from_record(record: &ArticleRecord) -> Self {
        Self {
            title: record.title.clone(),
            link: record.link.clone(),
            description: record.description.clone(),
            date: record.published_at.clone(),
            thumbnail: Some(record.thumbnail_url.clone()).filter(|t| !t.is_empty()),
            source: None,
        }
    }

    pub fn from_hit(hit: &SearchHit) -> Self {
        Self {
            source: Some(hit.feed_name.clone()),
            ..Self::from_record(&hit.article)
        }
    }

    pub fn from_bookmark(bookmark: &Bookmark) -> Self {
        Self {
            title: bookmark.title.clone(),
            link: bookmark.link.clone(),
            description: truncate(&bookmark.desc, BOOKMARK_PREVIEW),
            date: bookmark.date.clone().unwrap_or_default(),
            thumbnail: bookmark.thumb.clone(),
            source: None,
        }
    }

    pub fn has_link(&self) -> bool {
        self.to_record().has_link()
    }

    /// One line for list rows: date column, then title, then source.
    pub fn summary(&self) -> String {
        let mut line = if self.date.is_empty() {
            self.title.clone()
        } else {
            format!("{:<10} {}", self.date, self.title)
        };
        if let Some(source) = &self.source {
            line.push_str(&format!("  [{}]", source));
        }
        line
    }

    pub fn to_record(&self) -> ArticleRecord {
        ArticleRecord {
            title: self.title.clone(),
            link: self.link.clone(),
            description: self.description.clone(),
            published_at: self.date.clone(),
            thumbnail_url: self.thumbnail.clone().unwrap_or_default(),
        }
    }

    pub fn bookmark(&self, store: &mut BookmarkStore) -> BookmarkOutcome {
        store.add(&self.to_record())
    }
}

pub fn bookmark_message(outcome: BookmarkOutcome) -> &'static str {
    match outcome {
        BookmarkOutcome::Added => SAVED,
        BookmarkOutcome::AlreadyExists => ALREADY_SAVED,
        BookmarkOutcome::NoLink => NOTHING_TO_SAVE,
    }
}
