use std::sync::Arc;

use crate::domain::{ArticleRecord, Bookmark};
use crate::store::{KeyValueStore, BOOKMARKS_KEY};

pub const DEFAULT_BOOKMARK_CAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkOutcome {
    Added,
    AlreadyExists,
    /// The article has no link to key the bookmark on; nothing was saved.
    NoLink,
}

/// Saved articles, newest first, at most one per link.
pub struct BookmarkStore {
    kv: Arc<dyn KeyValueStore + Send + Sync>,
    bookmarks: Vec<Bookmark>,
    /// Zero means unlimited.
    cap: usize,
}

impl BookmarkStore {
    pub fn load(kv: Arc<dyn KeyValueStore + Send + Sync>, cap: usize) -> Self {
        let bookmarks = match kv.get(BOOKMARKS_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<Bookmark>>(&raw).unwrap_or_else(|e| {
                tracing::warn!("Stored bookmarks are unreadable, starting empty: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read bookmarks: {}", e);
                Vec::new()
            }
        };

        tracing::debug!("Loaded {} bookmarks", bookmarks.len());
        Self { kv, bookmarks, cap }
    }

    pub fn list(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bookmark> {
        self.bookmarks.get(index)
    }

    pub fn contains(&self, link: &str) -> bool {
        self.bookmarks.iter().any(|b| b.link == link)
    }

    pub fn add(&mut self, article: &ArticleRecord) -> BookmarkOutcome {
        if !article.has_link() {
            tracing::debug!("Not bookmarking link-less article {:?}", article.title);
            return BookmarkOutcome::NoLink;
        }
        if self.contains(&article.link) {
            return BookmarkOutcome::AlreadyExists;
        }

        self.bookmarks.insert(0, Bookmark::from(article));
        if self.cap > 0 && self.bookmarks.len() > self.cap {
            let evicted = self.bookmarks.len() - self.cap;
            self.bookmarks.truncate(self.cap);
            tracing::debug!("Evicted {} oldest bookmarks", evicted);
        }

        tracing::info!("Bookmarked {}", article.link);
        self.persist();
        BookmarkOutcome::Added
    }

    pub fn remove(&mut self, index: usize) -> Option<Bookmark> {
        if index >= self.bookmarks.len() {
            return None;
        }

        let removed = self.bookmarks.remove(index);
        tracing::info!("Removed bookmark {}", removed.link);
        self.persist();
        Some(removed)
    }

    fn persist(&self) {
        match serde_json::to_string(&self.bookmarks) {
            Ok(json) => {
                if let Err(e) = self.kv.set(BOOKMARKS_KEY, &json) {
                    tracing::warn!("Failed to persist bookmarks: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize bookmarks: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn article(link: &str) -> ArticleRecord {
        ArticleRecord {
            title: format!("Title for {}", link),
            link: link.to_string(),
            description: "desc".into(),
            ..Default::default()
        }
    }

    fn memory() -> Arc<dyn KeyValueStore + Send + Sync> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_link_less_articles_are_refused() {
        let mut store = BookmarkStore::load(memory(), DEFAULT_BOOKMARK_CAP);
        let first = ArticleRecord {
            title: "First".into(),
            ..Default::default()
        };
        let second = ArticleRecord {
            title: "Second".into(),
            link: String::new(),
            ..Default::default()
        };

        assert_eq!(store.add(&first), BookmarkOutcome::NoLink);
        assert_eq!(store.add(&second), BookmarkOutcome::NoLink);
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_twice_same_link() {
        let mut store = BookmarkStore::load(memory(), DEFAULT_BOOKMARK_CAP);
        assert_eq!(store.add(&article("http://x/1")), BookmarkOutcome::Added);
        assert_eq!(
            store.add(&article("http://x/1")),
            BookmarkOutcome::AlreadyExists
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_newest_first() {
        let mut store = BookmarkStore::load(memory(), DEFAULT_BOOKMARK_CAP);
        store.add(&article("http://x/1"));
        store.add(&article("http://x/2"));
        let links: Vec<&str> = store.list().iter().map(|b| b.link.as_str()).collect();
        assert_eq!(links, vec!["http://x/2", "http://x/1"]);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut store = BookmarkStore::load(memory(), 2);
        store.add(&article("http://x/1"));
        store.add(&article("http://x/2"));
        store.add(&article("http://x/3"));

        let links: Vec<&str> = store.list().iter().map(|b| b.link.as_str()).collect();
        assert_eq!(links, vec!["http://x/3", "http://x/2"]);
    }

    #[test]
    fn test_zero_cap_is_unlimited() {
        let mut store = BookmarkStore::load(memory(), 0);
        for i in 0..5 {
            store.add(&article(&format!("http://x/{}", i)));
        }
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_remove_and_reload() {
        let kv = memory();
        let mut store = BookmarkStore::load(kv.clone(), DEFAULT_BOOKMARK_CAP);
        store.add(&article("http://x/1"));
        store.add(&article("http://x/2"));

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.link, "http://x/2");
        assert!(store.remove(5).is_none());

        let reloaded = BookmarkStore::load(kv, DEFAULT_BOOKMARK_CAP);
        assert_eq!(reloaded.list(), store.list());
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_garbage_loads_empty() {
        let kv = memory();
        kv.set(BOOKMARKS_KEY, "oops").unwrap();
        let store = BookmarkStore::load(kv, DEFAULT_BOOKMARK_CAP);
        assert!(store.is_empty());
    }
}
