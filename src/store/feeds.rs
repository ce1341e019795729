use std::sync::Arc;

use url::Url;

use crate::app::ValidationError;
use crate::config::{ReaderConfig, UrlNormalization};
use crate::domain::{default_feed_count, default_feeds, FeedSource};
use crate::store::{KeyValueStore, FEEDS_KEY};

/// Knobs that differ between deployments: URL handling and whether the
/// seed feeds may be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedPolicy {
    pub validate_urls: bool,
    pub normalization: UrlNormalization,
    pub protect_defaults: bool,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            validate_urls: true,
            normalization: UrlNormalization::OnAdd,
            protect_defaults: false,
        }
    }
}

impl From<&ReaderConfig> for FeedPolicy {
    fn from(config: &ReaderConfig) -> Self {
        Self {
            validate_urls: config.validate_urls,
            normalization: config.url_normalization,
            protect_defaults: config.protect_default_feeds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Removed(FeedSource),
    OutOfRange,
    Protected,
}

/// Subscribed feed sources, persisted as one JSON array.
pub struct FeedStore {
    kv: Arc<dyn KeyValueStore + Send + Sync>,
    feeds: Vec<FeedSource>,
    policy: FeedPolicy,
}

impl FeedStore {
    /// Load the persisted list. Anything that is not a non-empty JSON array
    /// of sources falls back to the built-in defaults.
    pub fn load(kv: Arc<dyn KeyValueStore + Send + Sync>, policy: FeedPolicy) -> Self {
        let feeds = match kv.get(FEEDS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<FeedSource>>(&raw) {
                Ok(feeds) if !feeds.is_empty() => feeds,
                Ok(_) => default_feeds(),
                Err(e) => {
                    tracing::warn!("Stored feed list is unreadable, using defaults: {}", e);
                    default_feeds()
                }
            },
            Ok(None) => default_feeds(),
            Err(e) => {
                tracing::warn!("Failed to read feed list, using defaults: {}", e);
                default_feeds()
            }
        };

        tracing::debug!("Loaded {} feeds", feeds.len());
        Self { kv, feeds, policy }
    }

    pub fn policy(&self) -> FeedPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FeedSource> {
        self.feeds.get(index)
    }

    pub fn all(&self) -> &[FeedSource] {
        &self.feeds
    }

    /// Sources whose name contains `filter` (case-insensitive), paired with
    /// their position in the full list.
    pub fn iter_filtered<'a>(
        &'a self,
        filter: &str,
    ) -> impl Iterator<Item = (usize, &'a FeedSource)> + 'a {
        let needle = filter.trim().to_lowercase();
        self.feeds
            .iter()
            .enumerate()
            .filter(move |(_, f)| needle.is_empty() || f.name.to_lowercase().contains(&needle))
    }

    pub fn list(&self, filter: &str) -> Vec<FeedSource> {
        self.iter_filtered(filter).map(|(_, f)| f.clone()).collect()
    }

    pub fn add(&mut self, name: &str, url: &str) -> Result<(), ValidationError> {
        let url = url.trim();
        let normalized = self.check_url(url)?;

        let stored_url = match self.policy.normalization {
            UrlNormalization::OnAdd => normalized,
            UrlNormalization::OnFetch | UrlNormalization::Off => url.to_string(),
        };

        let name = name.trim();
        let name = if name.is_empty() { url } else { name };

        tracing::info!("Adding feed {} ({})", name, stored_url);
        self.feeds.push(FeedSource::new(name, stored_url));
        self.persist();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Removal {
        if index >= self.feeds.len() {
            return Removal::OutOfRange;
        }
        if self.policy.protect_defaults && index < default_feed_count() {
            tracing::debug!("Refusing to remove protected feed at {}", index);
            return Removal::Protected;
        }

        let removed = self.feeds.remove(index);
        tracing::info!("Removed feed {}", removed.url);
        self.persist();
        Removal::Removed(removed)
    }

    pub fn reset_to_defaults(&mut self) {
        self.feeds = default_feeds();
        tracing::info!("Feed list reset to defaults");
        self.persist();
    }

    /// The URL to hand to the fetcher for `feed`.
    pub fn fetch_url(&self, feed: &FeedSource) -> String {
        match self.policy.normalization {
            UrlNormalization::Off => feed.url.clone(),
            UrlNormalization::OnAdd | UrlNormalization::OnFetch => normalize_url(&feed.url),
        }
    }

    fn check_url(&self, url: &str) -> Result<String, ValidationError> {
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }

        let normalized = normalize_url(url);
        if self.policy.validate_urls {
            let parsed =
                Url::parse(&normalized).map_err(|_| ValidationError::InvalidUrl(url.to_string()))?;
            let scheme_ok = matches!(parsed.scheme(), "http" | "https");
            let host_ok = parsed.host_str().is_some_and(|h| !h.is_empty());
            if !scheme_ok || !host_ok {
                return Err(ValidationError::InvalidUrl(url.to_string()));
            }
        }

        Ok(normalized)
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.feeds) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize feed list: {}", e);
                return;
            }
        };

        if let Err(e) = self.kv.set(FEEDS_KEY, &json) {
            tracing::warn!("Failed to persist feed list: {}", e);
        }
    }
}

/// Prefix bare domains with `https://`. URLs that already carry a scheme
/// are returned unchanged.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StorageError;
    use crate::store::MemoryStore;

    fn memory() -> Arc<dyn KeyValueStore + Send + Sync> {
        Arc::new(MemoryStore::new())
    }

    fn empty_store(kv: Arc<dyn KeyValueStore + Send + Sync>, policy: FeedPolicy) -> FeedStore {
        let mut store = FeedStore::load(kv, policy);
        store.feeds.clear();
        store
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Lock("unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Lock("quota exceeded".into()))
        }
    }

    #[test]
    fn test_load_defaults_when_missing() {
        let store = FeedStore::load(memory(), FeedPolicy::default());
        assert_eq!(store.all(), default_feeds().as_slice());
    }

    #[test]
    fn test_load_defaults_when_garbage() {
        let kv = memory();
        kv.set(FEEDS_KEY, "{not json").unwrap();
        let store = FeedStore::load(kv, FeedPolicy::default());
        assert_eq!(store.len(), default_feed_count());
    }

    #[test]
    fn test_load_defaults_when_empty_array() {
        let kv = memory();
        kv.set(FEEDS_KEY, "[]").unwrap();
        let store = FeedStore::load(kv, FeedPolicy::default());
        assert_eq!(store.len(), default_feed_count());
    }

    #[test]
    fn test_load_defaults_when_not_array() {
        let kv = memory();
        kv.set(FEEDS_KEY, r#"{"name":"x","url":"y"}"#).unwrap();
        let store = FeedStore::load(kv, FeedPolicy::default());
        assert_eq!(store.len(), default_feed_count());
    }

    #[test]
    fn test_add_then_list_and_reload() {
        let kv = memory();
        let mut store = FeedStore::load(kv.clone(), FeedPolicy::default());
        let before = store.len();

        store.add("Rust Blog", "https://blog.rust-lang.org/feed.xml").unwrap();

        let listed = store.list("");
        assert_eq!(listed.len(), before + 1);
        let matches = listed
            .iter()
            .filter(|f| f.url == "https://blog.rust-lang.org/feed.xml")
            .count();
        assert_eq!(matches, 1);

        let reloaded = FeedStore::load(kv, FeedPolicy::default());
        assert_eq!(reloaded.all(), store.all());
    }

    #[test]
    fn test_add_uses_url_as_name() {
        let mut store = empty_store(memory(), FeedPolicy::default());
        store.add("  ", "https://example.com/rss").unwrap();
        assert_eq!(store.get(0).unwrap().name, "https://example.com/rss");
    }

    #[test]
    fn test_add_empty_url_fails() {
        let mut store = FeedStore::load(memory(), FeedPolicy::default());
        let before = store.len();
        assert_eq!(store.add("x", "   "), Err(ValidationError::EmptyUrl));
        assert_eq!(store.len(), before);
    }

    #[test]
    fn test_add_bare_domain_normalized_on_add() {
        let mut store = empty_store(memory(), FeedPolicy::default());
        store.add("Example", "example.com/feed").unwrap();
        assert_eq!(store.get(0).unwrap().url, "https://example.com/feed");
    }

    #[test]
    fn test_add_bare_domain_normalized_on_fetch() {
        let policy = FeedPolicy {
            normalization: UrlNormalization::OnFetch,
            ..FeedPolicy::default()
        };
        let mut store = empty_store(memory(), policy);
        store.add("Example", "example.com/feed").unwrap();

        let feed = store.get(0).unwrap().clone();
        assert_eq!(feed.url, "example.com/feed");
        assert_eq!(store.fetch_url(&feed), "https://example.com/feed");
    }

    #[test]
    fn test_fetch_url_untouched_when_off() {
        let policy = FeedPolicy {
            normalization: UrlNormalization::Off,
            ..FeedPolicy::default()
        };
        let store = empty_store(memory(), policy);
        let feed = FeedSource::new("x", "example.com/feed");
        assert_eq!(store.fetch_url(&feed), "example.com/feed");
    }

    #[test]
    fn test_add_rejects_non_http_scheme() {
        let mut store = empty_store(memory(), FeedPolicy::default());
        assert!(matches!(
            store.add("x", "ftp://example.com/feed"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(matches!(
            store.add("x", "https://"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_without_validation_accepts_anything() {
        let policy = FeedPolicy {
            validate_urls: false,
            ..FeedPolicy::default()
        };
        let mut store = empty_store(memory(), policy);
        store.add("x", "ftp://example.com/feed").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicates_permitted() {
        let mut store = empty_store(memory(), FeedPolicy::default());
        store.add("a", "https://example.com/rss").unwrap();
        store.add("a", "https://example.com/rss").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_list_filter_case_insensitive() {
        let store = FeedStore::load(memory(), FeedPolicy::default());
        let hits = store.list("news");
        let names: Vec<&str> = hits.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["BBC World News", "ABC News (US)", "Fox News"]);

        let indexed: Vec<usize> = store.iter_filtered("VARIETY").map(|(i, _)| i).collect();
        assert_eq!(indexed, vec![4]);
    }

    #[test]
    fn test_remove_decrements() {
        let kv = memory();
        let mut store = FeedStore::load(kv.clone(), FeedPolicy::default());
        let before = store.len();
        let target = store.get(1).unwrap().clone();

        assert_eq!(store.remove(1), Removal::Removed(target.clone()));
        assert_eq!(store.len(), before - 1);
        assert!(!store.all().contains(&target));

        let reloaded = FeedStore::load(kv, FeedPolicy::default());
        assert_eq!(reloaded.len(), before - 1);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut store = FeedStore::load(memory(), FeedPolicy::default());
        let before = store.all().to_vec();
        assert_eq!(store.remove(99), Removal::OutOfRange);
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn test_remove_protected_defaults() {
        let policy = FeedPolicy {
            protect_defaults: true,
            ..FeedPolicy::default()
        };
        let mut store = FeedStore::load(memory(), policy);
        store.add("Mine", "https://mine.example/rss").unwrap();

        assert_eq!(store.remove(0), Removal::Protected);
        assert_eq!(store.len(), default_feed_count() + 1);

        let last = store.len() - 1;
        assert!(matches!(store.remove(last), Removal::Removed(_)));
    }

    #[test]
    fn test_reset_to_defaults() {
        let kv = memory();
        let mut store = FeedStore::load(kv.clone(), FeedPolicy::default());
        store.remove(0);
        store.add("Mine", "https://mine.example/rss").unwrap();

        store.reset_to_defaults();
        assert_eq!(store.all(), default_feeds().as_slice());

        let reloaded = FeedStore::load(kv, FeedPolicy::default());
        assert_eq!(reloaded.all(), default_feeds().as_slice());
    }

    #[test]
    fn test_storage_failure_keeps_memory_state() {
        let mut store = FeedStore::load(Arc::new(FailingStore), FeedPolicy::default());
        assert_eq!(store.len(), default_feed_count());

        store.add("Mine", "https://mine.example/rss").unwrap();
        assert_eq!(store.len(), default_feed_count() + 1);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url(" https://example.com "), "https://example.com");
    }
}
