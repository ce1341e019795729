pub mod bookmarks;
pub mod feeds;
pub mod memory;
pub mod sqlite;

use crate::app::StorageError;

pub use bookmarks::{BookmarkOutcome, BookmarkStore};
pub use feeds::{FeedPolicy, FeedStore, Removal};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const FEEDS_KEY: &str = "newsroom.feeds.v1";
pub const BOOKMARKS_KEY: &str = "newsroom.bookmarks.v1";

/// Synchronous string key/value storage shared by the feed and bookmark
/// stores. Each list is written whole under its own key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
