pub mod article;
pub mod bookmark;
pub mod feed;

pub use article::ArticleRecord;
pub use bookmark::Bookmark;
pub use feed::{default_feed_count, default_feeds, FeedSource};
