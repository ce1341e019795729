//! Keyword search across every subscribed feed.
//!
//! Feeds are fetched one after another so a search never has more than one
//! request in flight against the proxy.

use crate::domain::{ArticleRecord, FeedSource};
use crate::fetcher::ArticleFetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub index: usize,
    pub name: String,
    pub url: String,
}

impl SearchTarget {
    pub fn new(index: usize, feed: &FeedSource, url: String) -> Self {
        Self {
            index,
            name: feed.display_name().to_string(),
            url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub feed_index: usize,
    pub feed_name: String,
    pub article: ArticleRecord,
}

/// Fetch each target in order and keep the articles matching `query`.
/// Feeds that fail are logged and skipped.
pub async fn search_feeds(
    fetcher: &ArticleFetcher,
    targets: &[SearchTarget],
    query: &str,
) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for target in targets {
        match fetcher.fetch(&target.url).await {
            Ok(articles) => {
                hits.extend(
                    articles
                        .into_iter()
                        .filter(|article| article.matches(query))
                        .map(|article| SearchHit {
                            feed_index: target.index,
                            feed_name: target.name.clone(),
                            article,
                        }),
                );
            }
            Err(e) => {
                tracing::warn!("Search skipped {}: {}", target.name, e);
            }
        }
    }

    tracing::info!(
        "Search for {:?} found {} matches in {} feeds",
        query,
        hits.len(),
        targets.len()
    );
    hits
}
