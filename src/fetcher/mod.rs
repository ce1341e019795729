pub mod http_fetcher;
pub mod search;

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::FetchError;
use crate::domain::ArticleRecord;
use crate::normalizer::Normalizer;

/// Raw transport: fetch the bytes behind a feed URL.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Transport plus parsing: a feed URL in, normalized articles out.
pub struct ArticleFetcher {
    transport: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
}

impl ArticleFetcher {
    pub fn new(transport: Arc<dyn Fetcher + Send + Sync>, normalizer: Normalizer) -> Self {
        Self {
            transport,
            normalizer,
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<ArticleRecord>, FetchError> {
        tracing::debug!("Fetching {}", url);
        let body = self.transport.fetch(url).await?;
        let articles = self.normalizer.normalize(&body)?;
        tracing::debug!("Fetched {} articles from {}", articles.len(), url);
        Ok(articles)
    }
}
