use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app::error::{NewsroomError, Result};
use crate::config::Config;
use crate::fetcher::http_fetcher::ProxyFetcher;
use crate::fetcher::{ArticleFetcher, Fetcher};
use crate::normalizer::Normalizer;
use crate::store::{KeyValueStore, MemoryStore, SqliteStore};

pub struct AppContext {
    pub kv: Arc<dyn KeyValueStore + Send + Sync>,
    pub fetcher: Arc<ArticleFetcher>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, config: Config) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        tracing::debug!("Opening store at {}", db_path.display());
        let kv: Arc<dyn KeyValueStore + Send + Sync> = Arc::new(SqliteStore::new(&db_path)?);
        Self::with_store(kv, config)
    }

    /// Nothing touches disk; state lives for this process only.
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    pub fn with_store(kv: Arc<dyn KeyValueStore + Send + Sync>, config: Config) -> Result<Self> {
        let transport: Arc<dyn Fetcher + Send + Sync> = Arc::new(ProxyFetcher::new(
            &config.reader.proxy_url,
            Duration::from_secs(config.reader.timeout_secs),
        )?);
        Ok(Self::with_transport(kv, transport, config))
    }

    pub fn with_transport(
        kv: Arc<dyn KeyValueStore + Send + Sync>,
        transport: Arc<dyn Fetcher + Send + Sync>,
        config: Config,
    ) -> Self {
        let normalizer = Normalizer::from_config(&config.reader);
        let fetcher = Arc::new(ArticleFetcher::new(transport, normalizer));

        Self {
            kv,
            fetcher,
            config: Arc::new(config),
        }
    }

    pub fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NewsroomError::Config("Could not find data directory".into()))?;
        let newsroom_dir = data_dir.join("newsroom");
        std::fs::create_dir_all(&newsroom_dir)?;
        Ok(newsroom_dir.join("newsroom.db"))
    }
}
