//! Session state shared by the CLI and the TUI.
//!
//! The controller owns both stores and the article view. Network work is
//! split into `begin_*` (bump the generation, hand out a ticket) and
//! `complete_*` (apply the result only if its ticket is still current), so
//! the caller decides where the fetch actually runs. A response that arrives
//! after the user has moved on is dropped instead of overwriting newer state.

use std::sync::Arc;

use crate::app::context::AppContext;
use crate::app::{FetchError, ValidationError};
use crate::domain::{ArticleRecord, Bookmark, FeedSource};
use crate::fetcher::search::{search_feeds, SearchHit, SearchTarget};
use crate::fetcher::ArticleFetcher;
use crate::store::{BookmarkOutcome, BookmarkStore, FeedPolicy, FeedStore, Removal};

pub const NO_FEEDS: &str = "No feeds. Add one to begin.";
pub const SELECT_FEED: &str = "Select a feed to start reading.";
pub const NO_ITEMS: &str = "No items found in this feed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Feed(usize),
    Search(String),
}

/// Identifies one in-flight request. Only the ticket carrying the current
/// generation may change the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub target: LoadTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    /// URL to hand to the fetcher, already normalized per policy.
    pub url: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub ticket: LoadTicket,
    pub query: String,
    pub targets: Vec<SearchTarget>,
}

/// What the main pane shows. Each new load replaces the previous contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleView {
    Placeholder(String),
    Loading(String),
    Articles(Vec<ArticleRecord>),
    SearchResults { query: String, hits: Vec<SearchHit> },
    Failed(FetchError),
}

impl ArticleView {
    pub fn articles(&self) -> Vec<&ArticleRecord> {
        match self {
            ArticleView::Articles(articles) => articles.iter().collect(),
            ArticleView::SearchResults { hits, .. } => hits.iter().map(|h| &h.article).collect(),
            _ => Vec::new(),
        }
    }

    pub fn article(&self, index: usize) -> Option<&ArticleRecord> {
        match self {
            ArticleView::Articles(articles) => articles.get(index),
            ArticleView::SearchResults { hits, .. } => hits.get(index).map(|h| &h.article),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArticleView::Articles(articles) => articles.len(),
            ArticleView::SearchResults { hits, .. } => hits.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ArticleView::Loading(_))
    }

    /// Text shown in place of the article list, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            ArticleView::Placeholder(msg) | ArticleView::Loading(msg) => Some(msg.clone()),
            ArticleView::Failed(e) => Some(failure_message(e)),
            ArticleView::SearchResults { query, hits } if hits.is_empty() => {
                Some(format!("No articles match \"{}\".", query))
            }
            ArticleView::Articles(articles) if articles.is_empty() => Some(NO_ITEMS.to_string()),
            _ => None,
        }
    }
}

pub fn failure_message(error: &FetchError) -> String {
    match error {
        FetchError::Empty => NO_ITEMS.to_string(),
        other => format!("Failed to load feed: {}", other),
    }
}

pub struct Controller {
    feeds: FeedStore,
    bookmarks: BookmarkStore,
    fetcher: Arc<ArticleFetcher>,
    selected: Option<usize>,
    generation: u64,
    view: ArticleView,
}

impl Controller {
    pub fn new(ctx: &AppContext) -> Self {
        let reader = &ctx.config.reader;
        let feeds = FeedStore::load(ctx.kv.clone(), FeedPolicy::from(reader));
        let bookmarks = BookmarkStore::load(ctx.kv.clone(), reader.bookmark_cap);

        Self {
            feeds,
            bookmarks,
            fetcher: ctx.fetcher.clone(),
            selected: None,
            generation: 0,
            view: ArticleView::Placeholder(SELECT_FEED.to_string()),
        }
    }

    /// Start on the first feed, or show the empty-state placeholder.
    pub fn init(&mut self) -> Option<LoadRequest> {
        if self.feeds.is_empty() {
            self.view = ArticleView::Placeholder(NO_FEEDS.to_string());
            return None;
        }
        self.begin_load(0)
    }

    pub fn feeds(&self) -> &FeedStore {
        &self.feeds
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn bookmarks_mut(&mut self) -> &mut BookmarkStore {
        &mut self.bookmarks
    }

    pub fn fetcher(&self) -> Arc<ArticleFetcher> {
        self.fetcher.clone()
    }

    pub fn view(&self) -> &ArticleView {
        &self.view
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_feed(&self) -> Option<&FeedSource> {
        self.selected.and_then(|i| self.feeds.get(i))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn begin_load(&mut self, index: usize) -> Option<LoadRequest> {
        let feed = self.feeds.get(index)?;
        let label = feed.display_name().to_string();
        let url = self.feeds.fetch_url(feed);

        self.generation += 1;
        self.selected = Some(index);
        self.view = ArticleView::Loading(format!("Loading {}...", label));
        tracing::debug!("Loading feed {} ({}) as generation {}", index, url, self.generation);

        Some(LoadRequest {
            ticket: LoadTicket {
                generation: self.generation,
                target: LoadTarget::Feed(index),
            },
            url,
            label,
        })
    }

    /// Apply a finished load. Returns false when the ticket went stale.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<ArticleRecord>, FetchError>,
    ) -> bool {
        if !self.is_current(&ticket) {
            tracing::warn!(
                "Dropping stale response for {:?} (generation {}, current {})",
                ticket.target,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.view = match result {
            Ok(articles) => {
                tracing::debug!("Showing {} articles", articles.len());
                ArticleView::Articles(articles)
            }
            Err(e) => {
                tracing::warn!("Feed load failed: {}", e);
                ArticleView::Failed(e)
            }
        };
        true
    }

    /// Fetch and apply in one step, for callers without an event loop.
    pub async fn load(&mut self, index: usize) -> bool {
        let Some(request) = self.begin_load(index) else {
            return false;
        };
        let result = self.fetcher.fetch(&request.url).await;
        self.complete_load(request.ticket, result)
    }

    pub fn refresh(&mut self) -> Option<LoadRequest> {
        self.selected.and_then(|index| self.begin_load(index))
    }

    pub fn search_targets(&self) -> Vec<SearchTarget> {
        self.feeds
            .all()
            .iter()
            .enumerate()
            .map(|(index, feed)| SearchTarget::new(index, feed, self.feeds.fetch_url(feed)))
            .collect()
    }

    pub fn begin_search(&mut self, query: &str) -> Option<SearchRequest> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let targets = self.search_targets();
        self.generation += 1;
        self.view = ArticleView::Loading(format!(
            "Searching {} feeds for \"{}\"...",
            targets.len(),
            query
        ));
        tracing::debug!("Search {:?} as generation {}", query, self.generation);

        Some(SearchRequest {
            ticket: LoadTicket {
                generation: self.generation,
                target: LoadTarget::Search(query.to_string()),
            },
            query: query.to_string(),
            targets,
        })
    }

    pub fn complete_search(&mut self, ticket: LoadTicket, hits: Vec<SearchHit>) -> bool {
        if !self.is_current(&ticket) {
            tracing::warn!(
                "Dropping stale search results (generation {}, current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        let query = match ticket.target {
            LoadTarget::Search(query) => query,
            LoadTarget::Feed(_) => String::new(),
        };
        self.view = ArticleView::SearchResults { query, hits };
        true
    }

    pub async fn search(&mut self, query: &str) -> bool {
        let Some(request) = self.begin_search(query) else {
            return false;
        };
        let fetcher = self.fetcher.clone();
        let hits = search_feeds(&fetcher, &request.targets, &request.query).await;
        self.complete_search(request.ticket, hits)
    }

    pub fn add_feed(&mut self, name: &str, url: &str) -> Result<(), ValidationError> {
        let was_empty = self.feeds.is_empty();
        self.feeds.add(name, url)?;
        if was_empty {
            self.view = ArticleView::Placeholder(SELECT_FEED.to_string());
        }
        Ok(())
    }

    pub fn remove_feed(&mut self, index: usize) -> Removal {
        let removal = self.feeds.remove(index);
        if !matches!(removal, Removal::Removed(_)) {
            return removal;
        }

        match self.selected {
            Some(selected) if selected == index => {
                self.generation += 1;
                self.selected = None;
                self.view = ArticleView::Placeholder(self.idle_message().to_string());
            }
            Some(selected) if selected > index => {
                self.selected = Some(selected - 1);
            }
            _ => {
                if self.feeds.is_empty() {
                    self.view = ArticleView::Placeholder(NO_FEEDS.to_string());
                }
            }
        }
        removal
    }

    pub fn reset_feeds(&mut self) -> Option<LoadRequest> {
        self.feeds.reset_to_defaults();
        self.generation += 1;
        self.selected = None;
        self.init()
    }

    /// Bookmark the article at `index` in the current view.
    pub fn bookmark_article(&mut self, index: usize) -> Option<BookmarkOutcome> {
        let article = self.view.article(index)?.clone();
        Some(self.bookmarks.add(&article))
    }

    pub fn remove_bookmark(&mut self, index: usize) -> Option<Bookmark> {
        self.bookmarks.remove(index)
    }

    fn idle_message(&self) -> &'static str {
        if self.feeds.is_empty() {
            NO_FEEDS
        } else {
            SELECT_FEED
        }
    }
}
