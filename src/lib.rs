//! # Newsroom
//!
//! A terminal news reader: subscribe to RSS/Atom feeds, read them through a
//! fetch proxy, search across all of them and keep bookmarks.
//!
//! ## Architecture
//!
//! ```text
//! Controller → FeedStore → ArticleFetcher (proxy + normalizer) → cards → BookmarkStore
//! ```
//!
//! Feed and bookmark lists each live as one JSON array in a small key/value
//! table, so the whole session state survives restarts.
//!
//! ## Quick Start
//!
//! ```bash
//! # Subscribe to a feed (bare domains get https://)
//! newsroom add blog.rust-lang.org/feed.xml --name "Rust Blog"
//!
//! # Read the third feed
//! newsroom read 3
//!
//! # Search every feed
//! newsroom search election
//!
//! # Launch the TUI
//! newsroom
//! ```

/// Session state and error types.
///
/// [`Controller`](app::Controller) owns both stores and the current article
/// view; [`AppContext`](app::AppContext) wires storage, fetcher and config.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/newsroom/config.toml`:
/// colors, keybindings and the `[reader]` settings.
pub mod config;

/// Feed sources, article records and bookmarks.
pub mod domain;

/// Proxy transport, article fetching and cross-feed search.
pub mod fetcher;

/// RSS/Atom parsing into [`ArticleRecord`](domain::ArticleRecord)s via a
/// declarative extraction rule table.
pub mod normalizer;

/// Key/value persistence and the feed and bookmark stores built on it.
pub mod store;

/// Terminal user interface.
///
/// Sidebar of feeds, article list (or bookmarks), preview pane and a
/// prompt line for filter, add-feed, search and confirmations.
pub mod tui;
