pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newsroom")]
#[command(about = "A terminal news reader for RSS/Atom feeds", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/newsroom/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file to use instead of the default data directory
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Keep feeds and bookmarks in memory only
    #[arg(long, global = true, conflicts_with = "db")]
    pub ephemeral: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List subscribed feeds
    Feeds {
        /// Only show feeds whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Subscribe to a feed
    Add {
        /// Feed URL; a bare domain gets https:// prepended
        url: String,

        /// Display name (defaults to the URL)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Unsubscribe from the feed at INDEX (as shown by `feeds`)
    Remove { index: usize },
    /// Replace the feed list with the built-in defaults
    Reset,
    /// Fetch a feed and print its articles
    Read {
        /// Feed index (defaults to the first feed)
        index: Option<usize>,
    },
    /// Search the articles of every feed
    Search { query: String },
    /// List saved bookmarks
    Bookmarks,
    /// Bookmark an article from a feed
    Bookmark {
        feed_index: usize,
        article_index: usize,
    },
    /// Delete the bookmark at INDEX (as shown by `bookmarks`)
    Unbookmark { index: usize },
    /// Launch the TUI (default)
    Tui,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["newsroom"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["newsroom", "add", "example.com/rss", "--name", "Ex", "--db", "x.db"])
                .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Some(Commands::Add { url, name }) => {
                assert_eq!(url, "example.com/rss");
                assert_eq!(name.as_deref(), Some("Ex"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_ephemeral_conflicts_with_db() {
        assert!(Cli::try_parse_from(["newsroom", "--ephemeral", "--db", "x.db", "feeds"]).is_err());
    }

    #[test]
    fn test_bookmark_takes_two_indices() {
        let cli = Cli::try_parse_from(["newsroom", "bookmark", "2", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Bookmark {
                feed_index: 2,
                article_index: 5
            })
        ));
    }
}
