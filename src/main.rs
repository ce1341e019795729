use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsroom::app::{AppContext, Controller};
use newsroom::cli::{commands, Cli, Commands};
use newsroom::config::Config;

/// Logs go to `--log` when given so they never land on the TUI's screen.
fn init_tracing(log: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };
    let stderr_layer = if file_layer.is_none() {
        Some(fmt::layer().with_writer(io::stderr))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(EnvFilter::from_default_env())
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let ctx = if cli.ephemeral {
        AppContext::in_memory(config)?
    } else {
        AppContext::new(cli.db.clone(), config)?
    };

    let command = cli.command.unwrap_or(Commands::Tui);
    if let Commands::Tui = command {
        newsroom::tui::run(Arc::new(ctx)).await?;
        return Ok(());
    }

    let mut controller = Controller::new(&ctx);
    let mut out = io::stdout().lock();

    match command {
        Commands::Feeds { filter } => {
            commands::list_feeds(&controller, filter.as_deref(), &mut out)?;
        }
        Commands::Add { url, name } => {
            commands::add_feed(&mut controller, &url, name.as_deref(), &mut out)?;
        }
        Commands::Remove { index } => {
            commands::remove_feed(&mut controller, index, &mut out)?;
        }
        Commands::Reset => {
            commands::reset_feeds(&mut controller, &mut out)?;
        }
        Commands::Read { index } => {
            commands::read_feed(&mut controller, index, &mut out).await?;
        }
        Commands::Search { query } => {
            commands::search(&mut controller, &query, &mut out).await?;
        }
        Commands::Bookmarks => {
            commands::list_bookmarks(&controller, &mut out)?;
        }
        Commands::Bookmark {
            feed_index,
            article_index,
        } => {
            commands::bookmark_article(&mut controller, feed_index, article_index, &mut out)
                .await?;
        }
        Commands::Unbookmark { index } => {
            commands::remove_bookmark(&mut controller, index, &mut out)?;
        }
        Commands::Tui => {}
    }

    Ok(())
}
