//! One function per subcommand. Indices are 1-based on the command line,
//! matching what `feeds` and `bookmarks` print.

use std::io::Write;

use crate::app::{ArticleView, Controller, NewsroomError, Result};
use crate::domain::ArticleRecord;
use crate::store::Removal;
use crate::tui::card::bookmark_message;

fn to_index(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or(NewsroomError::FeedNotFound(position))
}

pub fn list_feeds(controller: &Controller, filter: Option<&str>, out: &mut impl Write) -> Result<()> {
    let feeds = controller.feeds();
    let mut shown = 0;

    for (index, feed) in feeds.iter_filtered(filter.unwrap_or_default()) {
        writeln!(out, "{:>3}. {}\n     {}", index + 1, feed.display_name(), feed.url)?;
        shown += 1;
    }

    if shown == 0 {
        if feeds.is_empty() {
            writeln!(out, "No feeds. Add one to begin.")?;
        } else {
            writeln!(out, "No feeds match the filter")?;
        }
    }
    Ok(())
}

pub fn add_feed(
    controller: &mut Controller,
    url: &str,
    name: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    controller.add_feed(name.unwrap_or_default(), url)?;
    if let Some(feed) = controller.feeds().all().last() {
        writeln!(out, "Feed added: {} ({})", feed.display_name(), feed.url)?;
    }
    Ok(())
}

pub fn remove_feed(controller: &mut Controller, position: usize, out: &mut impl Write) -> Result<()> {
    match controller.remove_feed(to_index(position)?) {
        Removal::Removed(feed) => {
            writeln!(out, "Feed removed: {}", feed.display_name())?;
            Ok(())
        }
        Removal::OutOfRange => Err(NewsroomError::FeedNotFound(position)),
        Removal::Protected => Err(NewsroomError::Other(format!(
            "Feed {} is built in and cannot be removed",
            position
        ))),
    }
}

pub fn reset_feeds(controller: &mut Controller, out: &mut impl Write) -> Result<()> {
    controller.reset_feeds();
    writeln!(out, "Feeds reset to {} defaults", controller.feeds().len())?;
    Ok(())
}

pub async fn read_feed(
    controller: &mut Controller,
    position: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let position = position.unwrap_or(1);
    let index = to_index(position)?;
    if !controller.load(index).await {
        return Err(NewsroomError::FeedNotFound(position));
    }

    if let Some(feed) = controller.selected_feed() {
        writeln!(out, "{}\n", feed.display_name())?;
    }
    print_view(controller.view(), out)
}

pub async fn search(controller: &mut Controller, query: &str, out: &mut impl Write) -> Result<()> {
    if !controller.search(query).await {
        return Err(NewsroomError::Other("Search query is empty".into()));
    }
    print_view(controller.view(), out)
}

fn print_view(view: &ArticleView, out: &mut impl Write) -> Result<()> {
    match view {
        ArticleView::Failed(e) => {
            writeln!(out, "{}", view.message().unwrap_or_default())?;
            Err(NewsroomError::Fetch(e.clone()))
        }
        ArticleView::SearchResults { hits, .. } if !hits.is_empty() => {
            for (i, hit) in hits.iter().enumerate() {
                print_article(i + 1, &hit.article, Some(hit.feed_name.as_str()), out)?;
            }
            Ok(())
        }
        ArticleView::Articles(articles) if !articles.is_empty() => {
            for (i, article) in articles.iter().enumerate() {
                print_article(i + 1, article, None, out)?;
            }
            Ok(())
        }
        _ => {
            writeln!(out, "{}", view.message().unwrap_or_default())?;
            Ok(())
        }
    }
}

fn print_article(
    number: usize,
    article: &ArticleRecord,
    source: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "{:>3}. {}", number, article.title)?;

    let mut meta = Vec::new();
    if let Some(source) = source {
        meta.push(source.to_string());
    }
    if !article.published_at.is_empty() {
        meta.push(article.published_at.clone());
    }
    if article.has_link() {
        meta.push(article.link.clone());
    }
    if !meta.is_empty() {
        writeln!(out, "     {}", meta.join("  "))?;
    }
    if !article.description.is_empty() {
        writeln!(out, "     {}", article.description)?;
    }
    Ok(())
}

pub fn list_bookmarks(controller: &Controller, out: &mut impl Write) -> Result<()> {
    let bookmarks = controller.bookmarks().list();
    if bookmarks.is_empty() {
        writeln!(out, "No bookmarks yet.")?;
        return Ok(());
    }

    for (i, bookmark) in bookmarks.iter().enumerate() {
        writeln!(out, "{:>3}. {}\n     {}", i + 1, bookmark.title, bookmark.link)?;
    }
    Ok(())
}

pub async fn bookmark_article(
    controller: &mut Controller,
    feed_position: usize,
    article_position: usize,
    out: &mut impl Write,
) -> Result<()> {
    let feed_index = to_index(feed_position)?;
    if !controller.load(feed_index).await {
        return Err(NewsroomError::FeedNotFound(feed_position));
    }
    if let ArticleView::Failed(e) = controller.view() {
        return Err(NewsroomError::Fetch(e.clone()));
    }

    let outcome = article_position
        .checked_sub(1)
        .and_then(|index| controller.bookmark_article(index))
        .ok_or_else(|| {
            NewsroomError::Other(format!(
                "Feed {} has no article {}",
                feed_position, article_position
            ))
        })?;

    writeln!(out, "{}", bookmark_message(outcome))?;
    Ok(())
}

pub fn remove_bookmark(controller: &mut Controller, position: usize, out: &mut impl Write) -> Result<()> {
    let removed = position
        .checked_sub(1)
        .and_then(|index| controller.remove_bookmark(index))
        .ok_or_else(|| NewsroomError::Other(format!("No bookmark at {}", position)))?;

    writeln!(out, "Bookmark removed: {}", removed.title)?;
    Ok(())
}
