use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::ArticleView;
use crate::config::ColorConfig;
use crate::tui::app::{ActivePane, Confirm, InputMode, MainView, TuiApp};

const SIDEBAR_WIDTH: u16 = 28;

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Panes
            Constraint::Length(2), // Prompt + help
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(30)])
        .split(rows[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(6)])
        .split(columns[1]);

    render_feeds_pane(frame, app, columns[0], colors);
    render_articles_pane(frame, app, main[0], colors);
    render_preview_pane(frame, app, main[1], colors);
    render_status_bar(frame, app, rows[1], colors);
}

fn border_style(app: &TuiApp, pane: ActivePane, colors: &ColorConfig) -> Style {
    if app.active_pane == pane {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn highlight_style(app: &TuiApp, pane: ActivePane, colors: &ColorConfig) -> Style {
    if app.active_pane == pane {
        Style::default()
            .bg(colors.selection_bg_active)
            .fg(colors.selection_fg_active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(colors.selection_bg_inactive)
            .fg(colors.selection_fg_inactive)
    }
}

fn render_feeds_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let selected = app.controller.selected();
    let visible = app.visible_feeds();

    let items: Vec<ListItem> = visible
        .iter()
        .map(|(index, feed)| {
            let marker = if Some(*index) == selected { "● " } else { "  " };
            ListItem::new(format!("{}{}", marker, feed.display_name()))
        })
        .collect();

    let total = app.controller.feeds().len();
    let title = if app.filter.is_empty() {
        format!(" Feeds ({}) ", total)
    } else {
        format!(" Feeds ({}/{}) /{}/ ", visible.len(), total, app.filter)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Feeds, colors));

    if items.is_empty() {
        let message = if total == 0 {
            "No feeds. Add one to begin."
        } else {
            "No feeds match the filter."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(colors.placeholder))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(app, ActivePane::Feeds, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.feed_list_state);
}

fn render_articles_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let cards = app.cards();

    let heading = match app.main_view {
        MainView::Bookmarks => "Bookmarks".to_string(),
        MainView::Articles => match app.controller.view() {
            ArticleView::SearchResults { query, .. } => format!("Search: {}", query),
            _ => app
                .controller
                .selected_feed()
                .map(|f| f.display_name().to_string())
                .unwrap_or_else(|| "Articles".to_string()),
        },
    };
    let title = if cards.is_empty() {
        format!(" {} ", heading)
    } else {
        format!(" {} [{}/{}] ", heading, app.article_index + 1, cards.len())
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Articles, colors));

    if cards.is_empty() {
        let (message, color) = match app.main_view {
            MainView::Bookmarks => ("No bookmarks yet.".to_string(), colors.placeholder),
            MainView::Articles => {
                let view = app.controller.view();
                let color = if matches!(view, ArticleView::Failed(_)) {
                    colors.error
                } else {
                    colors.placeholder
                };
                (view.message().unwrap_or_default(), color)
            }
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let bookmarks = app.controller.bookmarks();
    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            if bookmarks.contains(&card.link) {
                ListItem::new(Line::from(vec![
                    Span::styled("★ ", Style::default().fg(colors.bookmarked)),
                    Span::raw(card.summary()),
                ]))
            } else {
                ListItem::new(format!("  {}", card.summary()))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(app, ActivePane::Articles, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.article_list_state);
}

fn render_preview_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let (title, content) = if let Some(card) = app.selected_card() {
        let mut lines = Vec::new();

        lines.push(Line::from(Span::styled(
            card.title.clone(),
            Style::default()
                .fg(colors.article_title)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));

        if let Some(source) = &card.source {
            lines.push(Line::from(format!("From: {}", source)));
        }
        if !card.date.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Date: {}", card.date),
                Style::default().fg(colors.metadata_date),
            )));
        }
        if card.has_link() {
            lines.push(Line::from(Span::styled(
                format!("Link: {}", card.link),
                Style::default().fg(colors.metadata_link),
            )));
        }
        if let Some(thumb) = &card.thumbnail {
            lines.push(Line::from(Span::styled(
                format!("Image: {}", thumb),
                Style::default().fg(colors.placeholder),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(
            "─".repeat(area.width.saturating_sub(2) as usize),
        ));
        lines.push(Line::from(""));
        lines.push(Line::from(card.description.clone()));

        (" Preview ".to_string(), Text::from(lines))
    } else {
        (
            " Preview ".to_string(),
            Text::styled("No article selected", Style::default().fg(colors.placeholder)),
        )
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Preview, colors));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn prompt(app: &TuiApp) -> Option<String> {
    let text = match app.input_mode {
        InputMode::Normal => return None,
        InputMode::Filter => format!("Filter feeds: {}_", app.input),
        InputMode::AddFeedName => format!("Feed name (optional): {}_", app.input),
        InputMode::AddFeedUrl => format!("Feed URL: {}_", app.input),
        InputMode::Search => format!("Search all feeds: {}_", app.input),
        InputMode::Confirm(Confirm::RemoveFeed(index)) => {
            let name = app
                .controller
                .feeds()
                .get(index)
                .map(|f| f.display_name().to_string())
                .unwrap_or_default();
            format!("Remove \"{}\"? (y/n)", name)
        }
        InputMode::Confirm(Confirm::ResetFeeds) => {
            "Replace all feeds with the defaults? (y/n)".to_string()
        }
    };
    Some(text)
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status_style = Style::default().fg(colors.status_fg).bg(colors.status_bg);

    let first = match (prompt(app), &app.status_message) {
        (Some(prompt), Some(msg)) => Line::from(vec![
            Span::styled(prompt, Style::default().fg(colors.input_fg)),
            Span::raw("  "),
            Span::styled(msg.clone(), Style::default().fg(colors.error)),
        ]),
        (Some(prompt), None) => Line::from(Span::styled(prompt, Style::default().fg(colors.input_fg))),
        (None, Some(msg)) => Line::from(msg.clone()),
        (None, None) => Line::from(""),
    };

    let help = match app.input_mode {
        InputMode::Normal => {
            "j/k:Nav  Tab:Pane  Enter:Open  o:Browser  s:Share  b:Bookmark  B:Bookmarks  a:Add  d:Remove  f:Filter  /:Search  R:Reload  q:Quit"
        }
        InputMode::Confirm(_) => "y:Confirm  any other key:Cancel",
        _ => "Enter:Submit  Esc:Cancel",
    };

    let paragraph = Paragraph::new(Text::from(vec![first, Line::from(help)])).style(status_style);
    frame.render_widget(paragraph, area);
}
