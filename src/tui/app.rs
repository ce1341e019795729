use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use crate::app::controller::{LoadRequest, SearchRequest};
use crate::app::{ArticleView, Controller, FetchError, LoadTicket};
use crate::config::KeybindingConfig;
use crate::domain::{ArticleRecord, FeedSource};
use crate::fetcher::search::SearchHit;
use crate::store::Removal;
use crate::tui::card::{bookmark_message, ArticleCard};
use crate::tui::event::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Feeds,
    Articles,
    Preview,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Feeds => ActivePane::Articles,
            ActivePane::Articles => ActivePane::Preview,
            ActivePane::Preview => ActivePane::Feeds,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActivePane::Feeds => ActivePane::Preview,
            ActivePane::Articles => ActivePane::Feeds,
            ActivePane::Preview => ActivePane::Articles,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainView {
    Articles,
    Bookmarks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    RemoveFeed(usize),
    ResetFeeds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
    AddFeedName,
    AddFeedUrl,
    Search,
    Confirm(Confirm),
}

/// Work the event loop has to do on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Load(LoadRequest),
    Search(SearchRequest),
    Share(ArticleCard),
    Open(ArticleCard),
}

/// A finished background fetch, sent back to the UI loop.
#[derive(Debug)]
pub enum Completion {
    Load(LoadTicket, Result<Vec<ArticleRecord>, FetchError>),
    Search(LoadTicket, Vec<SearchHit>),
}

pub const PAGE_SIZE: usize = 10;

pub struct TuiApp {
    pub controller: Controller,
    pub active_pane: ActivePane,
    pub main_view: MainView,
    pub input_mode: InputMode,
    pub input: String,
    pending_name: String,
    pub filter: String,
    pub feed_cursor: usize,
    pub article_index: usize,
    pub preview_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub feed_list_state: ListState,
    pub article_list_state: ListState,
}

impl TuiApp {
    pub fn new(controller: Controller) -> Self {
        let mut feed_list_state = ListState::default();
        feed_list_state.select(Some(0));
        let mut article_list_state = ListState::default();
        article_list_state.select(Some(0));

        Self {
            controller,
            active_pane: ActivePane::Feeds,
            main_view: MainView::Articles,
            input_mode: InputMode::Normal,
            input: String::new(),
            pending_name: String::new(),
            filter: String::new(),
            feed_cursor: 0,
            article_index: 0,
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            feed_list_state,
            article_list_state,
        }
    }

    /// Kick off the first feed load.
    pub fn start(&mut self) -> Effect {
        match self.controller.init() {
            Some(request) => {
                self.sync_feed_cursor();
                Effect::Load(request)
            }
            None => Effect::None,
        }
    }

    pub fn visible_feeds(&self) -> Vec<(usize, &FeedSource)> {
        self.controller.feeds().iter_filtered(&self.filter).collect()
    }

    pub fn cursor_feed_index(&self) -> Option<usize> {
        self.visible_feeds().get(self.feed_cursor).map(|(i, _)| *i)
    }

    pub fn cards(&self) -> Vec<ArticleCard> {
        match self.main_view {
            MainView::Bookmarks => self
                .controller
                .bookmarks()
                .list()
                .iter()
                .map(ArticleCard::from_bookmark)
                .collect(),
            MainView::Articles => match self.controller.view() {
                ArticleView::Articles(articles) => {
                    articles.iter().map(ArticleCard::from_record).collect()
                }
                ArticleView::SearchResults { hits, .. } => {
                    hits.iter().map(ArticleCard::from_hit).collect()
                }
                _ => Vec::new(),
            },
        }
    }

    pub fn selected_card(&self) -> Option<ArticleCard> {
        self.cards().into_iter().nth(self.article_index)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn handle_key(&mut self, key: KeyEvent, bindings: &KeybindingConfig) -> Effect {
        if self.input_mode != InputMode::Normal {
            return self.handle_input(key);
        }
        let action = bindings.get_action(&key);
        self.handle_action(action)
    }

    pub fn handle_action(&mut self, action: Action) -> Effect {
        match action {
            Action::Quit => {
                self.should_quit = true;
                Effect::Quit
            }
            Action::MoveUp => {
                self.move_by(-1);
                Effect::None
            }
            Action::MoveDown => {
                self.move_by(1);
                Effect::None
            }
            Action::NextPage => {
                self.move_by(PAGE_SIZE as isize);
                Effect::None
            }
            Action::PrevPage => {
                self.move_by(-(PAGE_SIZE as isize));
                Effect::None
            }
            Action::NextPane => {
                self.active_pane = self.active_pane.next();
                Effect::None
            }
            Action::PrevPane => {
                self.active_pane = self.active_pane.prev();
                Effect::None
            }
            Action::Select => self.select(),
            Action::OpenInBrowser => self.selected_card().map_or(Effect::None, Effect::Open),
            Action::Share => self.selected_card().map_or(Effect::None, Effect::Share),
            Action::Bookmark => {
                if let Some(card) = self.selected_card() {
                    let outcome = card.bookmark(self.controller.bookmarks_mut());
                    self.set_status(bookmark_message(outcome));
                }
                Effect::None
            }
            Action::ToggleBookmarks => {
                self.main_view = match self.main_view {
                    MainView::Articles => MainView::Bookmarks,
                    MainView::Bookmarks => MainView::Articles,
                };
                self.active_pane = ActivePane::Articles;
                self.reset_article_cursor();
                Effect::None
            }
            Action::AddFeed => {
                self.begin_input(InputMode::AddFeedName, "");
                Effect::None
            }
            Action::Remove => {
                self.remove();
                Effect::None
            }
            Action::ResetFeeds => {
                self.input_mode = InputMode::Confirm(Confirm::ResetFeeds);
                Effect::None
            }
            Action::FilterFeeds => {
                let current = self.filter.clone();
                self.begin_input(InputMode::Filter, &current);
                self.active_pane = ActivePane::Feeds;
                Effect::None
            }
            Action::Search => {
                self.begin_input(InputMode::Search, "");
                Effect::None
            }
            Action::Refresh => match self.controller.refresh() {
                Some(request) => {
                    self.main_view = MainView::Articles;
                    self.reset_article_cursor();
                    Effect::Load(request)
                }
                None => Effect::None,
            },
            Action::None => Effect::None,
        }
    }

    /// Apply a background result. Stale results leave the screen alone.
    pub fn apply_completion(&mut self, completion: Completion) {
        let applied = match completion {
            Completion::Load(ticket, result) => self.controller.complete_load(ticket, result),
            Completion::Search(ticket, hits) => self.controller.complete_search(ticket, hits),
        };
        if applied && self.main_view == MainView::Articles {
            self.reset_article_cursor();
        }
    }

    fn select(&mut self) -> Effect {
        match self.active_pane {
            ActivePane::Feeds => {
                let Some(index) = self.cursor_feed_index() else {
                    return Effect::None;
                };
                match self.controller.begin_load(index) {
                    Some(request) => {
                        self.main_view = MainView::Articles;
                        self.active_pane = ActivePane::Articles;
                        self.reset_article_cursor();
                        Effect::Load(request)
                    }
                    None => Effect::None,
                }
            }
            ActivePane::Articles => {
                self.active_pane = ActivePane::Preview;
                self.preview_scroll = 0;
                Effect::None
            }
            ActivePane::Preview => Effect::None,
        }
    }

    fn remove(&mut self) {
        match (self.active_pane, self.main_view) {
            (ActivePane::Feeds, _) => {
                if let Some(index) = self.cursor_feed_index() {
                    self.input_mode = InputMode::Confirm(Confirm::RemoveFeed(index));
                }
            }
            (_, MainView::Bookmarks) => {
                if self.controller.remove_bookmark(self.article_index).is_some() {
                    self.set_status("Bookmark removed");
                    self.clamp_article_cursor();
                }
            }
            _ => {}
        }
    }

    fn begin_input(&mut self, mode: InputMode, initial: &str) {
        self.input_mode = mode;
        self.input = initial.to_string();
        self.clear_status();
    }

    fn end_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    fn handle_input(&mut self, key: KeyEvent) -> Effect {
        if let InputMode::Confirm(confirm) = self.input_mode {
            self.input_mode = InputMode::Normal;
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm(confirm),
                _ => {
                    self.set_status("Cancelled");
                    Effect::None
                }
            };
        }

        match key.code {
            KeyCode::Esc => {
                if self.input_mode == InputMode::Filter {
                    self.set_filter(String::new());
                }
                self.end_input();
                Effect::None
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
                self.on_input_changed();
                Effect::None
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.end_input();
                Effect::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.on_input_changed();
                Effect::None
            }
            _ => Effect::None,
        }
    }

    fn on_input_changed(&mut self) {
        if self.input_mode == InputMode::Filter {
            self.set_filter(self.input.clone());
        }
    }

    fn set_filter(&mut self, filter: String) {
        self.filter = filter;
        self.feed_cursor = 0;
        self.feed_list_state.select(Some(0));
    }

    fn submit_input(&mut self) -> Effect {
        match self.input_mode {
            InputMode::Filter => {
                self.input_mode = InputMode::Normal;
                self.input.clear();
                Effect::None
            }
            InputMode::AddFeedName => {
                self.pending_name = std::mem::take(&mut self.input);
                self.input_mode = InputMode::AddFeedUrl;
                Effect::None
            }
            InputMode::AddFeedUrl => {
                let name = self.pending_name.clone();
                match self.controller.add_feed(&name, &self.input) {
                    Ok(()) => {
                        self.pending_name.clear();
                        self.end_input();
                        self.set_status("Feed added");
                    }
                    Err(e) => self.set_status(e.to_string()),
                }
                Effect::None
            }
            InputMode::Search => {
                let query = std::mem::take(&mut self.input);
                self.input_mode = InputMode::Normal;
                match self.controller.begin_search(&query) {
                    Some(request) => {
                        self.main_view = MainView::Articles;
                        self.active_pane = ActivePane::Articles;
                        self.reset_article_cursor();
                        Effect::Search(request)
                    }
                    None => Effect::None,
                }
            }
            InputMode::Normal | InputMode::Confirm(_) => Effect::None,
        }
    }

    fn confirm(&mut self, confirm: Confirm) -> Effect {
        match confirm {
            Confirm::RemoveFeed(index) => {
                match self.controller.remove_feed(index) {
                    Removal::Removed(_) => self.set_status("Feed removed"),
                    Removal::Protected => self.set_status("Built-in feeds cannot be removed"),
                    Removal::OutOfRange => {}
                }
                self.clamp_feed_cursor();
                Effect::None
            }
            Confirm::ResetFeeds => {
                self.set_filter(String::new());
                self.main_view = MainView::Articles;
                self.set_status("Feeds reset to defaults");
                match self.controller.reset_feeds() {
                    Some(request) => {
                        self.sync_feed_cursor();
                        Effect::Load(request)
                    }
                    None => Effect::None,
                }
            }
        }
    }

    fn move_by(&mut self, delta: isize) {
        match self.active_pane {
            ActivePane::Feeds => {
                let len = self.visible_feeds().len();
                self.feed_cursor = step(self.feed_cursor, delta, len);
                self.feed_list_state.select(Some(self.feed_cursor));
            }
            ActivePane::Articles => {
                let len = self.cards().len();
                let next = step(self.article_index, delta, len);
                if next != self.article_index {
                    self.article_index = next;
                    self.article_list_state.select(Some(next));
                    self.preview_scroll = 0;
                }
            }
            ActivePane::Preview => {
                let amount = delta.unsigned_abs().min(u16::MAX as usize) as u16;
                self.preview_scroll = if delta < 0 {
                    self.preview_scroll.saturating_sub(amount)
                } else {
                    self.preview_scroll.saturating_add(amount)
                };
            }
        }
    }

    fn reset_article_cursor(&mut self) {
        self.article_index = 0;
        self.article_list_state.select(Some(0));
        self.preview_scroll = 0;
    }

    fn clamp_article_cursor(&mut self) {
        let len = self.cards().len();
        self.article_index = self.article_index.min(len.saturating_sub(1));
        self.article_list_state.select(Some(self.article_index));
    }

    fn clamp_feed_cursor(&mut self) {
        let len = self.visible_feeds().len();
        self.feed_cursor = self.feed_cursor.min(len.saturating_sub(1));
        self.feed_list_state.select(Some(self.feed_cursor));
    }

    /// Point the sidebar cursor at the controller's selected feed.
    fn sync_feed_cursor(&mut self) {
        let Some(selected) = self.controller.selected() else {
            return;
        };
        let pos = self
            .visible_feeds()
            .iter()
            .position(|(index, _)| *index == selected);
        if let Some(pos) = pos {
            self.feed_cursor = pos;
            self.feed_list_state.select(Some(pos));
        }
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len - 1;
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize).min(max)
    }
}
