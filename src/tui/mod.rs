pub mod app;
pub mod card;
pub mod event;
pub mod layout;
pub mod share;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app::{AppContext, Controller, Result};
use crate::fetcher::search::search_feeds;
use crate::fetcher::ArticleFetcher;

use self::app::{Completion, Effect, TuiApp};
use self::event::{AppEvent, EventHandler};
use self::share::Sharer;

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>) -> Result<()> {
    let config = ctx.config.clone();
    let mut tui_app = TuiApp::new(Controller::new(&ctx));
    let mut sharer = Sharer::system(config.reader.share_intent_url.clone());
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let effect = tui_app.start();
    dispatch(effect, &mut tui_app, &mut sharer, ctx.fetcher.clone(), &tx);

    loop {
        drain_completions(&mut tui_app, &mut rx);
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        // The event poll blocks this thread for up to one tick; yield so
        // spawned fetches make progress on a current-thread runtime too.
        tokio::task::yield_now().await;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let effect = tui_app.handle_key(key, &config.keybindings);
                dispatch(effect, &mut tui_app, &mut sharer, ctx.fetcher.clone(), &tx);
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn drain_completions(tui_app: &mut TuiApp, rx: &mut UnboundedReceiver<Completion>) {
    while let Ok(completion) = rx.try_recv() {
        tui_app.apply_completion(completion);
    }
}

fn dispatch(
    effect: Effect,
    tui_app: &mut TuiApp,
    sharer: &mut Sharer,
    fetcher: Arc<ArticleFetcher>,
    tx: &UnboundedSender<Completion>,
) {
    match effect {
        Effect::None | Effect::Quit => {}
        Effect::Load(request) => {
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = fetcher.fetch(&request.url).await;
                // The receiver only goes away when the UI is shutting down.
                let _ = tx.send(Completion::Load(request.ticket, result));
            });
        }
        Effect::Search(request) => {
            let tx = tx.clone();
            tokio::spawn(async move {
                let hits = search_feeds(&fetcher, &request.targets, &request.query).await;
                let _ = tx.send(Completion::Search(request.ticket, hits));
            });
        }
        Effect::Share(card) => {
            let message = sharer.share(&card);
            tui_app.set_status(message);
        }
        Effect::Open(card) => {
            let message = sharer.open_link(&card);
            tui_app.set_status(message);
        }
    }
}
