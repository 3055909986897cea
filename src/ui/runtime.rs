use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::config::{Config, ViewMode};
use crate::gateway::RestGateway;
use crate::model::TodoFilter;
use crate::realtime::{FeedTopic, RealtimeFeed};
use crate::shutdown::ShutdownHandle;
use crate::store::TodoStore;
use crate::ui::app::App;
use crate::ui::commands::{run_executor, COMMAND_QUEUE};
use crate::ui::events::{AppEvent, EventHandler};
use crate::ui::input::handle_key;
use crate::ui::layout::body_rect;
use crate::ui::render::draw;
use crate::ui::terminal_guard::setup_terminal;

const TICK_RATE: Duration = Duration::from_millis(250);
/// Upper bound on leaving the change feed at exit.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Startup choices that may come from the config file or the command line.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub filter: TodoFilter,
    pub view: ViewMode,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            filter: config.defaults.filter,
            view: config.defaults.view,
        }
    }
}

pub async fn run(config: Config, options: RunOptions) -> anyhow::Result<()> {
    let gateway = RestGateway::new(&config).context("Failed to set up the todo service client")?;
    tracing::info!(endpoint = %gateway.endpoint(), "todo service configured");
    let store = TodoStore::new(Arc::new(gateway));
    store.set_filter(options.filter);

    let shutdown = ShutdownHandle::new();
    tokio::spawn(shutdown.clone().listen_for_signals());

    let realtime = config.realtime.enabled;
    let session = if realtime {
        let feed = RealtimeFeed::new(&config).context("Failed to set up the change feed")?;
        Some(store.mount(Arc::new(feed), FeedTopic::from_config(&config)))
    } else {
        tracing::info!("change feed disabled; refreshing on demand");
        let store = store.clone();
        tokio::spawn(async move { store.refresh().await });
        None
    };

    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
    tokio::spawn(run_executor(store.clone(), command_rx, !realtime));

    let (mut terminal, guard) = setup_terminal()?;
    let mut app = App::new(options.view);
    app.set_command_sender(command_tx);
    app.on_store_update(store.snapshot());
    if let Ok((cols, rows)) = crossterm::terminal::size() {
        resize(&mut app, cols, rows);
    }
    let mut events = EventHandler::new(TICK_RATE, store.subscribe(), shutdown.clone());

    loop {
        terminal.draw(|frame| draw(frame, &app))?;
        if app.should_quit() {
            break;
        }

        match events.next().await {
            Some(AppEvent::Key(key)) => handle_key(&mut app, key),
            Some(AppEvent::Paste(text)) => app.on_paste(&text),
            Some(AppEvent::Resize(cols, rows)) => resize(&mut app, cols, rows),
            Some(AppEvent::Store(state)) => app.on_store_update(state),
            Some(AppEvent::Tick) => {}
            Some(AppEvent::Shutdown) | None => break,
        }
    }

    drop(events);
    drop(guard);
    shutdown.signal();
    if let Some(session) = session {
        if tokio::time::timeout(CLOSE_TIMEOUT, session.close()).await.is_err() {
            tracing::warn!("change feed did not close in time");
        }
    }
    Ok(())
}

fn resize(app: &mut App, cols: u16, rows: u16) {
    let body = body_rect(Rect {
        x: 0,
        y: 0,
        width: cols,
        height: rows,
    });
    app.on_resize(body.width.max(1), body.height.max(1));
}
