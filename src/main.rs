use anyhow::Context;
use coinchat::{
    api::ChatApi,
    chat_view, config, key_handlers, logging,
    session::{self, Command},
    App, AppScreen,
};
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

enum UiEvent {
    Input(CEvent),
    Tick,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    config::initialize_config().context("failed to initialize configuration")?;
    let config = config::get_config();
    let _logger = logging::init_logging(&config.log_level)?;
    info!("starting coinchat for user {}", config.user_id);

    let api = ChatApi::from_config(&config)?;
    let (command_tx, command_rx) = mpsc::channel::<Command>(32);
    let (event_tx, event_rx) = mpsc::channel(64);
    tokio::spawn(session::run_worker(api, config.clone(), command_rx, event_tx));

    let mut app = App::new(config.user_id, command_tx, event_rx);
    app.logs.add("Loading chat history...");
    app.commands
        .send(Command::LoadHistory)
        .await
        .context("worker task not running")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Main loop: drain worker events into the store, redraw, then wait for the
/// next input or tick.
async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<UiEvent>(100);

    // Input reader; polling keeps the channel alive with ticks so the spinner
    // animates while a request is in flight.
    tokio::spawn(async move {
        let mut last_tick = Instant::now();
        loop {
            if matches!(event::poll(Duration::from_millis(100)), Ok(true)) {
                if let Ok(event) = event::read() {
                    if tx.send(UiEvent::Input(event)).await.is_err() {
                        return;
                    }
                }
            }

            if last_tick.elapsed() >= Duration::from_millis(250) {
                if tx.send(UiEvent::Tick).await.is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });

    loop {
        app.drain_events();
        terminal.draw(|f| draw(f, &mut app))?;

        match rx.recv().await {
            Some(UiEvent::Input(CEvent::Key(key))) => match app.screen {
                AppScreen::Chat => key_handlers::handle_chat_input(key, &mut app).await?,
                AppScreen::QuitConfirm => key_handlers::handle_quit_confirm_input(key, &mut app),
                AppScreen::Quit => {}
            },
            Some(UiEvent::Input(_)) | Some(UiEvent::Tick) => {}
            None => break,
        }

        if app.screen == AppScreen::Quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &mut App) {
    chat_view::draw_chat(f, app);
    if app.screen == AppScreen::QuitConfirm {
        chat_view::draw_quit_confirm(f);
    }
}
