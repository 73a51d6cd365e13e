use crate::app::{App, AppScreen};
use crate::constants::BOT_COMMAND_PREFIX;
use crate::errors::{CoinchatError, CoinchatResult};
use crate::session::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub async fn handle_chat_input(key: KeyEvent, app: &mut App) -> CoinchatResult<()> {
    match key.code {
        KeyCode::Esc => {
            app.screen = AppScreen::QuitConfirm;
        }
        KeyCode::Enter => {
            submit(app).await?;
        }
        KeyCode::PageUp => app.scroll_up(),
        KeyCode::PageDown => app.scroll_down(),
        KeyCode::Backspace => {
            if !app.session.pending {
                app.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'c' => app.screen = AppScreen::QuitConfirm,
                    'r' => queue(app, Command::LoadHistory).await?,
                    'u' => app.scroll_up(),
                    'd' => app.scroll_down(),
                    _ => {}
                }
            } else if !app.session.pending {
                app.input.push(c);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Submits the input buffer. Nothing happens while an exchange is pending or
/// when the buffer is blank; a `/coin ` prefix routes to the market-data bot.
async fn submit(app: &mut App) -> CoinchatResult<()> {
    if app.session.pending {
        return Ok(());
    }

    let text = app.input.trim().to_string();
    if text.is_empty() {
        return Ok(());
    }

    let command = match text.strip_prefix(BOT_COMMAND_PREFIX) {
        Some(prompt) => Command::AskBot {
            prompt: prompt.to_string(),
        },
        None => Command::SendChat { content: text },
    };

    app.input.clear();
    queue(app, command).await
}

async fn queue(app: &App, command: Command) -> CoinchatResult<()> {
    app.commands
        .send(command)
        .await
        .map_err(|_| CoinchatError::Channel("command receiver dropped".to_string()))
}

pub fn handle_quit_confirm_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.screen = AppScreen::Quit;
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.screen = AppScreen::Chat;
        }
        _ => {}
    }
}
