// src/session.rs
//
// The session store is the single source of truth for the chat view: an
// ordered message sequence, the pending flag, and a declarative error field.
// It only changes by applying events, which the dispatch functions below emit
// from the worker task.

use crate::api::ChatApi;
use crate::config::Config;
use crate::errors::{CoinchatError, CoinchatResult};
use crate::models::Message;
use log::{error, info};
use tokio::sync::mpsc;

/// Outbound work queued by the view.
#[derive(Debug, Clone)]
pub enum Command {
    /// Ask the market-data bot (JWT-guarded endpoint).
    AskBot { prompt: String },
    /// Send a support-chat message; the backend persists it and replies.
    SendChat { content: String },
    /// Replace the message sequence with the server-side history.
    LoadHistory,
}

/// State transitions of one chat session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// An exchange started; carries the optimistic user entry.
    RequestStarted(Message),
    /// The exchange settled successfully with a reply.
    RequestCompleted(Message),
    /// The exchange settled with a failure, reduced to one string.
    RequestFailed(String),
    HistoryLoaded(Vec<Message>),
    HistoryFailed(String),
}

#[derive(Debug, Default)]
pub struct SessionStore {
    pub messages: Vec<Message>,
    pub pending: bool,
    pub error: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event. `pending` is true exactly between a
    /// `RequestStarted` and its terminal event; a failed exchange leaves the
    /// optimistic user message in place, unconfirmed by the server.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::RequestStarted(message) => {
                self.error = None;
                self.pending = true;
                self.messages.push(message);
            }
            SessionEvent::RequestCompleted(message) => {
                self.pending = false;
                self.messages.push(message);
            }
            SessionEvent::RequestFailed(message) => {
                self.pending = false;
                self.error = Some(message);
            }
            SessionEvent::HistoryLoaded(messages) => {
                self.messages = messages;
            }
            SessionEvent::HistoryFailed(message) => {
                self.error = Some(message);
            }
        }
    }
}

async fn emit(events: &mpsc::Sender<SessionEvent>, event: SessionEvent) -> CoinchatResult<()> {
    events
        .send(event)
        .await
        .map_err(|_| CoinchatError::Channel("session event receiver dropped".to_string()))
}

/// One bot exchange: exactly one `RequestStarted` before the call, exactly one
/// terminal event after it. A whitespace-only prompt emits nothing.
pub async fn send_prompt(
    api: &ChatApi,
    jwt: &str,
    sender: &str,
    prompt: &str,
    events: &mpsc::Sender<SessionEvent>,
) -> CoinchatResult<()> {
    if prompt.trim().is_empty() {
        return Ok(());
    }

    emit(events, SessionEvent::RequestStarted(Message::user(sender, prompt))).await?;

    match api.ask_bot(prompt, jwt).await {
        Ok(answer) => {
            emit(events, SessionEvent::RequestCompleted(Message::model(sender, answer))).await
        }
        Err(e) => {
            error!("bot exchange failed: {}", e);
            emit(events, SessionEvent::RequestFailed(e.user_message())).await
        }
    }
}

/// One support-chat exchange. The optimistic user entry is itself the request
/// body; the server's reply message is the completion payload.
pub async fn send_chat(
    api: &ChatApi,
    sender: &str,
    content: &str,
    events: &mpsc::Sender<SessionEvent>,
) -> CoinchatResult<()> {
    if content.trim().is_empty() {
        return Ok(());
    }

    let user_message = Message::user(sender, content);
    emit(events, SessionEvent::RequestStarted(user_message.clone())).await?;

    match api.send_message(&user_message).await {
        Ok(reply) => emit(events, SessionEvent::RequestCompleted(reply)).await,
        Err(e) => {
            error!("send failed: {}", e);
            emit(events, SessionEvent::RequestFailed(e.user_message())).await
        }
    }
}

/// Replaces the session with the server-side history. Failures surface
/// through the same error field as send failures.
pub async fn load_history(
    api: &ChatApi,
    user_id: &str,
    events: &mpsc::Sender<SessionEvent>,
) -> CoinchatResult<()> {
    match api.fetch_history(user_id).await {
        Ok(messages) => {
            info!("loaded {} history messages for {}", messages.len(), user_id);
            emit(events, SessionEvent::HistoryLoaded(messages)).await
        }
        Err(e) => {
            error!("history load failed: {}", e);
            emit(events, SessionEvent::HistoryFailed(e.user_message())).await
        }
    }
}

/// Worker loop: owns the API client, consumes commands from the view, and
/// answers with session events. Exits when either channel closes.
pub async fn run_worker(
    api: ChatApi,
    config: Config,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<SessionEvent>,
) {
    while let Some(command) = commands.recv().await {
        let result = match command {
            Command::AskBot { prompt } => {
                send_prompt(&api, &config.jwt, &config.user_id, &prompt, &events).await
            }
            Command::SendChat { content } => {
                send_chat(&api, &config.user_id, &content, &events).await
            }
            Command::LoadHistory => load_history(&api, &config.user_id, &events).await,
        };

        if result.is_err() {
            // The UI side hung up.
            break;
        }
    }
}
