use crate::log_view::LogView;
use crate::session::{Command, SessionEvent, SessionStore};
use crate::status_indicator::StatusIndicator;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Chat,
    QuitConfirm,
    Quit,
}

/// Top-level UI state. The session store is only mutated here, by applying
/// events drained from the worker task.
pub struct App {
    pub screen: AppScreen,
    pub session: SessionStore,
    pub input: String,
    pub chat_scroll: u16,
    /// Whether the view sticks to the newest message. Scrolling up detaches,
    /// scrolling back to the bottom reattaches.
    pub follow_bottom: bool,
    /// Largest valid scroll offset from the last draw, used to clamp.
    pub last_max_scroll: u16,
    pub status_indicator: StatusIndicator,
    pub logs: LogView,
    pub commands: mpsc::Sender<Command>,
    pub events: mpsc::Receiver<SessionEvent>,
    pub user_id: String,
}

impl App {
    pub fn new(
        user_id: String,
        commands: mpsc::Sender<Command>,
        events: mpsc::Receiver<SessionEvent>,
    ) -> App {
        App {
            screen: AppScreen::Chat,
            session: SessionStore::new(),
            input: String::new(),
            chat_scroll: 0,
            follow_bottom: true,
            last_max_scroll: 0,
            status_indicator: StatusIndicator::new(),
            logs: LogView::new(),
            commands,
            events,
            user_id,
        }
    }

    /// Applies every session event the worker has produced since the last
    /// tick, updating the status strip and activity log along the way.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match &event {
                SessionEvent::RequestStarted(_) => {
                    self.logs.add("Sending message...");
                    self.status_indicator.set_pending(true);
                    self.follow_bottom = true;
                }
                SessionEvent::RequestCompleted(_) => {
                    self.logs.add("Reply received");
                    self.status_indicator.set_pending(false);
                    self.follow_bottom = true;
                }
                SessionEvent::RequestFailed(msg) => {
                    self.logs.add(format!("Request failed: {}", msg));
                    self.status_indicator.set_pending(false);
                }
                SessionEvent::HistoryLoaded(messages) => {
                    self.logs.add(format!("Loaded {} history messages", messages.len()));
                    self.follow_bottom = true;
                }
                SessionEvent::HistoryFailed(msg) => {
                    self.logs.add(format!("History load failed: {}", msg));
                }
            }
            self.session.apply(event);
        }
    }

    pub fn scroll_up(&mut self) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.chat_scroll < self.last_max_scroll {
            self.chat_scroll += 1;
        }
        if self.chat_scroll >= self.last_max_scroll {
            self.follow_bottom = true;
        }
    }
}
