// API Constants
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const BOT_ENDPOINT: &str = "/api/chat/bot/coin";
pub const SEND_ENDPOINT: &str = "/api/chat/send";
pub const HISTORY_ENDPOINT: &str = "/api/chat/history";

/// Input prefix that routes a prompt to the market-data bot instead of the
/// support chat.
pub const BOT_COMMAND_PREFIX: &str = "/coin ";
