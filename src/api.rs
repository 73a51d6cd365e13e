use crate::{
    config::Config,
    constants::{BOT_ENDPOINT, HISTORY_ENDPOINT, SEND_ENDPOINT},
    errors::{CoinchatError, CoinchatResult, GENERIC_ERROR},
    logging::log_api_call,
    models::{ApiCallLog, BotReply, Message, PromptBody},
};
use chrono::Utc;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::{Duration, Instant};

/// HTTP client for the chat backend. The base URL is injectable so tests can
/// point it at a mock server.
#[derive(Debug, Clone)]
pub struct ChatApi {
    client: Client,
    base_url: String,
}

impl ChatApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CoinchatResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoinchatError::api_error(format!("Failed to build client: {}", e)))?;

        Ok(ChatApi {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> CoinchatResult<Self> {
        ChatApi::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Asks the market-data bot a question. Requires bearer authorization.
    pub async fn ask_bot(&self, prompt: &str, jwt: &str) -> CoinchatResult<String> {
        let started = Instant::now();
        let url = format!("{}{}", self.base_url, BOT_ENDPOINT);

        let result = self
            .client
            .post(&url)
            .bearer_auth(jwt)
            .json(&PromptBody {
                prompt: prompt.to_string(),
            })
            .send()
            .await;

        let response = fail_on_status(self.settle(BOT_ENDPOINT, prompt, started, result)?).await?;
        let reply: BotReply = response
            .json()
            .await
            .map_err(|e| CoinchatError::api_error(format!("Failed to parse API response: {}", e)))?;

        Ok(reply.message)
    }

    /// Sends a user message to the support chat; the backend persists it and
    /// answers with the bot's reply as a full message.
    pub async fn send_message(&self, message: &Message) -> CoinchatResult<Message> {
        let started = Instant::now();
        let url = format!("{}{}", self.base_url, SEND_ENDPOINT);

        let result = self.client.post(&url).json(message).send().await;

        let response =
            fail_on_status(self.settle(SEND_ENDPOINT, &message.content, started, result)?).await?;
        response
            .json()
            .await
            .map_err(|e| CoinchatError::api_error(format!("Failed to parse API response: {}", e)))
    }

    /// Fetches the full chat history for a user, oldest first.
    pub async fn fetch_history(&self, user_id: &str) -> CoinchatResult<Vec<Message>> {
        let started = Instant::now();
        let url = format!("{}{}/{}", self.base_url, HISTORY_ENDPOINT, user_id);

        let result = self.client.get(&url).send().await;

        let response =
            fail_on_status(self.settle(HISTORY_ENDPOINT, user_id, started, result)?).await?;
        response
            .json()
            .await
            .map_err(|e| CoinchatError::api_error(format!("Failed to parse API response: {}", e)))
    }

    /// Logs the call and reduces transport and HTTP-level failures to an
    /// error carrying one user-facing string.
    fn settle(
        &self,
        endpoint: &str,
        summary: &str,
        started: Instant,
        result: reqwest::Result<Response>,
    ) -> CoinchatResult<Response> {
        let status = match &result {
            Ok(response) => response.status().as_u16(),
            Err(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
        };

        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint: endpoint.to_string(),
            request_summary: truncate_summary(summary),
            response_status: status,
            response_time_ms: started.elapsed().as_millis(),
        });

        result.map_err(|e| {
            let text = e.to_string();
            if text.trim().is_empty() {
                CoinchatError::api_error(GENERIC_ERROR)
            } else {
                CoinchatError::api_error(text)
            }
        })
    }
}

/// Rejects non-2xx responses, preferring the server's own `message` field over
/// the bare status line.
async fn fail_on_status(response: Response) -> CoinchatResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = format!("Request failed with status {}", status);
    let body = response.text().await.unwrap_or_default();
    Err(CoinchatError::api_error(extract_error_message(
        &body, &fallback,
    )))
}

/// Pulls a server-provided message out of an error body, mirroring the
/// extraction ladder: server `message` field, else the caller's fallback.
pub fn extract_error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Trims a log summary to 120 characters, cutting on a char boundary so
/// multibyte content never splits mid-character.
fn truncate_summary(summary: &str) -> String {
    match summary.char_indices().nth(120) {
        Some((cut, _)) => format!("{}...", &summary[..cut]),
        None => summary.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageType;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn api_for(server: &MockServer) -> ChatApi {
        ChatApi::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_ask_bot_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat/bot/coin"))
            .and(header("authorization", "Bearer test-jwt"))
            .and(body_json(json!({ "prompt": "btc price" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Bitcoin current price: $64,000.00"
            })))
            .mount(&mock_server)
            .await;

        let api = api_for(&mock_server).await;
        let reply = api.ask_bot("btc price", "test-jwt").await.unwrap();
        assert_eq!(reply, "Bitcoin current price: $64,000.00");
    }

    #[tokio::test]
    async fn test_ask_bot_http_error_uses_status_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat/bot/coin"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let api = api_for(&mock_server).await;
        let err = api.ask_bot("hello", "jwt").await.unwrap_err();
        assert!(err.user_message().contains("500"));
    }

    #[tokio::test]
    async fn test_ask_bot_server_message_wins() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat/bot/coin"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "jwt expired",
                "status": false,
            })))
            .mount(&mock_server)
            .await;

        let api = api_for(&mock_server).await;
        let err = api.ask_bot("hello", "stale-jwt").await.unwrap_err();
        assert_eq!(err.user_message(), "jwt expired");
    }

    #[tokio::test]
    async fn test_ask_bot_transport_error_has_text() {
        // Nothing is listening here; the connection is refused immediately.
        let api = ChatApi::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = api.ask_bot("hello", "jwt").await.unwrap_err();
        assert!(!err.user_message().is_empty());
    }

    #[tokio::test]
    async fn test_send_message_posts_wire_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .and(body_json(json!({
                "content": "hello",
                "sender": "user123",
                "messageType": "USER",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": "Hello! How can I help you today?",
                "sender": "user123",
                "messageType": "BOT",
            })))
            .mount(&mock_server)
            .await;

        let api = api_for(&mock_server).await;
        let reply = api
            .send_message(&Message::user("user123", "hello"))
            .await
            .unwrap();
        assert_eq!(reply.message_type, MessageType::Model);
        assert_eq!(reply.content, "Hello! How can I help you today?");
    }

    #[tokio::test]
    async fn test_fetch_history_returns_all_messages() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/chat/history/user123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "content": "hi", "sender": "user123", "messageType": "USER" },
                { "content": "hello", "sender": "user123", "messageType": "BOT" },
                { "content": "thanks", "sender": "user123", "messageType": "USER" },
            ])))
            .mount(&mock_server)
            .await;

        let api = api_for(&mock_server).await;
        let history = api.fetch_history("user123").await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].message_type, MessageType::Model);
    }

    #[test]
    fn test_truncate_summary_cuts_on_char_boundary() {
        // Byte 120 lands inside a two-byte character here.
        let summary = format!("a{}", "é".repeat(130));
        let truncated = truncate_summary(&summary);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 123);
    }

    #[test]
    fn test_truncate_summary_keeps_short_input() {
        assert_eq!(truncate_summary("btc price"), "btc price");
    }

    #[test]
    fn test_extract_error_message_prefers_server_message() {
        let body = r#"{"message":"jwt expired","status":false}"#;
        assert_eq!(extract_error_message(body, "fallback"), "jwt expired");
    }

    #[test]
    fn test_extract_error_message_falls_back() {
        assert_eq!(extract_error_message("<html>oops</html>", "fallback"), "fallback");
        assert_eq!(extract_error_message(r#"{"message":""}"#, "fallback"), "fallback");
    }
}
