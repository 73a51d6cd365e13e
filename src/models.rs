// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message. The backend's history endpoint still emits the
/// legacy `BOT` tag for replies, which maps onto `Model` here.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageType {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "MODEL", alias = "BOT")]
    Model,
}

/// A single chat message.
///
/// The `id` is client-local and never crosses the wire; it exists so the view
/// can key messages on something stable rather than their position in the
/// sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(skip, default = "fresh_id")]
    pub id: Uuid,
    pub content: String,
    pub sender: String,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn fresh_id() -> Uuid {
    Uuid::new_v4()
}

impl Message {
    /// An optimistic user entry. No timestamp: the server stamps persisted
    /// messages, and the send body carries only content/sender/messageType.
    pub fn user(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Message {
            id: fresh_id(),
            content: content.into(),
            sender: sender.into(),
            message_type: MessageType::User,
            timestamp: None,
        }
    }

    /// A locally constructed model reply, stamped with the arrival time.
    pub fn model(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Message {
            id: fresh_id(),
            content: content.into(),
            sender: sender.into(),
            message_type: MessageType::Model,
            timestamp: Some(Utc::now()),
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.message_type == MessageType::User
    }
}

/// Request body for the market-data bot endpoint.
#[derive(Debug, Serialize)]
pub struct PromptBody {
    pub prompt: String,
}

/// Response body of the market-data bot endpoint.
#[derive(Debug, Deserialize)]
pub struct BotReply {
    pub message: String,
}

/// Logs details of each API call.
#[derive(Debug)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_body_wire_format() {
        let msg = Message::user("user123", "hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "content": "hello",
                "sender": "user123",
                "messageType": "USER",
            })
        );
    }

    #[test]
    fn test_history_message_deserializes() {
        let raw = json!({
            "content": "Hello! How can I help you today?",
            "sender": "user123",
            "messageType": "BOT",
            "timestamp": "2024-05-01T12:00:00Z",
        });
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.message_type, MessageType::Model);
        assert!(msg.timestamp.is_some());
    }

    #[test]
    fn test_deserialized_messages_get_distinct_ids() {
        let raw = r#"{"content":"a","sender":"u","messageType":"USER"}"#;
        let one: Message = serde_json::from_str(raw).unwrap();
        let two: Message = serde_json::from_str(raw).unwrap();
        assert_ne!(one.id, two.id);
    }
}
