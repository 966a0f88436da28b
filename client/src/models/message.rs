/// Message model for the DevSync client.
///
/// On the wire a message carries both an optional `channel` and an optional
/// `recipient`. Exactly one is set, so the model folds them into
/// [`MessageTarget`] and rejects payloads that carry both or neither.

use super::User;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
    Audio,
    Video,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::Text => "TEXT",
            MessageType::Image => "IMAGE",
            MessageType::File => "FILE",
            MessageType::Audio => "AUDIO",
            MessageType::Video => "VIDEO",
        };
        f.write_str(name)
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(MessageType::Text),
            "IMAGE" => Ok(MessageType::Image),
            "FILE" => Ok(MessageType::File),
            "AUDIO" => Ok(MessageType::Audio),
            "VIDEO" => Ok(MessageType::Video),
            other => Err(format!("unknown message type: {}", other)),
        }
    }
}

/// Where a message was posted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTarget {
    Channel(i64),
    /// Direct message; holds the recipient's user id
    Direct(i64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "MessageWire")]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub sender: User,
    pub target: MessageTarget,
    /// Thread root, when this message is a reply
    pub parent_id: Option<i64>,
    pub replies: Vec<Message>,
    pub message_type: MessageType,
    pub is_edited: bool,
    pub edited_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Message {
    pub fn is_direct(&self) -> bool {
        matches!(self.target, MessageTarget::Direct(_))
    }
}

#[derive(Deserialize)]
struct IdRef {
    id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageWire {
    id: i64,
    content: String,
    sender: User,
    channel: Option<IdRef>,
    recipient: Option<IdRef>,
    parent_message: Option<IdRef>,
    #[serde(default)]
    replies: Vec<Message>,
    #[serde(rename = "type", default)]
    message_type: MessageType,
    #[serde(default)]
    is_edited: bool,
    edited_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<MessageWire> for Message {
    type Error = String;

    fn try_from(wire: MessageWire) -> Result<Self, Self::Error> {
        let target = match (wire.channel, wire.recipient) {
            (Some(channel), None) => MessageTarget::Channel(channel.id),
            (None, Some(recipient)) => MessageTarget::Direct(recipient.id),
            (Some(_), Some(_)) => {
                return Err(format!("message {} has both a channel and a recipient", wire.id))
            }
            (None, None) => {
                return Err(format!("message {} has neither a channel nor a recipient", wire.id))
            }
        };

        Ok(Message {
            id: wire.id,
            content: wire.content,
            sender: wire.sender,
            target,
            parent_id: wire.parent_message.map(|p| p.id),
            replies: wire.replies,
            message_type: wire.message_type,
            is_edited: wire.is_edited,
            edited_at: wire.edited_at,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        })
    }
}

/// Request body for posting a message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<i64>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        OutgoingMessage {
            content: content.into(),
            message_type: MessageType::Text,
            parent_message_id: None,
        }
    }

    pub fn in_reply_to(mut self, parent_id: i64) -> Self {
        self.parent_message_id = Some(parent_id);
        self
    }
}

/// Message as shown in a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub message: Message,
    pub is_current_user: bool,
    pub sender_avatar: String,
    /// Send time, `HH:MM`
    pub timestamp: String,
}

impl MessageView {
    pub fn new(message: Message, current_user_id: Option<i64>) -> Self {
        MessageView {
            is_current_user: current_user_id == Some(message.sender.id),
            sender_avatar: message.sender.avatar_initial(),
            timestamp: message.created_at.format("%H:%M").to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_json(id: i64, username: &str) -> serde_json::Value {
        json!({
            "id": id, "username": username, "email": format!("{}@x.com", username),
            "status": "ACTIVE", "isOnline": true,
            "createdAt": "2024-05-01T09:00:00", "updatedAt": "2024-05-01T09:00:00"
        })
    }

    fn message_json(channel: Option<i64>, recipient: Option<i64>) -> serde_json::Value {
        json!({
            "id": 10,
            "content": "hello",
            "sender": user_json(1, "alice"),
            "channel": channel.map(|id| json!({"id": id, "name": "general"})),
            "recipient": recipient.map(|id| user_json(id, "bob")),
            "parentMessage": null,
            "replies": [],
            "type": "TEXT",
            "isEdited": false,
            "editedAt": null,
            "createdAt": "2024-05-01T14:05:09",
            "updatedAt": "2024-05-01T14:05:09"
        })
    }

    #[test]
    fn test_channel_message_target() {
        let message: Message = serde_json::from_value(message_json(Some(3), None)).unwrap();
        assert_eq!(message.target, MessageTarget::Channel(3));
        assert!(!message.is_direct());
    }

    #[test]
    fn test_direct_message_target() {
        let message: Message = serde_json::from_value(message_json(None, Some(2))).unwrap();
        assert_eq!(message.target, MessageTarget::Direct(2));
        assert!(message.is_direct());
    }

    #[test]
    fn test_ambiguous_target_rejected() {
        assert!(serde_json::from_value::<Message>(message_json(Some(3), Some(2))).is_err());
        assert!(serde_json::from_value::<Message>(message_json(None, None)).is_err());
    }

    #[test]
    fn test_nested_replies_and_parent() {
        let mut root = message_json(Some(3), None);
        let mut reply = message_json(Some(3), None);
        reply["id"] = json!(11);
        reply["parentMessage"] = json!({"id": 10, "content": "hello"});
        root["replies"] = json!([reply]);

        let message: Message = serde_json::from_value(root).unwrap();
        assert_eq!(message.replies.len(), 1);
        assert_eq!(message.replies[0].parent_id, Some(10));
        assert_eq!(message.parent_id, None);
    }

    #[test]
    fn test_outgoing_message_body() {
        let body = serde_json::to_value(OutgoingMessage::text("hi")).unwrap();
        assert_eq!(body, json!({"content": "hi", "type": "TEXT"}));

        let reply = serde_json::to_value(OutgoingMessage::text("re").in_reply_to(4)).unwrap();
        assert_eq!(reply, json!({"content": "re", "type": "TEXT", "parentMessageId": 4}));
    }

    #[test]
    fn test_message_view() {
        let message: Message = serde_json::from_value(message_json(Some(3), None)).unwrap();
        let mine = MessageView::new(message.clone(), Some(1));
        assert!(mine.is_current_user);
        assert_eq!(mine.sender_avatar, "A");
        assert_eq!(mine.timestamp, "14:05");

        let theirs = MessageView::new(message, Some(2));
        assert!(!theirs.is_current_user);
        let anonymous = MessageView::new(theirs.message.clone(), None);
        assert!(!anonymous.is_current_user);
    }

    #[test]
    fn test_message_type_parsing() {
        assert_eq!("image".parse::<MessageType>(), Ok(MessageType::Image));
        assert!("gif".parse::<MessageType>().is_err());
        assert_eq!(MessageType::Video.to_string(), "VIDEO");
    }
}
