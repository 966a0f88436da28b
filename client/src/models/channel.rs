/// Channel model for the DevSync client.

use super::User;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    pub created_by: User,
    #[serde(default)]
    pub members: Vec<User>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Channel {
    pub fn has_member(&self, user_id: i64) -> bool {
        self.members.iter().any(|m| m.id == user_id)
    }
}

/// Request body for creating a channel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChannel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_private: bool,
}

/// Channel as shown in a channel list
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelView {
    pub channel: Channel,
    /// Unread tracking is not provided by the backend yet
    pub unread: bool,
    pub last_message: String,
    /// Date of last activity, `YYYY-MM-DD`
    pub timestamp: String,
}

pub const NO_MESSAGES_PLACEHOLDER: &str = "No messages yet";

impl From<Channel> for ChannelView {
    fn from(channel: Channel) -> Self {
        let timestamp = channel.updated_at.format("%Y-%m-%d").to_string();
        ChannelView {
            channel,
            unread: false,
            last_message: NO_MESSAGES_PLACEHOLDER.to_string(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNEL_JSON: &str = r#"{
        "id": 3,
        "name": "general",
        "description": null,
        "isPrivate": false,
        "createdBy": {
            "id": 1, "username": "alice", "email": "a@x.com", "status": "ACTIVE",
            "isOnline": true, "createdAt": "2024-05-01T09:00:00", "updatedAt": "2024-05-01T09:00:00"
        },
        "members": [{
            "id": 1, "username": "alice", "email": "a@x.com", "status": "ACTIVE",
            "isOnline": true, "createdAt": "2024-05-01T09:00:00", "updatedAt": "2024-05-01T09:00:00"
        }],
        "createdAt": "2024-05-01T09:00:00",
        "updatedAt": "2024-06-12T17:45:10"
    }"#;

    #[test]
    fn test_channel_deserialization() {
        let channel: Channel = serde_json::from_str(CHANNEL_JSON).unwrap();
        assert_eq!(channel.name, "general");
        assert!(!channel.is_private);
        assert_eq!(channel.created_by.username, "alice");
        assert!(channel.has_member(1));
        assert!(!channel.has_member(2));
    }

    #[test]
    fn test_channel_view_defaults() {
        let channel: Channel = serde_json::from_str(CHANNEL_JSON).unwrap();
        let view = ChannelView::from(channel);
        assert!(!view.unread);
        assert_eq!(view.last_message, NO_MESSAGES_PLACEHOLDER);
        assert_eq!(view.timestamp, "2024-06-12");
    }

    #[test]
    fn test_new_channel_omits_missing_description() {
        let body = NewChannel {
            name: "random".to_string(),
            description: None,
            is_private: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"name": "random", "isPrivate": true}));
    }
}
