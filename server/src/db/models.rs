/// Data models for the database.
/// Records mirror table rows; DTOs are what goes over the wire.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const USER_STATUSES: [&str; 4] = ["ACTIVE", "AWAY", "DO_NOT_DISTURB", "OFFLINE"];
pub const MESSAGE_TYPES: [&str; 5] = ["TEXT", "IMAGE", "FILE", "AUDIO", "VIDEO"];

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
    pub status: String,
    pub is_online: bool,
    pub last_seen: Option<NaiveDateTime>,
    pub firebase_token: Option<String>,
    pub roles: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ChannelRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub created_by: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: i64,
    pub content: String,
    pub sender_id: i64,
    pub channel_id: Option<i64>,
    pub recipient_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub message_type: String,
    pub is_edited: bool,
    pub edited_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Response DTOs

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub status: String,
    pub is_online: bool,
    pub last_seen: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&UserRecord> for UserDto {
    fn from(user: &UserRecord) -> Self {
        UserDto {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_picture: user.profile_picture.clone(),
            status: user.status.clone(),
            is_online: user.is_online,
            last_seen: user.last_seen,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub created_by: UserDto,
    pub members: Vec<UserDto>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Thread root as embedded in a reply
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentMessageDto {
    pub id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i64,
    pub content: String,
    pub sender: UserDto,
    pub channel: Option<ChannelDto>,
    pub recipient: Option<UserDto>,
    pub parent_message: Option<ParentMessageDto>,
    pub replies: Vec<MessageDto>,
    #[serde(rename = "type")]
    pub message_type: String,
    pub is_edited: bool,
    pub edited_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto<T> {
    pub content: Vec<T>,
    pub total_elements: usize,
    pub total_pages: usize,
    pub last: bool,
    pub number: usize,
    pub size: usize,
}

impl<T> PageDto<T> {
    /// Wrap one page of rows; `total_elements` counts every page
    pub fn new(content: Vec<T>, total_elements: usize, page: usize, size: usize) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };
        PageDto {
            content,
            total_elements,
            total_pages,
            last: page.saturating_add(1) >= total_pages,
            number: page,
            size,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        MessageResponse {
            message: message.to_string(),
        }
    }
}

// Request DTOs

#[derive(Debug, Serialize, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub parent_message_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub status: String,
    pub is_online: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PageQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(0)
    }

    pub fn size(&self) -> usize {
        self.size.unwrap_or(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page() {
        let page = PageDto::new(vec![41, 42, 43, 44, 45], 45, 2, 20);
        assert_eq!(page.total_elements, 45);
        assert_eq!(page.total_pages, 3);
        assert!(page.last);
    }

    #[test]
    fn test_first_page_is_not_last() {
        let page = PageDto::new((1..=20).collect::<Vec<i32>>(), 45, 0, 20);
        assert_eq!(page.total_pages, 3);
        assert!(!page.last);
    }

    #[test]
    fn test_empty_page() {
        let page = PageDto::new(Vec::<i32>::new(), 0, 0, 20);
        assert_eq!(page.total_pages, 0);
        assert!(page.last);
    }

    #[test]
    fn test_page_number_at_usize_max() {
        let page = PageDto::new(Vec::<i32>::new(), 45, usize::MAX, 20);
        assert_eq!(page.number, usize::MAX);
        assert!(page.last);

        let unsized_page = PageDto::new(Vec::<i32>::new(), 45, usize::MAX, 0);
        assert_eq!(unsized_page.total_pages, 0);
        assert!(unsized_page.last);
    }

    #[test]
    fn test_message_request_accepts_camel_case() {
        let req: MessageRequest = serde_json::from_str(
            r#"{"content":"hi","type":"TEXT","parentMessageId":4}"#,
        )
        .unwrap();
        assert_eq!(req.message_type.as_deref(), Some("TEXT"));
        assert_eq!(req.parent_message_id, Some(4));
    }
}
