/// Data models for the DevSync client.
/// Defines User, Channel, Message and the request/response envelopes.

pub mod channel;
pub mod message;
pub mod user;

pub use channel::{Channel, ChannelView, NewChannel};
pub use message::{Message, MessageTarget, MessageType, MessageView, OutgoingMessage};
pub use user::{User, UserStatus};

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One page of a larger, ordered collection
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            last: self.last,
        }
    }
}

/// Which page to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        PageRequest { page, size }
    }

    pub fn first() -> Self {
        Self::default()
    }

    pub fn page(page: u32) -> Self {
        PageRequest {
            page,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Sign-in request body
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Sign-up request body
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Sign-in response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Plain `{ "message": ... }` acknowledgement
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_deserialization_ignores_extra_fields() {
        let page: Page<i32> = serde_json::from_str(
            r#"{"content":[3,2,1],"totalElements":23,"totalPages":2,"last":false,"number":0,"size":20}"#,
        )
        .unwrap();
        assert_eq!(page.content, vec![3, 2, 1]);
        assert_eq!(page.total_elements, 23);
        assert!(!page.last);
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page {
            content: vec![1, 2],
            total_elements: 2,
            total_pages: 1,
            last: true,
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.content, vec![10, 20]);
        assert!(mapped.last);
    }

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::first(), PageRequest::new(0, 20));
        assert_eq!(PageRequest::page(3).size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_auth_response_deserialization() {
        let auth: AuthResponse = serde_json::from_str(
            r#"{"accessToken":"abc","tokenType":"Bearer","id":7,"username":"bob","email":"b@x.com","roles":[]}"#,
        )
        .unwrap();
        assert_eq!(auth.access_token, "abc");
        assert_eq!(auth.id, 7);
        assert!(auth.roles.is_empty());
    }
}
