/// HTTP handlers module
/// Provides the REST endpoints and maps database failures onto HTTP responses

pub mod auth;
pub mod rest;

use crate::db::StoreError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

pub use rest::{
    channel_messages, create_channel, direct_messages, get_channels, health, join_channel,
    online_users, profile, send_channel_message, send_direct_message, signin, signout, signup,
    thread_replies, update_firebase_token, update_status,
};

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::BadCredentials
            | StoreError::UsernameTaken
            | StoreError::EmailTaken
            | StoreError::Rejected(_) => StatusCode::BAD_REQUEST,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}
