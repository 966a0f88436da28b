/// Error types for the DevSync client.
/// Every failure a caller can see is one of these variants; callers match
/// on the variant instead of inspecting message text.

use std::fmt;
use std::io;
use thiserror::Error;

/// Message used when a failed response carries no decodable body
pub const GENERIC_NETWORK_MESSAGE: &str = "Network error";

/// A single client-side input rule that was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    UsernameRequired,
    UsernameTooShort,
    PasswordRequired,
    PasswordTooShort,
    EmailRequired,
    EmailInvalid,
    ChannelNameRequired,
    ChannelNameTooLong,
    ChannelDescriptionTooLong,
    MessageContentRequired,
}

impl ValidationError {
    /// Field the rule applies to, for per-field display
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::UsernameRequired | ValidationError::UsernameTooShort => "username",
            ValidationError::PasswordRequired | ValidationError::PasswordTooShort => "password",
            ValidationError::EmailRequired | ValidationError::EmailInvalid => "email",
            ValidationError::ChannelNameRequired | ValidationError::ChannelNameTooLong => "name",
            ValidationError::ChannelDescriptionTooLong => "description",
            ValidationError::MessageContentRequired => "content",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationError::UsernameRequired => "Username is required.",
            ValidationError::UsernameTooShort => "Username must be at least 3 characters.",
            ValidationError::PasswordRequired => "Password is required.",
            ValidationError::PasswordTooShort => "Password must be at least 6 characters.",
            ValidationError::EmailRequired => "Email is required.",
            ValidationError::EmailInvalid => "Email must be a valid address.",
            ValidationError::ChannelNameRequired => "Channel name is required.",
            ValidationError::ChannelNameTooLong => "Channel name must be at most 100 characters.",
            ValidationError::ChannelDescriptionTooLong => {
                "Channel description must be at most 500 characters."
            }
            ValidationError::MessageContentRequired => "Message content must not be empty.",
        };
        f.write_str(text)
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure before a response was obtained
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { message: String, status: u16 },

    /// Backend answered 2xx but the body did not decode
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Input rejected locally, no request was sent
    #[error("Validation failed: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ClientError {
    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short human-readable text suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Network(_) => GENERIC_NETWORK_MESSAGE.to_string(),
            ClientError::Validation(errors) => join_validation(errors),
            ClientError::NotAuthenticated => "Please sign in first.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<rusqlite::Error> for ClientError {
    fn from(err: rusqlite::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
