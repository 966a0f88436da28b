//! Client-side input checks, run before any request is sent.

use crate::error::{ClientError, Result, ValidationError};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_CHANNEL_NAME_LEN: usize = 100;
pub const MAX_CHANNEL_DESCRIPTION_LEN: usize = 500;

fn finish(errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation(errors))
    }
}

fn check_username(username: &str, errors: &mut Vec<ValidationError>) {
    if username.is_empty() {
        errors.push(ValidationError::UsernameRequired);
    } else if username.chars().count() < MIN_USERNAME_LEN {
        errors.push(ValidationError::UsernameTooShort);
    }
}

fn check_password(password: &str, errors: &mut Vec<ValidationError>) {
    if password.is_empty() {
        errors.push(ValidationError::PasswordRequired);
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(ValidationError::PasswordTooShort);
    }
}

/// Login form rules; every violated rule is reported, not just the first
pub fn validate_credentials(username: &str, password: &str) -> Result<()> {
    let mut errors = Vec::new();
    check_username(username, &mut errors);
    check_password(password, &mut errors);
    finish(errors)
}

pub fn validate_signup(username: &str, email: &str, password: &str) -> Result<()> {
    let mut errors = Vec::new();
    check_username(username, &mut errors);
    if email.trim().is_empty() {
        errors.push(ValidationError::EmailRequired);
    } else if !email.contains('@') {
        errors.push(ValidationError::EmailInvalid);
    }
    check_password(password, &mut errors);
    finish(errors)
}

pub fn validate_channel(name: &str, description: Option<&str>) -> Result<()> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(ValidationError::ChannelNameRequired);
    } else if name.chars().count() > MAX_CHANNEL_NAME_LEN {
        errors.push(ValidationError::ChannelNameTooLong);
    }
    if description.is_some_and(|d| d.chars().count() > MAX_CHANNEL_DESCRIPTION_LEN) {
        errors.push(ValidationError::ChannelDescriptionTooLong);
    }
    finish(errors)
}

pub fn validate_message_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return finish(vec![ValidationError::MessageContentRequired]);
    }
    Ok(())
}
