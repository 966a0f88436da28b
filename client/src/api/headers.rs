//! Per-request header construction.

use crate::error::{ClientError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// `Content-Type: application/json`, plus `Authorization: Bearer <token>`
/// when a token is given
pub fn build_headers(token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ClientError::Storage("Stored auth token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
