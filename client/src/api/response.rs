//! Turns HTTP responses into typed results or a uniform error.

use crate::error::{ClientError, Result, GENERIC_NETWORK_MESSAGE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Read the body and decode it as `T`, or map a failure status to `Api`
pub async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    decode_body(status, &body)
}

/// Check the status only; the body of a successful response is ignored
pub async fn expect_success(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.bytes().await?;
    Err(error_from_body(status, &body))
}

pub fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }
    serde_json::from_slice(body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

/// Build the `Api` error for a failed response
///
/// The message comes from the body's `message` field. A body that is not
/// JSON yields the generic network message; JSON without a usable
/// `message` yields `HTTP <status>`.
pub fn error_from_body(status: StatusCode, body: &[u8]) -> ClientError {
    let message = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
        }) if !message.is_empty() => message,
        Ok(_) => format!("HTTP {}", status.as_u16()),
        Err(_) => GENERIC_NETWORK_MESSAGE.to_string(),
    };
    log::debug!("Request failed with {}: {}", status, message);

    ClientError::Api {
        message,
        status: status.as_u16(),
    }
}
