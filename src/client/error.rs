//! Errors returned by the backend API client.

use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;

/// Failure of a single backend call.
///
/// `Clone` so a failed fetch can be handed to every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No response was received (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Message suitable for a user-visible notice.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "We couldn't reach the server. Please check your connection and try again."
                    .to_string()
            }
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Decode(_) => "The server sent an unexpected response.".to_string(),
        }
    }

    /// Build an `Api` error from a failed response body.
    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = parse_error_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// The inner error object of an `{ "error": { ... } }` envelope
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

/// Error shapes the backend is known to produce
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorResponse {
    Envelope { error: ErrorBody },
    Message { message: String },
    Bare { error: String },
}

fn parse_error_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let message = match serde_json::from_slice::<ErrorResponse>(body).ok()? {
        ErrorResponse::Envelope { error } => error.message,
        ErrorResponse::Message { message } => message,
        ErrorResponse::Bare { error } => error,
    };
    let message = message.trim().to_string();
    (!message.is_empty()).then_some(message)
}
