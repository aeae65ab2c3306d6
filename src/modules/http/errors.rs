use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::modules::auth::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The transport never produced a response
    Network,
    /// 401 or 403
    Authentication,
    /// Any other 4xx
    Validation,
    /// 5xx and anything unclassified
    Server,
    /// A successful response whose body did not match the expected shape
    Decode,
    /// The credential store could not persist the session
    Storage,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiErrorKind::Network => "network",
            ApiErrorKind::Authentication => "authentication",
            ApiErrorKind::Validation => "validation",
            ApiErrorKind::Server => "server",
            ApiErrorKind::Decode => "decode",
            ApiErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// The one error shape every API call resolves to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn network(detail: impl fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status: None,
            message: format!("Could not reach the server: {}", detail),
        }
    }

    /// A request rejected locally before reaching the server
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Validation,
            status: None,
            message: message.into(),
        }
    }

    pub fn decode(status: u16, detail: impl fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            status: Some(status),
            message: format!("Unexpected response from the server: {}", detail),
        }
    }

    /// Normalize a non-success response, preferring the server's `message` field
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ApiErrorKind::Authentication,
            400..=499 => ApiErrorKind::Validation,
            _ => ApiErrorKind::Server,
        };
        let message =
            server_message(body).unwrap_or_else(|| format!("Server error: {}", status));
        Self {
            kind,
            status: Some(status),
            message,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind == ApiErrorKind::Authentication
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self {
            kind: ApiErrorKind::Storage,
            status: None,
            message: format!("Could not save the session: {}", error),
        }
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
