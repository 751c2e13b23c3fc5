//! Normalized errors for calls to the auth and listing services.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::session::SessionError;

/// Errors that can occur when calling the StudentBnB services.
///
/// Every failure a caller sees is one of these, whatever shape the server
/// or the transport produced.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the request with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 401 or 403: missing, stale or insufficient credentials.
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    /// 404.
    #[error("{message}")]
    NotFound { message: String },

    /// No response reached the client.
    #[error("{0}")]
    Transport(String),

    /// A success response whose body could not be decoded.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// The stored session expired before the call was made.
    #[error("Your session has expired, please log in again")]
    SessionExpired,

    /// A path or base URL could not be turned into a request URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// The session store failed while establishing or clearing a session.
    #[error("Session storage error: {0}")]
    Session(#[source] SessionError),
}

impl ApiError {
    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Unauthorized { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Text to show the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Map a non-2xx response to an error.
    ///
    /// The message is the body's `error` field, then its `message` field,
    /// then the raw body text, then the status reason phrase.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => Self::NotFound { message },
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired => Self::SessionExpired,
            other => Self::Session(other),
        }
    }
}

/// Error body returned by the services.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    non_blank(parsed.error)
        .or_else(|| non_blank(parsed.message))
        .or_else(|| {
            let raw = body.trim();
            (!raw.is_empty()).then(|| raw.to_owned())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
        })
}
