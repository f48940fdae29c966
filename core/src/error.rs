//! Error taxonomy shared by every vehicle and brand operation.
//!
//! # Design
//! One closed enum covers URL construction, transport, missing response,
//! empty body, unexpected status and JSON failures. Reads and writes both
//! surface it; `message` renders the text the list screen shows.

use thiserror::Error;

/// Errors returned by `CarsClient`, `Transport` implementations and `Rest`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CarError {
    /// The endpoint URL could not be built or is not an absolute http(s) URL.
    #[error("invalid URL: {0}")]
    Url(String),

    /// The request never produced an HTTP response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A response arrived but could not be read.
    #[error("no response")]
    NoResponse,

    /// The response body was empty.
    #[error("empty response body")]
    NoData,

    /// The server answered with a status other than the expected one.
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The record could not be encoded as JSON; no request was sent.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl CarError {
    /// Text shown in the list's background label or an alert.
    pub fn message(&self) -> String {
        match self {
            CarError::Url(_) => "InvalidURL".to_string(),
            CarError::Transport(cause) => cause.clone(),
            CarError::NoResponse => "noResponse".to_string(),
            CarError::NoData => "noData".to_string(),
            CarError::Status { code, .. } => format!("Server error: [Error code: {code}]"),
            CarError::InvalidJson(_) | CarError::Serialization(_) => "invalidJSON".to_string(),
        }
    }

    /// The HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CarError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
