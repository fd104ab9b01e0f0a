use thiserror::Error;

use crate::auth::{DecodeError, StoreError};

/// A response outside the 2xx range. The body is never read.
///
/// `status_text` is the canonical reason phrase for `status` (empty for
/// codes without one), not whatever phrase the server sent on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("HTTP {status} {status_text}")]
pub struct HttpError {
    pub status: u16,
    pub status_text: String,
}

impl HttpError {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Malformed credential: {0}")]
    Decode(#[from] DecodeError),

    #[error("Token store error: {0}")]
    Store(#[from] StoreError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Status code when the failure came from a non-success response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(e) => Some(e.status),
            _ => None,
        }
    }
}
