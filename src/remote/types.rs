//! Remote types — pin payloads, identifiers, and errors.
//!
//! Provider-neutral: the session core only sees these, never the wire
//! format of a particular service.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::image::ImageSource;
use crate::services::draft::DraftId;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while talking to the remote service or submitting a draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PinError {
    /// Transient failure: the remote was unreachable or overloaded.
    #[error("network error: {0}")]
    Network(String),

    /// The session or credentials were rejected; re-authentication required.
    #[error("authentication failed: status {status}")]
    Auth { status: u16, body: String },

    /// The remote rejected the payload (e.g. malformed link, unknown board).
    #[error("rejected by remote: status {status}")]
    Validation { status: u16, body: String },

    /// The draft was already pinned; resubmitting it is a local misuse.
    #[error("draft {0} is already pinned")]
    AlreadyPinned(DraftId),

    /// A request for the draft is still in flight.
    #[error("draft {0} is already being submitted")]
    AlreadySubmitting(DraftId),

    /// The remote answered with a body that could not be decoded.
    #[error("response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl PinError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth { status, body },
            408 | 429 | 500..=599 => Self::Network(format!("status {status}: {body}")),
            _ => Self::Validation { status, body },
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Auth { .. } => "E_AUTH",
            Self::Validation { .. } => "E_VALIDATION",
            Self::AlreadyPinned(_) => "E_ALREADY_PINNED",
            Self::AlreadySubmitting(_) => "E_ALREADY_SUBMITTING",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Only transient network failures are worth retrying.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier the remote assigns to a created pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(pub String);

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PAYLOAD
// =============================================================================

/// Everything needed to create one pin.
#[derive(Debug, Clone)]
pub struct PinPayload {
    pub image: Arc<ImageSource>,
    pub note: String,
    /// `None` when the draft's link was left blank.
    pub link: Option<String>,
    pub board_id: String,
}

// =============================================================================
// REMOTE SOURCE TRAIT
// =============================================================================

/// Authoritative board list and pin creation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait RemoteBoardSource: Send + Sync {
    /// Fetch every board the user can pin to.
    ///
    /// # Errors
    ///
    /// Returns [`PinError::Network`] or [`PinError::Auth`] on failure.
    async fn fetch_boards(&self) -> Result<Vec<Board>, PinError>;

    /// Create one pin.
    ///
    /// # Errors
    ///
    /// Returns [`PinError::Network`], [`PinError::Validation`] or
    /// [`PinError::Auth`] on failure.
    async fn create_pin(&self, payload: &PinPayload) -> Result<PinId, PinError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
