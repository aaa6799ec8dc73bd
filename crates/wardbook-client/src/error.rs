//! Error type for API calls.
//!
//! Server-provided messages are carried verbatim whenever the error body
//! has one; callers supply a per-operation fallback for the rest. A 401
//! is kept as its own variant so the session layer can tear the session
//! down instead of showing a notification.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  /// The server rejected the credentials or the bearer token.
  #[error("{0}")]
  Unauthorized(String),

  /// Any other non-success response, message verbatim when present.
  #[error("{message}")]
  Server { status: u16, message: String },

  /// The server answered 2xx but the body was not what the endpoint
  /// promises (e.g. an access token whose claims cannot be read).
  #[error("malformed server response: {0}")]
  BadResponse(String),

  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("token storage: {0}")]
  TokenStorage(#[from] std::io::Error),
}

impl ApiError {
  pub fn is_unauthorized(&self) -> bool {
    matches!(self, ApiError::Unauthorized(_))
  }
}

/// The error body shapes the server uses: `{"error": …}` from auth
/// endpoints, `{"message": …}` from the patient API.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
  #[serde(default)]
  pub error:   Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

impl ErrorBody {
  pub fn into_message(self) -> Option<String> {
    self.error.or(self.message).filter(|m| !m.is_empty())
  }
}
