//! # Client Error Types
//!
//! Error types for everything that crosses a process boundary: the inventory
//! API, the credential file, the config file and the code decoder.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Session     │  │     Remote      │  │       Local             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Auth           │  │  Connection     │  │  Validation             │ │
//! │  │  Unauthorized   │  │  Timeout        │  │  Decode                 │ │
//! │  │  Unauthenticated│  │  Status         │  │  Storage                │ │
//! │  │  SessionChanged │  │  NotFound       │  │  Config / InvalidUrl    │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Unauthorized (401 on an authenticated call) forces a logout.          │
//! │  SessionChanged (result outlived its session) is dropped silently.     │
//! │  Everything else is surfaced once as a Notification.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use railtrack_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering all failures outside the pure core.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Credentials were rejected at login.
    #[error("Login failed: {0}")]
    Auth(String),

    /// The server rejected the session token (HTTP 401).
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// A protected call was attempted without a session.
    #[error("Not logged in")]
    Unauthenticated,

    /// The session changed while the call was in flight; its result was dropped.
    #[error("Session changed before the request completed")]
    SessionChanged,

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// Record does not exist upstream (HTTP 404).
    #[error("Component not found: {0}")]
    NotFound(String),

    /// Could not reach the inventory API.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Any other non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Serialization(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Registration form or identifier failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Domain lookup or parsing failure.
    #[error(transparent)]
    Core(CoreError),

    /// The decoder could not read a code from the input.
    #[error("Could not read a code: {0}")]
    Decode(String),

    /// Credential file could not be read or written.
    #[error("Credential storage error: {0}")]
    Storage(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// API base URL could not be parsed or extended.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ClientError::Validation(v),
            CoreError::ComponentNotFound(id) => ClientError::NotFound(id),
            other => ClientError::Core(other),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Serialization(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::Connection(err.to_string())
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if repeating the same call may succeed.
    ///
    /// Nothing in this crate retries on its own; callers decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Connection(_) | ClientError::Timeout => true,
            ClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error must end the session.
    pub fn forces_logout(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(self, ClientError::Config(_) | ClientError::InvalidUrl(_))
    }

    /// Short text suitable for a toast or alert.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Auth(_) => "Login failed: Invalid username or password.".to_string(),
            ClientError::Connection(_) | ClientError::Timeout => {
                "Could not reach the inventory server. Check your connection.".to_string()
            }
            ClientError::Decode(_) => {
                "No code found. Please try again with a clearer image.".to_string()
            }
            ClientError::Status { .. } | ClientError::Serialization(_) => {
                "The inventory server could not complete the request.".to_string()
            }
            other => other.to_string(),
        }
    }
}
