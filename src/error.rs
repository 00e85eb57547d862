//! Error types for scribe
//!
//! Every failure in the adapters and the pipeline is a [`ScribeError`]. The
//! registry boundary (MCP tools and HTTP routes) only ever looks at
//! [`ScribeError::kind`], which is the closed set of externally visible
//! error kinds.

use serde::Serialize;
use thiserror::Error;

/// Externally visible error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Missing or malformed input field
    ValidationFailed,
    /// Bad WordPress or LLM credentials
    AuthenticationFailed,
    /// LLM response did not parse into the expected shape
    ContentMalformed,
    /// Network failure or 5xx from an external API
    RemoteUnavailable,
    /// Referenced post or term does not exist
    NotFound,
    /// A 4xx from WordPress or the LLM API other than auth/not-found
    ValidationRejected,
    /// Configuration or serialization fault inside this process
    Internal,
}

impl ErrorKind {
    /// Stable string form used in response bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationFailed => "ValidationFailed",
            ErrorKind::AuthenticationFailed => "AuthenticationFailed",
            ErrorKind::ContentMalformed => "ContentMalformed",
            ErrorKind::RemoteUnavailable => "RemoteUnavailable",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ValidationRejected => "ValidationRejected",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for scribe operations
#[derive(Error, Debug)]
pub enum ScribeError {
    /// Input failed shape validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote API refused our credentials
    #[error("Authentication failed ({service}): {message}")]
    AuthenticationFailed {
        service: &'static str,
        message: String,
    },

    /// Referenced resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote API rejected the request with a 4xx
    #[error("{service} rejected the request ({status}): {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Remote API is unreachable or answered with a 5xx
    #[error("{service} unavailable: {message}")]
    RemoteUnavailable {
        service: &'static str,
        message: String,
    },

    /// LLM completion did not match the required JSON shape
    #[error("Generated content malformed: {0}")]
    ContentMalformed(String),

    /// No API key configured for the content generator
    #[error("Content generator not configured (set ANTHROPIC_API_KEY)")]
    GeneratorUnavailable,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// MCP protocol error
    #[error("MCP protocol error: {0}")]
    McpProtocol(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl ScribeError {
    /// Classify this error for the registry boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScribeError::Validation(_) => ErrorKind::ValidationFailed,
            ScribeError::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            ScribeError::NotFound(_) => ErrorKind::NotFound,
            ScribeError::Rejected { .. } => ErrorKind::ValidationRejected,
            ScribeError::RemoteUnavailable { .. } | ScribeError::GeneratorUnavailable => {
                ErrorKind::RemoteUnavailable
            }
            ScribeError::ContentMalformed(_) => ErrorKind::ContentMalformed,
            ScribeError::Config(_)
            | ScribeError::Io(_)
            | ScribeError::Serialization(_)
            | ScribeError::McpProtocol(_)
            | ScribeError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        ScribeError::Validation(message.into())
    }
}

/// Result type alias for scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Convert anyhow::Error to ScribeError
impl From<anyhow::Error> for ScribeError {
    fn from(err: anyhow::Error) -> Self {
        ScribeError::Other(err.to_string())
    }
}
