//! Error types and error code constants for rlink.
//!
//! The link engine itself never fails: an unresolvable link is "no result".
//! Errors only arise around it, when loading a snapshot or interpreting what
//! a caller asked for. `LinkError` collects those into one type suitable for
//! JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad selector, bad snapshot, bad config)
//! - `3`: Resolution errors (symbol not found, ambiguous, file not found)
//! - `10`: Internal errors (I/O failures, unexpected state)

use std::fmt;

use thiserror::Error;

use crate::memory::IndexError;
pub use crate::types::{Location, SymbolInfo};

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (symbol not found, ambiguous, file not found).
    ResolutionError = 3,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// No symbol matches the requested name or location.
    #[error("no symbol found for '{query}'")]
    SymbolNotFound { query: String },

    /// Several symbols match the requested selector.
    #[error("ambiguous symbol '{query}'")]
    AmbiguousSymbol {
        query: String,
        candidates: Vec<SymbolInfo>,
    },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Snapshot could not be loaded.
    #[error("invalid snapshot: {message}")]
    SnapshotError { message: String },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {message}")]
    ConfigError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&LinkError> for OutputErrorCode {
    fn from(err: &LinkError) -> Self {
        match err {
            LinkError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            LinkError::SymbolNotFound { .. } => OutputErrorCode::ResolutionError,
            LinkError::AmbiguousSymbol { .. } => OutputErrorCode::ResolutionError,
            LinkError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            LinkError::SnapshotError { .. } => OutputErrorCode::InvalidArguments,
            LinkError::ConfigError { .. } => OutputErrorCode::InvalidArguments,
            LinkError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<LinkError> for OutputErrorCode {
    fn from(err: LinkError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridge: IndexError -> LinkError
// ============================================================================

impl From<IndexError> for LinkError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Io(io_err) => LinkError::InternalError {
                message: format!("IO error: {}", io_err),
            },
            other => LinkError::SnapshotError {
                message: other.to_string(),
            },
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl LinkError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        LinkError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an invalid arguments error with JSON details.
    pub fn invalid_args_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        LinkError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a symbol not found error.
    pub fn symbol_not_found(query: impl Into<String>) -> Self {
        LinkError::SymbolNotFound {
            query: query.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        LinkError::FileNotFound { path: path.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        LinkError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
