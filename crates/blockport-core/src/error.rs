//! Error types and exit codes for blockport
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args)
//! - 3: Data error (missing graph, unknown block or page)
//! - 4: Nothing to export (filter or selection matched nothing)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the blockport CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - missing graph file, unknown block (3)
    Data = 3,
    /// The operation completed but produced nothing to export (4)
    Empty = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during blockport operations
#[derive(Error, Debug)]
pub enum BlockportError {
    // Usage errors (exit code 2)
    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data errors (exit code 3)
    #[error("graph not found: {path:?}")]
    GraphNotFound { path: PathBuf },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("block source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    // Empty results (exit code 4)
    #[error("nothing to export: {reason}")]
    NothingToExport { reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl BlockportError {
    /// Create an error for a failed operation
    pub fn failed_operation(operation: &str, error: impl std::fmt::Display) -> Self {
        BlockportError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        BlockportError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        BlockportError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        BlockportError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a collaborator that could not answer
    pub fn source_unavailable(reason: impl std::fmt::Display) -> Self {
        BlockportError::SourceUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Create an error for an operation whose result is empty
    pub fn nothing_to_export(reason: impl std::fmt::Display) -> Self {
        BlockportError::NothingToExport {
            reason: reason.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            BlockportError::UsageError(_)
            | BlockportError::InvalidValue { .. } => ExitCode::Usage,

            BlockportError::GraphNotFound { .. }
            | BlockportError::NotFound { .. }
            | BlockportError::SourceUnavailable { .. } => ExitCode::Data,

            BlockportError::NothingToExport { .. } => ExitCode::Empty,

            BlockportError::Io(_)
            | BlockportError::Json(_)
            | BlockportError::Toml(_)
            | BlockportError::FailedOperation { .. }
            | BlockportError::FailedOperationWithTarget { .. }
            | BlockportError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            BlockportError::UsageError(_) => "usage_error",
            BlockportError::InvalidValue { .. } => "invalid_value",
            BlockportError::GraphNotFound { .. } => "graph_not_found",
            BlockportError::NotFound { .. } => "not_found",
            BlockportError::SourceUnavailable { .. } => "source_unavailable",
            BlockportError::NothingToExport { .. } => "nothing_to_export",
            BlockportError::Io(_) => "io_error",
            BlockportError::Json(_) => "json_error",
            BlockportError::Toml(_) => "toml_error",
            BlockportError::FailedOperation { .. } => "failed_operation",
            BlockportError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            BlockportError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for blockport operations
pub type Result<T> = std::result::Result<T, BlockportError>;
