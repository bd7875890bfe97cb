//! Error types for the cutover library.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for all plan, execution and workflow operations.
#[derive(Error, Debug)]
pub enum CutoverError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: u64 },
    /// Execution not found for the given ID
    #[error("Execution with ID {id} not found")]
    ExecutionNotFound { id: u64 },
    /// Execution step not found for the given ID
    #[error("Step with ID {id} not found")]
    StepNotFound { id: u64 },
    /// Approval record not found for the given ID
    #[error("Approval with ID {id} not found")]
    ApprovalNotFound { id: u64 },
    /// Execution member not found for the given ID
    #[error("Member with ID {id} not found")]
    MemberNotFound { id: u64 },
    /// A workflow rule forbids the requested transition
    #[error("Precondition failed: {reason}")]
    PreconditionFailed { reason: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> CutoverError {
        CutoverError::Database {
            message: self.message,
            source,
        }
    }
}

impl CutoverError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a precondition failure with the given reason.
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            reason: reason.into(),
        }
    }

    /// Creates an input validation failure for a field.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a `spawn_blocking` join failure.
    pub(crate) fn task_join(error: &tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {error}"),
        }
    }

    /// Whether the error reports a missing plan, execution, step, approval or
    /// member.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PlanNotFound { .. }
                | Self::ExecutionNotFound { .. }
                | Self::StepNotFound { .. }
                | Self::ApprovalNotFound { .. }
                | Self::MemberNotFound { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| CutoverError::database(message).with_source(e))
    }
}

/// Result type alias for cutover operations
pub type Result<T> = std::result::Result<T, CutoverError>;
