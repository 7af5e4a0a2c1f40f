//! Error types for the orchestrator library.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;

/// Comprehensive error type for all store and orchestrator operations.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: String },
    /// Phase name not present in the plan or phase graph
    #[error("Phase '{phase}' not found in plan {plan_id}")]
    PhaseNotFound { plan_id: String, phase: String },
    /// Task ID not present in the plan
    #[error("Task '{task_id}' not found in plan {plan_id}")]
    TaskNotFound { plan_id: String, task_id: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Operation attempted in an orchestrator state that does not allow it
    #[error("Cannot {operation} while orchestrator is {state}")]
    InvalidState { state: String, operation: String },
    /// The executor rejected a phase or task
    #[error("Execution of {target} failed: {message}")]
    Execution { target: String, message: String },
    /// A phase or task exceeded its configured budget
    #[error("Execution of {target} timed out after {budget:?}")]
    Timeout { target: String, budget: Duration },
    /// Cancellation was observed while running a phase or task
    #[error("Execution of {target} was cancelled")]
    Cancelled { target: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
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

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> OrchestratorError {
        OrchestratorError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl OrchestratorError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates an execution failure from any displayable executor error.
    pub fn execution(target: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Execution {
            target: target.into(),
            message: format!("{error:#}"),
        }
    }

    /// Whether the error is a validation failure. These are surfaced to the
    /// caller as-is and never retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::PlanNotFound { .. }
                | Self::PhaseNotFound { .. }
                | Self::TaskNotFound { .. }
                | Self::InvalidInput { .. }
                | Self::InvalidState { .. }
        )
    }

    /// Whether the error came from cancellation rather than a real failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Extension trait mapping I/O errors onto [`OrchestratorError::FileSystem`].
pub trait FsResultExt<T> {
    /// Attach the path the failing operation was working on.
    fn fs_context(self, path: &Path) -> Result<T>;
}

impl<T> FsResultExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, path: &Path) -> Result<T> {
        self.map_err(|source| OrchestratorError::FileSystem {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        let err = OrchestratorError::invalid_input("query").with_reason("must not be empty");
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Invalid input for field 'query': must not be empty"
        );

        let err = OrchestratorError::Timeout {
            target: "phase 'plan'".to_string(),
            budget: Duration::from_millis(250),
        };
        assert_eq!(
            err.to_string(),
            "Execution of phase 'plan' timed out after 250ms"
        );
        assert!(!err.is_validation());
        assert!(!err.is_cancellation());
    }

    #[test]
    fn test_execution_flattens_anyhow_chain() {
        let source = anyhow::anyhow!("connection reset").context("provider call");
        let err = OrchestratorError::execution("task 'task-2'", source);
        assert_eq!(
            err.to_string(),
            "Execution of task 'task-2' failed: provider call: connection reset"
        );
    }
}
