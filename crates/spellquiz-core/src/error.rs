//! Quiz error types.
//!
//! Every failure the core can report is synchronous and raised at the point
//! of violation. Nothing here is retried: the core performs no I/O of its own.

use thiserror::Error;

/// Errors raised while compiling tasks or driving a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// A raw task field is missing, mis-typed, or outside its allowed range.
    #[error("task {task}: field `{field}`: {message}")]
    Validation {
        task: String,
        field: String,
        message: String,
    },

    /// An operation was invoked outside its legal session state.
    #[error("sequence error: {0}")]
    Sequence(String),

    /// A submitted letter, variant, tile, or mapping is not a valid choice.
    #[error("invalid choice: {0}")]
    InputRange(String),

    /// The answer shape does not fit the current task type.
    #[error("{task_type} expects {expected}")]
    InputMismatch {
        task_type: String,
        expected: &'static str,
    },

    /// Not enough tasks to build the requested selection or session.
    #[error("not enough tasks: requested {requested}, available {available}")]
    InsufficientTasks { requested: usize, available: usize },
}

impl QuizError {
    pub(crate) fn validation(
        task: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        QuizError::Validation {
            task: task.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for structural catalog errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, QuizError::Validation { .. })
    }

    /// Returns the offending field name for structural errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            QuizError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
