use crate::Error;
use thiserror::Error;

/// Error reported by the driver collaborator: its native code and message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct DriverError {
    pub code: i32,
    pub message: String,
}

impl DriverError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Classification of an execution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server went away, the caller may reconnect and retry.
    ConnectionLost,
    Generic,
}

impl FailureKind {
    pub fn classify(code: i32, connection_lost_code: Option<i32>) -> Self {
        if connection_lost_code == Some(code) {
            FailureKind::ConnectionLost
        } else {
            FailureKind::Generic
        }
    }
}

/// Typed failures surfaced by statements and the database facade.
///
/// They travel inside [`crate::Error`], use [`StatementError::of`] (or
/// `downcast_ref`) to recover them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    #[error("Named parameter `{name}` is referenced by the query but was never bound")]
    MissingParameter { name: String },

    #[error("Failed to prepare the query: {message} (code {code})")]
    PrepareFailed { code: i32, message: String },

    #[error("Failed to bind the parameters: {message} (code {code})")]
    BindFailed { code: i32, message: String },

    #[error("Failed to execute the query: {message} (code {code})")]
    ExecuteFailed {
        code: i32,
        message: String,
        kind: FailureKind,
    },

    #[error("Unknown result record type `{name}`")]
    InvalidResultType { name: String },

    #[error("Column `{field}` does not exist in the record type `{record}`")]
    UnknownField { record: String, field: String },

    #[error("SQL is required to prepare a statement")]
    EmptySql,

    #[error("Not in a transaction, cannot {action}")]
    NotInTransaction { action: &'static str },
}

impl StatementError {
    /// The typed failure carried by `error`, if any.
    pub fn of(error: &Error) -> Option<&StatementError> {
        error.downcast_ref::<StatementError>()
    }

    pub fn prepare_failed(error: DriverError) -> Self {
        StatementError::PrepareFailed {
            code: error.code,
            message: error.message,
        }
    }

    pub fn bind_failed(error: DriverError) -> Self {
        StatementError::BindFailed {
            code: error.code,
            message: error.message,
        }
    }

    pub fn execute_failed(error: DriverError, connection_lost_code: Option<i32>) -> Self {
        StatementError::ExecuteFailed {
            kind: FailureKind::classify(error.code, connection_lost_code),
            code: error.code,
            message: error.message,
        }
    }

    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            StatementError::ExecuteFailed {
                kind: FailureKind::ConnectionLost,
                ..
            }
        )
    }
}
