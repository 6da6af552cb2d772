use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::storage::StorageError;
use crate::utils::response::error as error_response;

/// The handler an error came from. Decides the generic message and the status used for
/// storage failures: reads report 500, writes report 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListEvents,
    GetEvent,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

impl Operation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::ListEvents => "Failed to fetch events",
            Operation::GetEvent => "Failed to fetch event",
            Operation::CreateEvent => "Failed to create event",
            Operation::UpdateEvent => "Failed to update event",
            Operation::DeleteEvent => "Failed to delete event",
        }
    }

    pub fn failure_status(&self) -> StatusCode {
        match self {
            Operation::ListEvents | Operation::GetEvent => StatusCode::INTERNAL_SERVER_ERROR,
            Operation::CreateEvent | Operation::UpdateEvent | Operation::DeleteEvent => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ListEvents => "list events",
            Operation::GetEvent => "get event",
            Operation::CreateEvent => "create event",
            Operation::UpdateEvent => "update event",
            Operation::DeleteEvent => "delete event",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid input for {op}: {reason}")]
    InvalidInput { op: Operation, reason: String },

    #[error("Storage error during {op}")]
    StorageError {
        op: Operation,
        #[source]
        source: StorageError,
    },
}

impl AppError {
    pub fn storage(op: Operation) -> impl FnOnce(StorageError) -> AppError {
        move |source| AppError::StorageError { op, source }
    }

    pub fn invalid_input(op: Operation, reason: impl fmt::Display) -> AppError {
        AppError::InvalidInput {
            op,
            reason: reason.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput { op, .. } | AppError::StorageError { op, .. } => {
                op.failure_status()
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput { .. } => "INVALID_INPUT",
            AppError::StorageError { .. } => "STORAGE_ERROR",
        }
    }

    /// Message safe to hand to the client.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidInput { op, .. } | AppError::StorageError { op, .. } => {
                op.failure_message().to_string()
            }
        }
    }

    /// Errors caused by the request rather than by storage.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::StorageError { .. })
    }

    fn log(&self) {
        let code = self.code();
        if self.is_client_error() {
            warn!(code, error = %self, "Rejected request");
        } else if let AppError::StorageError { op, source } = self {
            error!(code, operation = %op, error = ?source, "Storage error");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal details
        self.log();

        error_response(self.public_message(), self.status_code())
    }
}
