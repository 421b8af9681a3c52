use std::fmt;

use thiserror::Error;

use crate::shared::constants::UNKNOWN_ERROR_MESSAGE;
use crate::shared::endpoint::EndpointError;

/// The service operation a transfer failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    ListResults,
    DeleteResult,
    FetchImage,
}

impl Operation {
    /// Short message shown to the user when the service rejects the request.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Upload => "Upload failed",
            Operation::ListResults => "Failed to fetch detection results",
            Operation::DeleteResult => "Failed to delete the record",
            Operation::FetchImage => "Failed to load image",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Upload => write!(f, "upload"),
            Operation::ListResults => write!(f, "list results"),
            Operation::DeleteResult => write!(f, "delete result"),
            Operation::FetchImage => write!(f, "fetch image"),
        }
    }
}

/// Failure of a single request against the detection service.
///
/// Carries only owned strings so it can be cloned into UI messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("detection service is not configured: {0}")]
    Configuration(#[source] EndpointError),
    #[error("{operation} could not reach the service: {message}")]
    Network { operation: Operation, message: String },
    #[error("{operation} returned HTTP {status}")]
    Status { operation: Operation, status: u16 },
    #[error("{operation} returned an unreadable body: {message}")]
    Decode { operation: Operation, message: String },
}

impl TransferError {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            TransferError::Configuration(_) => None,
            TransferError::Network { operation, .. }
            | TransferError::Status { operation, .. }
            | TransferError::Decode { operation, .. } => Some(*operation),
        }
    }
}

/// Human-readable description for display next to the failing control. A
/// network failure with no detail gets the generic fallback.
pub fn describe(error: &TransferError) -> String {
    match error {
        TransferError::Configuration(e) => format!("Backend is not configured ({e})"),
        TransferError::Status { operation, .. } => operation.failure_message().to_string(),
        TransferError::Network { message, .. } if message.trim().is_empty() => {
            UNKNOWN_ERROR_MESSAGE.to_string()
        }
        TransferError::Network { operation, message } => {
            format!("{}: {message}", operation.failure_message())
        }
        TransferError::Decode { operation, .. } => {
            format!("{}: unexpected response from server", operation.failure_message())
        }
    }
}
