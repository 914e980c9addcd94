//! Boundary-level processing outcomes and their HTTP status codes

use crate::window_core::IngestError;
use warp::http::StatusCode;

/// Reasons a transaction request is not recorded
///
/// All three are expected results of bad or late input. None of them is a
/// server fault and none is logged above debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingError {
    OldTransaction,
    FutureTransaction,
    UnparseableTransaction,
}

impl ProcessingError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ProcessingError::OldTransaction => StatusCode::NO_CONTENT,
            ProcessingError::FutureTransaction => StatusCode::UNPROCESSABLE_ENTITY,
            ProcessingError::UnparseableTransaction => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<IngestError> for ProcessingError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::FutureEvent { .. } => ProcessingError::FutureTransaction,
            IngestError::TooOld { .. } => ProcessingError::OldTransaction,
            IngestError::AmountOutOfRange { .. } => ProcessingError::UnparseableTransaction,
        }
    }
}

impl std::fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingError::OldTransaction => write!(f, "Transaction is older than 60 seconds"),
            ProcessingError::FutureTransaction => {
                write!(f, "Transaction timestamp is in the future")
            }
            ProcessingError::UnparseableTransaction => write!(f, "Transaction could not be parsed"),
        }
    }
}

impl std::error::Error for ProcessingError {}
