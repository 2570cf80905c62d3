use serde::Serialize;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Why a move was refused before anything was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MoveRejection {
    /// Dropped where it was picked up.
    NoOp,
    UnknownBucket,
    SourceIndexOutOfRange,
    /// The board the caller moved from no longer matches the task at the source index.
    TaskMismatch,
    /// The task does not satisfy the destination bucket's type/city filter.
    IneligibleDestination,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Invalid move: {reason} ({message})")]
    InvalidMove {
        reason: MoveRejection,
        message: String,
    },
    #[error("Could not save, please retry: {message}")]
    Persistence { message: String },
    #[error("Route optimization unavailable: {message}")]
    OptimizationUnavailable { message: String },
    #[error("An optimization is already running for bucket {bucket}")]
    OptimizationInProgress { bucket: String },
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    #[error("Not found: {message}")]
    NotFound { message: String },
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl DispatchError {
    pub fn invalid_move(reason: MoveRejection, message: &str) -> Self {
        Self::InvalidMove {
            reason,
            message: message.to_string(),
        }
    }

    pub fn no_op() -> Self {
        Self::invalid_move(MoveRejection::NoOp, "task dropped at its origin")
    }

    pub fn persistence(message: &str) -> Self {
        Self::Persistence {
            message: message.to_string(),
        }
    }

    pub fn optimization_unavailable(message: &str) -> Self {
        Self::OptimizationUnavailable {
            message: message.to_string(),
        }
    }

    pub fn optimization_in_progress(bucket: &str) -> Self {
        Self::OptimizationInProgress {
            bucket: bucket.to_string(),
        }
    }

    pub fn invalid_input(message: &str) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::NotFound {
            message: message.to_string(),
        }
    }

    pub fn serialization(message: &str) -> Self {
        Self::Serialization {
            message: message.to_string(),
        }
    }

    /// A drop at the drag origin. Callers skip these silently.
    pub fn is_no_op(&self) -> bool {
        matches!(
            self,
            Self::InvalidMove {
                reason: MoveRejection::NoOp,
                ..
            }
        )
    }

    pub fn rejection(&self) -> Option<MoveRejection> {
        match self {
            Self::InvalidMove { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(e: serde_json::Error) -> Self {
        DispatchError::serialization(&e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_is_distinguishable_from_other_rejections() {
        assert!(DispatchError::no_op().is_no_op());
        assert!(!DispatchError::invalid_move(MoveRejection::TaskMismatch, "stale").is_no_op());
        assert!(!DispatchError::persistence("conflict").is_no_op());
        assert_eq!(
            DispatchError::invalid_move(MoveRejection::UnknownBucket, "x").rejection(),
            Some(MoveRejection::UnknownBucket)
        );
    }

    #[test]
    fn messages_are_user_facing() {
        let err = DispatchError::persistence("write conflict");
        assert_eq!(err.to_string(), "Could not save, please retry: write conflict");

        let err = DispatchError::invalid_move(MoveRejection::SourceIndexOutOfRange, "index 4");
        assert_eq!(
            err.to_string(),
            "Invalid move: sourceIndexOutOfRange (index 4)"
        );
    }
}
