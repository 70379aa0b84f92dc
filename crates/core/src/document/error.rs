//! Document error types.

use thiserror::Error;

use super::validation::UploadRejection;
use crate::storage::StorageError;
use campus_shared::AppError;

/// Document operation errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Upload failed validation.
    #[error(transparent)]
    Rejected(#[from] UploadRejection),

    /// A request field is missing or malformed.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Caller's role does not permit the operation.
    #[error("access denied: {0}")]
    Forbidden(String),

    /// Document record not found.
    #[error("document not found: {0}")]
    NotFound(i64),

    /// Record exists but its blob is gone.
    #[error("file for document {id} not found on server")]
    FileMissing {
        /// Document ID.
        id: i64,
    },

    /// Blob exists but has no content.
    #[error("file for document {0} is empty")]
    EmptyFile(i64),

    /// Blob was written but cannot be read back.
    #[error("file upload failed: {0}")]
    StorageUnavailable(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl DocumentError {
    /// Create a forbidden error.
    #[must_use]
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create an invalid field error.
    #[must_use]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        let message = err.to_string();
        match err {
            DocumentError::Rejected(_)
            | DocumentError::InvalidField { .. }
            | DocumentError::EmptyFile(_) => Self::Validation(message),
            DocumentError::Forbidden(_) => Self::Forbidden(message),
            DocumentError::NotFound(_) | DocumentError::FileMissing { .. } => {
                Self::NotFound(message)
            }
            DocumentError::StorageUnavailable(_) | DocumentError::Storage(_) => {
                Self::Storage(message)
            }
            DocumentError::Repository(_) => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(DocumentError, u16)> = vec![
            (UploadRejection::MissingFile.into(), 400),
            (
                UploadRejection::TooLarge {
                    size: 11,
                    max: 10,
                }
                .into(),
                400,
            ),
            (DocumentError::invalid_field("targetAudience", "unknown"), 400),
            (DocumentError::EmptyFile(1), 400),
            (DocumentError::forbidden("admin only"), 403),
            (DocumentError::NotFound(1), 404),
            (DocumentError::FileMissing { id: 1 }, 404),
            (DocumentError::StorageUnavailable("gone".into()), 500),
            (StorageError::operation("disk full").into(), 500),
            (DocumentError::repository("connection reset"), 500),
        ];

        for (err, status) in cases {
            let label = err.to_string();
            assert_eq!(AppError::from(err).status_code(), status, "{label}");
        }
    }

    #[test]
    fn test_rejection_message_is_transparent() {
        let err = DocumentError::from(UploadRejection::MissingFile);
        assert_eq!(err.to_string(), "no file uploaded");
    }
}
