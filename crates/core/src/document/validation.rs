//! Upload validation against the document type allowlist.

use thiserror::Error;

use super::types::UploadedFile;
use crate::storage::split_extension;

/// Maximum accepted upload size: 10 MiB.
pub const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Content type used when an extension is not in the allowlist.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Accepted extensions and the content type each must be declared with.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

/// Reasons an upload is rejected before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    /// Extension is not in the allowlist.
    #[error(
        "invalid file type '{extension}': only PDF, DOC, DOCX, XLS, XLSX, JPG, and PNG are allowed"
    )]
    UnsupportedType {
        /// The rejected extension (empty when the filename has none).
        extension: String,
    },

    /// Declared content type does not match the extension.
    #[error("file content type '{declared}' does not match its extension (expected '{expected}')")]
    ContentMismatch {
        /// Content type the client declared.
        declared: String,
        /// Content type the extension requires.
        expected: &'static str,
    },

    /// File exceeds the size limit.
    #[error("file size too large: {size} bytes exceeds maximum {max} bytes")]
    TooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// More than one file in a single upload.
    #[error("only one file may be uploaded per request, got {count}")]
    TooManyFiles {
        /// Number of files received.
        count: usize,
    },

    /// No file in the upload.
    #[error("no file uploaded")]
    MissingFile,
}

/// An upload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    /// Lower-cased extension without the dot.
    pub extension: String,
    /// Canonical content type for the extension.
    pub content_type: &'static str,
}

/// Look up the allowlisted content type for an extension (case-insensitive).
#[must_use]
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Content type to serve a stored file with, derived from its storage key.
#[must_use]
pub fn content_type_for_path(file_path: &str) -> &'static str {
    extension_of(file_path)
        .and_then(|ext| content_type_for_extension(&ext))
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// Lower-cased extension (without the dot) of the final path component.
#[must_use]
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (_, ext) = split_extension(name);
    ext.strip_prefix('.')
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Validates declared filename, content type, size and file count.
///
/// Pure: nothing is read from or written to storage.
#[derive(Debug, Clone, Copy)]
pub struct UploadValidator {
    max_size: u64,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_SIZE)
    }
}

impl UploadValidator {
    /// Create a validator with the given size limit.
    #[must_use]
    pub const fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    /// The configured size limit in bytes.
    #[must_use]
    pub const fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Reject anything but exactly one file.
    pub fn check_file_count(&self, count: usize) -> Result<(), UploadRejection> {
        match count {
            0 => Err(UploadRejection::MissingFile),
            1 => Ok(()),
            count => Err(UploadRejection::TooManyFiles { count }),
        }
    }

    /// Check the extension against the allowlist and the declared content type against it.
    pub fn check_type(
        &self,
        filename: &str,
        declared_content_type: &str,
    ) -> Result<AcceptedUpload, UploadRejection> {
        let extension = extension_of(filename).unwrap_or_default();
        let expected = content_type_for_extension(&extension)
            .ok_or_else(|| UploadRejection::UnsupportedType {
                extension: extension.clone(),
            })?;

        if declared_content_type != expected {
            return Err(UploadRejection::ContentMismatch {
                declared: declared_content_type.to_string(),
                expected,
            });
        }

        Ok(AcceptedUpload {
            extension,
            content_type: expected,
        })
    }

    /// Reject files above the size limit.
    pub fn check_size(&self, size: u64) -> Result<(), UploadRejection> {
        if size > self.max_size {
            return Err(UploadRejection::TooLarge {
                size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    /// Run every check against the files of an upload request.
    pub fn validate(&self, files: &[UploadedFile]) -> Result<AcceptedUpload, UploadRejection> {
        self.check_file_count(files.len())?;
        let file = &files[0];
        let accepted = self.check_type(&file.filename, &file.content_type)?;
        self.check_size(u64::try_from(file.bytes.len()).unwrap_or(u64::MAX))?;
        Ok(accepted)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn known_mime() -> impl Strategy<Value = String> {
        prop::sample::select(
            ALLOWED_TYPES
                .iter()
                .map(|(_, mime)| (*mime).to_string())
                .chain(["text/html".to_string(), "application/zip".to_string()])
                .collect::<Vec<_>>(),
        )
    }

    // An upload is accepted iff its extension is allowlisted and the declared
    // content type equals the allowlisted one.
    proptest! {
        #[test]
        fn prop_accepts_only_matching_pairs(
            base in "[a-zA-Z0-9_]{1,20}",
            ext in "(pdf|doc|docx|xls|xlsx|jpg|jpeg|png|exe|txt|html|zip|PDF|Png)",
            mime in known_mime(),
        ) {
            let filename = format!("{base}.{ext}");
            let result = UploadValidator::default().check_type(&filename, &mime);
            let expected = content_type_for_extension(&ext);

            match expected {
                Some(expected) if expected == mime => {
                    let accepted = result.expect("matching pair should be accepted");
                    prop_assert_eq!(accepted.extension, ext.to_ascii_lowercase());
                }
                Some(_) => {
                    let is_mismatch = matches!(result, Err(UploadRejection::ContentMismatch { .. }));
                    prop_assert!(is_mismatch, "Expected ContentMismatch");
                }
                None => {
                    let is_unsupported = matches!(result, Err(UploadRejection::UnsupportedType { .. }));
                    prop_assert!(is_unsupported, "Expected UnsupportedType");
                }
            }
        }
    }

    // Any size above the limit is rejected, anything at or below passes.
    proptest! {
        #[test]
        fn prop_size_validation(
            max_size in 1024u64..20_000_000,
            size in 0u64..40_000_000,
        ) {
            let result = UploadValidator::new(max_size).check_size(size);

            if size <= max_size {
                prop_assert!(result.is_ok());
            } else {
                let is_too_large = matches!(result, Err(UploadRejection::TooLarge { .. }));
                prop_assert!(is_too_large, "Expected TooLarge error");
            }
        }
    }
}
