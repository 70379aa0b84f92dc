//! Document service: upload, listing, retrieval and deletion.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::error::DocumentError;
use super::policy;
use super::types::{
    Actor, CreateDocumentInput, DeliveryMode, Document, DocumentFilter, DocumentListing,
    UploadDocumentInput,
};
use super::validation::{UploadValidator, content_type_for_path};
use crate::storage::{BlobStore, BlobStream, StorageError};

/// Repository trait for document metadata.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait DocumentRepository: Send + Sync {
    /// Insert a document record; the store assigns the ID and upload date.
    fn create(
        &self,
        input: CreateDocumentInput,
    ) -> impl Future<Output = Result<Document, DocumentError>> + Send;

    /// Find a document with its uploader's email.
    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<DocumentListing>, DocumentError>> + Send;

    /// List documents matching the filter, newest first.
    fn list(
        &self,
        filter: DocumentFilter,
    ) -> impl Future<Output = Result<Vec<DocumentListing>, DocumentError>> + Send;

    /// Delete a document record. Returns false when no row matched.
    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, DocumentError>> + Send;
}

/// A readable document ready to be streamed to the client.
pub struct DocumentDelivery {
    /// The document record.
    pub document: Document,
    /// Delivery mode requested.
    pub mode: DeliveryMode,
    /// Content type derived from the stored file's extension.
    pub content_type: &'static str,
    /// Size of the blob when it was opened (download mode only).
    pub content_length: Option<u64>,
    /// Open byte stream over the blob.
    pub stream: BlobStream,
}

impl std::fmt::Debug for DocumentDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentDelivery")
            .field("document", &self.document)
            .field("mode", &self.mode)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Document service coordinating validation, blob storage and metadata.
pub struct DocumentService<R: DocumentRepository, B: BlobStore> {
    repo: Arc<R>,
    blobs: Arc<B>,
    validator: UploadValidator,
}

impl<R: DocumentRepository, B: BlobStore> DocumentService<R, B> {
    /// Create a new document service with the default upload validator.
    #[must_use]
    pub fn new(repo: Arc<R>, blobs: Arc<B>) -> Self {
        Self::with_validator(repo, blobs, UploadValidator::default())
    }

    /// Create a new document service with a custom upload validator.
    #[must_use]
    pub fn with_validator(repo: Arc<R>, blobs: Arc<B>, validator: UploadValidator) -> Self {
        Self {
            repo,
            blobs,
            validator,
        }
    }

    /// The upload validator in use.
    #[must_use]
    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    /// Upload a document and record its metadata.
    ///
    /// If the metadata insert fails the freshly written blob is deleted again.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor is not an admin
    /// - The file fails validation
    /// - The blob cannot be written or read back
    /// - The metadata insert fails
    pub async fn upload(
        &self,
        actor: Actor,
        input: UploadDocumentInput,
    ) -> Result<i64, DocumentError> {
        policy::require_admin(actor.role)?;

        let accepted = self.validator.validate(&input.files)?;
        let Some(file) = input.files.into_iter().next() else {
            return Err(DocumentError::from(
                super::validation::UploadRejection::MissingFile,
            ));
        };

        let storage_key = self.blobs.put(&file.filename, file.bytes).await?;

        if let Err(e) = self.blobs.open_read(&storage_key).await {
            error!(key = %storage_key, error = %e, "Uploaded file is not readable");
            self.discard_blob(&storage_key).await;
            return Err(DocumentError::StorageUnavailable(
                "file not accessible after write".to_string(),
            ));
        }

        let create_input = CreateDocumentInput {
            title: input.title,
            description: input.description,
            file_path: storage_key.clone(),
            file_type: accepted.extension,
            document_type: input.document_type,
            target_audience: input.target_audience,
            uploaded_by: actor.id,
        };

        match self.repo.create(create_input).await {
            Ok(document) => {
                info!(
                    document_id = document.id,
                    key = %storage_key,
                    audience = document.target_audience.as_str(),
                    "Document uploaded"
                );
                Ok(document.id)
            }
            Err(e) => {
                error!(error = %e, key = %storage_key, "Failed to record document, removing blob");
                self.discard_blob(&storage_key).await;
                Err(e)
            }
        }
    }

    /// List the documents visible to the actor, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(
        &self,
        actor: Actor,
        document_type: Option<String>,
    ) -> Result<Vec<DocumentListing>, DocumentError> {
        let filter = DocumentFilter {
            audiences: policy::visible_audiences(actor.role),
            document_type,
        };

        self.repo.list(filter).await
    }

    /// Get a single document the actor may read.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document does not exist and `Forbidden` if
    /// its audience excludes the actor.
    pub async fn get_one(&self, actor: Actor, id: i64) -> Result<DocumentListing, DocumentError> {
        let listing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DocumentError::NotFound(id))?;

        if !policy::can_access(actor.role, listing.document.target_audience) {
            return Err(DocumentError::forbidden("document not published to your role"));
        }

        Ok(listing)
    }

    /// Open a document's file for view or download.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The document does not exist or the actor may not read it
    /// - The blob is missing from storage
    /// - The blob is empty (download only)
    /// - The blob cannot be opened
    pub async fn open(
        &self,
        actor: Actor,
        id: i64,
        mode: DeliveryMode,
    ) -> Result<DocumentDelivery, DocumentError> {
        let document = self.get_one(actor, id).await?.document;
        let key = document.file_path.as_str();

        if !self.blobs.exists(key).await {
            warn!(document_id = id, key = %key, "Document record has no file in storage");
            return Err(DocumentError::FileMissing { id });
        }

        let content_length = match mode {
            DeliveryMode::View => None,
            DeliveryMode::Download => {
                let size = self
                    .blobs
                    .size(key)
                    .await
                    .map_err(|e| missing_or_storage(id, e))?;
                if size == 0 {
                    return Err(DocumentError::EmptyFile(id));
                }
                Some(size)
            }
        };

        let stream = self
            .blobs
            .open_read(key)
            .await
            .map_err(|e| missing_or_storage(id, e))?;

        Ok(DocumentDelivery {
            content_type: content_type_for_path(key),
            content_length,
            mode,
            stream,
            document,
        })
    }

    /// Delete a document record, then its file.
    ///
    /// The record is removed first; a file that cannot be removed afterwards
    /// is logged and left behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin, the document does not
    /// exist, or the database operation fails.
    pub async fn delete(&self, actor: Actor, id: i64) -> Result<(), DocumentError> {
        policy::require_admin(actor.role)?;

        let document = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DocumentError::NotFound(id))?
            .document;

        if !self.repo.delete(id).await? {
            return Err(DocumentError::NotFound(id));
        }

        if let Err(e) = self.blobs.delete(&document.file_path).await {
            warn!(
                document_id = id,
                key = %document.file_path,
                error = %e,
                "Document record deleted but file removal failed"
            );
        }

        info!(document_id = id, "Document deleted");
        Ok(())
    }

    /// Best-effort removal of a blob whose record was never written.
    async fn discard_blob(&self, key: &str) {
        if let Err(e) = self.blobs.delete(key).await {
            warn!(key = %key, error = %e, "Failed to remove orphaned upload");
        }
    }
}

fn missing_or_storage(id: i64, err: StorageError) -> DocumentError {
    match err {
        StorageError::NotFound { .. } => DocumentError::FileMissing { id },
        other => DocumentError::Storage(other),
    }
}
