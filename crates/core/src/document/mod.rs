//! Document management for the campus portal.
//!
//! This module provides business logic for published documents including:
//! - Upload validation (type, declared content type, size)
//! - Audience-based access policy
//! - Upload, listing, retrieval and deletion orchestration

mod error;
mod policy;
mod service;
mod types;
mod validation;

pub use error::DocumentError;
pub use policy::{can_access, require_admin, visible_audiences};
pub use service::{DocumentDelivery, DocumentRepository, DocumentService};
pub use types::{
    Actor, Audience, CreateDocumentInput, DeliveryMode, Document, DocumentFilter,
    DocumentListing, Role, UploadDocumentInput, UploadedFile,
};
pub use validation::{
    AcceptedUpload, FALLBACK_CONTENT_TYPE, MAX_UPLOAD_SIZE, UploadRejection, UploadValidator,
    content_type_for_extension, content_type_for_path, extension_of,
};
