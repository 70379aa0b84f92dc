//! Document management routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{AppState, delivery, error::ApiError, middleware::AuthUser};
use campus_core::document::{
    Audience, DeliveryMode, DocumentError, DocumentListing, DocumentService, UploadDocumentInput,
    UploadRejection, UploadValidator, UploadedFile,
};
use campus_core::storage::OpendalBlobStore;
use campus_db::DocumentRepository;

/// Multipart part carrying the file.
const FILE_FIELD: &str = "document";

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents/upload", post(upload_document))
        .route("/documents", get(list_documents))
        .route(
            "/documents/{id}",
            get(get_document).delete(delete_document),
        )
        .route("/documents/view/{id}", get(view_document))
        .route("/documents/download/{id}", get(download_document))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing documents.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    /// Exact document type to match.
    #[serde(rename = "type")]
    pub document_type: Option<String>,
}

/// Response for a completed upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Confirmation message.
    pub message: &'static str,
    /// ID of the new document.
    pub document_id: i64,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn document_service(state: &AppState) -> DocumentService<DocumentRepository, OpendalBlobStore> {
    let repo = DocumentRepository::new((*state.db).clone());
    DocumentService::with_validator(Arc::new(repo), state.blobs.clone(), state.upload_validator)
}

/// Read the upload form, rejecting bad files as early as possible.
///
/// The file part's name and declared type are checked before its body is
/// read, and the size limit is enforced while chunks arrive.
async fn read_upload_form(
    mut multipart: Multipart,
    validator: &UploadValidator,
) -> Result<UploadDocumentInput, ApiError> {
    let mut title = None;
    let mut description = None;
    let mut document_type = None;
    let mut target_audience = None;
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            FILE_FIELD => {
                if !files.is_empty() {
                    return Err(DocumentError::from(UploadRejection::TooManyFiles {
                        count: files.len() + 1,
                    })
                    .into());
                }
                files.push(read_file_field(field, validator).await?);
            }
            "title" => title = Some(read_text_field(field).await?),
            "description" => description = Some(read_text_field(field).await?),
            "documentType" => document_type = Some(read_text_field(field).await?),
            "targetAudience" => target_audience = Some(read_text_field(field).await?),
            _ => {}
        }
    }

    let target_audience = target_audience
        .ok_or_else(|| DocumentError::invalid_field("targetAudience", "is required"))?;
    let target_audience = Audience::parse(&target_audience).ok_or_else(|| {
        DocumentError::invalid_field(
            "targetAudience",
            format!("must be one of student, faculty, admin, both (got '{target_audience}')"),
        )
    })?;

    Ok(UploadDocumentInput {
        title,
        description,
        document_type,
        target_audience,
        files,
    })
}

async fn read_text_field(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("malformed form field: {e}")))
}

async fn read_file_field(
    mut field: Field<'_>,
    validator: &UploadValidator,
) -> Result<UploadedFile, ApiError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or(campus_core::document::FALLBACK_CONTENT_TYPE)
        .to_string();

    validator
        .check_type(&filename, &content_type)
        .map_err(DocumentError::from)?;

    let mut buffer = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::validation(format!("malformed file part: {e}")))?
    {
        buffer.extend_from_slice(&chunk);
        validator
            .check_size(u64::try_from(buffer.len()).unwrap_or(u64::MAX))
            .map_err(DocumentError::from)?;
    }

    Ok(UploadedFile {
        filename,
        content_type,
        bytes: buffer.freeze(),
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/documents/upload`
/// Upload a document (admin only).
async fn upload_document(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    campus_core::document::require_admin(actor.role)?;

    let input = read_upload_form(multipart, &state.upload_validator).await?;
    let document_id = document_service(&state).upload(actor, input).await?;

    info!(document_id, user_id = %actor.id, "Upload accepted");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Document uploaded successfully",
            document_id,
        }),
    ))
}

/// GET `/documents`
/// List documents visible to the caller, newest first.
async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<DocumentListing>>, ApiError> {
    let actor = auth.actor()?;
    let document_type = query.document_type.filter(|t| !t.is_empty());

    let documents = document_service(&state)
        .list(actor, document_type)
        .await?;

    Ok(Json(documents))
}

/// GET `/documents/{id}`
/// Get a single document's metadata.
async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<DocumentListing>, ApiError> {
    let actor = auth.actor()?;
    let document = document_service(&state).get_one(actor, id).await?;

    Ok(Json(document))
}

/// GET `/documents/view/{id}`
/// Stream a document inline.
async fn view_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let actor = auth.actor()?;
    let delivery = document_service(&state)
        .open(actor, id, DeliveryMode::View)
        .await?;

    delivery::stream_response(delivery)
}

/// GET `/documents/download/{id}`
/// Stream a document as an attachment.
async fn download_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let actor = auth.actor()?;
    let delivery = document_service(&state)
        .open(actor, id, DeliveryMode::Download)
        .await?;

    delivery::stream_response(delivery)
}

/// DELETE `/documents/{id}`
/// Delete a document and its file (admin only).
async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    document_service(&state).delete(actor, id).await?;

    Ok(Json(json!({ "message": "Document deleted successfully" })))
}
