//! Document repository for database operations.
//!
//! Implements document metadata CRUD using `SeaORM`.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{documents, users};
use campus_core::document::{
    Audience, CreateDocumentInput, Document, DocumentError, DocumentFilter, DocumentListing,
    DocumentRepository as DocumentRepoTrait,
};

/// Document repository implementation.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Create a new document repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl DocumentRepoTrait for DocumentRepository {
    async fn create(&self, input: CreateDocumentInput) -> Result<Document, DocumentError> {
        let active_model = documents::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            file_path: Set(input.file_path),
            file_type: Set(input.file_type),
            document_type: Set(input.document_type),
            target_audience: Set(input.target_audience.as_str().to_string()),
            uploaded_by: Set(input.uploaded_by),
            upload_date: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        to_domain(model)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<DocumentListing>, DocumentError> {
        let row = documents::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        row.map(to_listing).transpose()
    }

    async fn list(&self, filter: DocumentFilter) -> Result<Vec<DocumentListing>, DocumentError> {
        let mut query = documents::Entity::find().find_also_related(users::Entity);

        if let Some(audiences) = filter.audiences {
            query = query.filter(
                documents::Column::TargetAudience.is_in(audiences.iter().map(|a| a.as_str())),
            );
        }

        if let Some(document_type) = filter.document_type {
            query = query.filter(documents::Column::DocumentType.eq(document_type));
        }

        let rows = query
            .order_by_desc(documents::Column::UploadDate)
            .order_by_desc(documents::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        rows.into_iter().map(to_listing).collect()
    }

    async fn delete(&self, id: i64) -> Result<bool, DocumentError> {
        let result = documents::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| DocumentError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert a joined row to a listing.
fn to_listing(
    (model, uploader): (documents::Model, Option<users::Model>),
) -> Result<DocumentListing, DocumentError> {
    Ok(DocumentListing {
        document: to_domain(model)?,
        uploader_email: uploader.map(|u| u.email),
    })
}

/// Convert database model to domain model.
fn to_domain(model: documents::Model) -> Result<Document, DocumentError> {
    let target_audience = Audience::parse(&model.target_audience).ok_or_else(|| {
        DocumentError::repository(format!(
            "document {} has unknown audience '{}'",
            model.id, model.target_audience
        ))
    })?;

    Ok(Document {
        id: model.id,
        title: model.title,
        description: model.description,
        file_path: model.file_path,
        file_type: model.file_type,
        document_type: model.document_type,
        target_audience,
        uploaded_by: model.uploaded_by,
        upload_date: model.upload_date.with_timezone(&Utc),
    })
}
