//! Initial database migration.
//!
//! Creates the users and documents tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS documents CASCADE;")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS users CASCADE;")
            .await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
-- Portal accounts; managed by the identity service, read here for roles and emails
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    role VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_users_role CHECK (role IN ('admin', 'faculty', 'student'))
);
";

const DOCUMENTS_SQL: &str = r"
-- Published documents; file_path is the blob storage key
CREATE TABLE documents (
    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
    title TEXT,
    description TEXT,
    file_path VARCHAR(512) NOT NULL UNIQUE,
    file_type VARCHAR(16) NOT NULL,
    document_type VARCHAR(100),
    target_audience VARCHAR(16) NOT NULL,
    uploaded_by UUID NOT NULL REFERENCES users(id),
    upload_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_documents_audience
        CHECK (target_audience IN ('student', 'faculty', 'admin', 'both'))
);

-- Listing is always newest first, optionally narrowed by audience and type
CREATE INDEX idx_documents_upload_date ON documents(upload_date DESC);
CREATE INDEX idx_documents_audience ON documents(target_audience, upload_date DESC);
CREATE INDEX idx_documents_type ON documents(document_type) WHERE document_type IS NOT NULL;
";
