//! Document types and data structures.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Portal role of an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Portal administrator.
    Admin,
    /// Teaching staff.
    Faculty,
    /// Enrolled student.
    Student,
}

impl Role {
    /// Convert to the wire/database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Faculty => "faculty",
            Self::Student => "student",
        }
    }

    /// Parse from the wire/database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "faculty" => Some(Self::Faculty),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

/// Who a document is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Students only.
    Student,
    /// Faculty only.
    Faculty,
    /// Administrators only.
    Admin,
    /// Every role.
    Both,
}

impl Audience {
    /// All audience values.
    pub const ALL: [Self; 4] = [Self::Student, Self::Faculty, Self::Admin, Self::Both];

    /// Convert to database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Faculty => "faculty",
            Self::Admin => "admin",
            Self::Both => "both",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "faculty" => Some(Self::Faculty),
            "admin" => Some(Self::Admin),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

impl From<Role> for Audience {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Faculty => Self::Faculty,
            Role::Student => Self::Student,
        }
    }
}

/// The authenticated caller of a document operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// User ID.
    pub id: Uuid,
    /// Portal role.
    pub role: Role,
}

impl Actor {
    /// Create a new actor.
    #[must_use]
    pub const fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// A file received with an upload request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename declared by the client.
    pub filename: String,
    /// Content type declared by the client.
    pub content_type: String,
    /// File bytes.
    pub bytes: Bytes,
}

/// Input for uploading a document.
#[derive(Debug, Clone)]
pub struct UploadDocumentInput {
    /// Document title.
    pub title: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Category tag.
    pub document_type: Option<String>,
    /// Who may read the document.
    pub target_audience: Audience,
    /// Files sent with the request; exactly one is accepted.
    pub files: Vec<UploadedFile>,
}

/// Input for creating a document record.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Document title.
    pub title: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Storage key of the blob.
    pub file_path: String,
    /// Lower-cased file extension.
    pub file_type: String,
    /// Category tag.
    pub document_type: Option<String>,
    /// Who may read the document.
    pub target_audience: Audience,
    /// Uploading user.
    pub uploaded_by: Uuid,
}

/// Document domain model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Unique identifier.
    pub id: i64,
    /// Document title.
    pub title: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Storage key of the blob.
    pub file_path: String,
    /// Lower-cased file extension.
    pub file_type: String,
    /// Category tag.
    pub document_type: Option<String>,
    /// Who may read the document.
    pub target_audience: Audience,
    /// Uploading user.
    pub uploaded_by: Uuid,
    /// Upload timestamp.
    pub upload_date: DateTime<Utc>,
}

/// A document annotated with its uploader for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentListing {
    /// The document record.
    #[serde(flatten)]
    pub document: Document,
    /// Email of the uploading user, if the account still exists.
    pub uploader_email: Option<String>,
}

/// Filter for listing documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    /// Restrict to these audiences; `None` means no restriction.
    pub audiences: Option<Vec<Audience>>,
    /// Exact document type match.
    pub document_type: Option<String>,
}

/// How a document's bytes are handed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Rendered inline by the browser.
    View,
    /// Saved as an attachment.
    Download,
}
