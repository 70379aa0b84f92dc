//! Blob storage for uploaded documents using Apache OpenDAL.
//!
//! Documents are persisted under a generated storage key inside a single
//! upload directory. The [`BlobStore`] trait is the seam the document service
//! depends on; [`OpendalBlobStore`] backs it with either the local filesystem
//! or an S3-compatible bucket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                             │
//! │                   (Unified Storage API)                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write("key", data)      │ op.stat("key")                     │
//! │ op.reader("key")           │ op.delete("key")                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod key;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use key::{generate_storage_key, sanitize_filename, split_extension};
pub use service::{BlobStore, BlobStream, OpendalBlobStore};
