//! Core business logic for the campus document portal.
//!
//! This crate contains document rules and blob storage with ZERO web or
//! database dependencies.
//!
//! # Modules
//!
//! - `document` - Upload validation, audience policy and the document service
//! - `storage` - Blob storage over OpenDAL (local filesystem or S3)

pub mod document;
pub mod storage;
