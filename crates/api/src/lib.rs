//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for campus documents
//! - Authentication middleware
//! - Streaming file delivery
//! - JSON error responses

pub mod delivery;
pub mod error;
pub mod middleware;
pub mod routes;

use axum::{Router, extract::DefaultBodyLimit};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use campus_core::document::UploadValidator;
use campus_core::storage::OpendalBlobStore;
use campus_shared::JwtService;

pub use error::ApiError;

/// Room left for form fields and multipart framing on top of the file size limit.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Blob store holding uploaded files.
    pub blobs: Arc<OpendalBlobStore>,
    /// Upload limits applied to incoming files.
    pub upload_validator: UploadValidator,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.upload_validator.max_size() + MULTIPART_OVERHEAD)
        .unwrap_or(usize::MAX);

    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
