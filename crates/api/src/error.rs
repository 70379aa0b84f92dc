//! HTTP rendering of application errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use campus_core::document::DocumentError;
use campus_shared::AppError;

/// Error returned by API handlers.
///
/// Renders as `{"error": "<code>", "message": "<text>"}` with the status of the
/// wrapped [`AppError`]. Server-side details are logged, not returned.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Create a validation (400) error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(AppError::Validation(msg.into()))
    }

    /// Create a forbidden (403) error.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(AppError::Forbidden(msg.into()))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
            "An error occurred while processing the request"
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
            self.0.message()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::document::UploadRejection;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rejection_renders_as_400() {
        let err = ApiError::from(DocumentError::from(UploadRejection::MissingFile));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "no file uploaded");
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let err = ApiError::from(DocumentError::repository("connection refused at 10.0.0.5"));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "database_error");
        assert!(!body["message"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let response = ApiError::from(DocumentError::FileMissing { id: 3 }).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "not_found");
    }
}
