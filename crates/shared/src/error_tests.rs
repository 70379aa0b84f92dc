use super::*;

#[test]
fn test_app_error_status_codes() {
    assert_eq!(AppError::Unauthorized("test".into()).status_code(), 401);
    assert_eq!(AppError::Forbidden("test".into()).status_code(), 403);
    assert_eq!(AppError::NotFound("test".into()).status_code(), 404);
    assert_eq!(AppError::Validation("test".into()).status_code(), 400);
    assert_eq!(AppError::Database("test".into()).status_code(), 500);
    assert_eq!(AppError::Storage("test".into()).status_code(), 500);
    assert_eq!(AppError::Internal("test".into()).status_code(), 500);
}

#[test]
fn test_app_error_error_codes() {
    assert_eq!(
        AppError::Unauthorized("test".into()).error_code(),
        "unauthorized"
    );
    assert_eq!(AppError::Forbidden("test".into()).error_code(), "forbidden");
    assert_eq!(AppError::NotFound("test".into()).error_code(), "not_found");
    assert_eq!(
        AppError::Validation("test".into()).error_code(),
        "validation_error"
    );
    assert_eq!(
        AppError::Database("test".into()).error_code(),
        "database_error"
    );
    assert_eq!(AppError::Storage("test".into()).error_code(), "storage_error");
    assert_eq!(
        AppError::Internal("test".into()).error_code(),
        "internal_error"
    );
}

#[test]
fn test_app_error_display() {
    assert_eq!(
        format!("{}", AppError::Forbidden("msg".into())),
        "Access denied: msg"
    );
    assert_eq!(
        format!("{}", AppError::NotFound("msg".into())),
        "Not found: msg"
    );
    assert_eq!(
        format!("{}", AppError::Storage("msg".into())),
        "Storage error: msg"
    );
}

#[test]
fn test_only_5xx_are_server_errors() {
    assert!(!AppError::Validation("x".into()).is_server_error());
    assert!(!AppError::Forbidden("x".into()).is_server_error());
    assert!(AppError::Storage("x".into()).is_server_error());
    assert!(AppError::Database("x".into()).is_server_error());
}

#[test]
fn test_message_strips_category() {
    assert_eq!(AppError::NotFound("document 7".into()).message(), "document 7");
    assert_eq!(AppError::Validation("bad".into()).message(), "bad");
}
