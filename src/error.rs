//! Domain error types for the back-office server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (CSRF mismatch, inactive account)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation not allowed in the current record state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A path escaped its base directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// File system operation failed
    #[error("File system error: {0}")]
    FileSystem(String),

    /// External process (dump, restore) failed
    #[error("Subprocess error: {0}")]
    Subprocess(String),

    /// Email could not be built or delivered
    #[error("Email error: {0}")]
    Email(String),

    /// Upload exceeds the configured size limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;

        let (status, error_code, response_message) = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Erreur lors de l'accès à la base de données".to_string(),
                )
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", self.to_string())
            }
            AppError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", self.to_string()),
            AppError::InvalidPath(detail) => {
                tracing::warn!("Rejected path: {}", detail);
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_PATH",
                    "Chemin de fichier invalide".to_string(),
                )
            }
            AppError::FileSystem(err_str) => {
                tracing::error!("File system error: {}", err_str);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FILE_SYSTEM_ERROR",
                    "Erreur lors de l'accès aux fichiers".to_string(),
                )
            }
            AppError::Subprocess(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SUBPROCESS_ERROR",
                self.to_string(),
            ),
            AppError::Email(_) => (StatusCode::BAD_GATEWAY, "EMAIL_ERROR", self.to_string()),
            AppError::PayloadTooLarge(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
        };

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileSystem(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("Contrat 3".into())
                .error_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("bilan envoyé".into())
                .error_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidPath("../etc".into())
                .error_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Forbidden("csrf".into()).error_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("Logement 12".to_string());
        assert_eq!(err.to_string(), "Logement 12 not found");
    }
}
