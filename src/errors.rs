use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};

use crate::response::ApiResponse;

/// Every failure mode the order, offer, cart and voucher flows can surface.
///
/// Each variant maps to one stable HTTP status. Messages are shown to the
/// caller as-is, except for `Database`, which is logged and replaced by a
/// generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    State(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Voucher code has expired.")]
    Expired,
    #[error("Voucher usage limit reached.")]
    LimitReached,
    #[error("User profile is not verified.")]
    ProfileNotVerified,
    #[error("Invalid PIN code.")]
    InvalidPin,
    #[error("database error: {0}")]
    Database(DbErr),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            return Self::NotFound(msg.clone());
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict("Resource already exists".to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Expired | Self::InvalidPin => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::State(_) | Self::LimitReached => StatusCode::CONFLICT,
            Self::Authorization(_) | Self::ProfileNotVerified => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Database(e) => {
                tracing::error!("Database error: {e}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        ApiResponse::failure(self.status_code(), message).respond()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_becomes_not_found() {
        let err: AppError = DbErr::RecordNotFound("Order not found".to_string()).into();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Order not found"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn voucher_errors_have_stable_statuses() {
        assert_eq!(AppError::Expired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::LimitReached.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::ProfileNotVerified.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let err = AppError::Database(DbErr::Custom("relation \"orders\" is locked".to_string()));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
