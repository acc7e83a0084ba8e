use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::ApiResponse;

/// Standard error type for the leadgate backend.
///
/// The authentication variants mirror the wire contract exactly: the client
/// distinguishes "refresh now" (401 `ACCESS_TOKEN_EXPIRED`) from
/// "reauthenticate" (403 `INVALID_ACCESS_TOKEN`).
#[derive(Debug, Error)]
pub enum LeadgateError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Refresh token not provided")]
    RefreshTokenRequired,

    #[error("Refresh token not found or revoked")]
    RefreshInvalid,

    #[error("Refresh token expired")]
    RefreshExpired,

    #[error("Access token required")]
    AccessTokenRequired,

    #[error("Access token expired")]
    AccessTokenExpired,

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("Invalid or expired verification token")]
    InvalidVerificationToken,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("User already exists with this email")]
    UserAlreadyExists,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl LeadgateError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LeadgateError::InvalidCredentials
            | LeadgateError::RefreshTokenRequired
            | LeadgateError::RefreshInvalid
            | LeadgateError::RefreshExpired
            | LeadgateError::AccessTokenRequired
            | LeadgateError::AccessTokenExpired => StatusCode::UNAUTHORIZED,
            LeadgateError::InvalidAccessToken => StatusCode::FORBIDDEN,
            LeadgateError::InvalidVerificationToken
            | LeadgateError::InvalidResetToken
            | LeadgateError::BadRequest(_)
            | LeadgateError::Validation(_) => StatusCode::BAD_REQUEST,
            LeadgateError::UserAlreadyExists => StatusCode::CONFLICT,
            LeadgateError::NotFound(_) => StatusCode::NOT_FOUND,
            LeadgateError::Internal(_) | LeadgateError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            LeadgateError::InvalidCredentials => "INVALID_CREDENTIALS",
            LeadgateError::RefreshTokenRequired => "REFRESH_TOKEN_REQUIRED",
            LeadgateError::RefreshInvalid => "REFRESH_TOKEN_INVALID",
            LeadgateError::RefreshExpired => "REFRESH_TOKEN_EXPIRED",
            LeadgateError::AccessTokenRequired => "ACCESS_TOKEN_REQUIRED",
            LeadgateError::AccessTokenExpired => "ACCESS_TOKEN_EXPIRED",
            LeadgateError::InvalidAccessToken => "INVALID_ACCESS_TOKEN",
            LeadgateError::InvalidVerificationToken => "INVALID_VERIFICATION_TOKEN",
            LeadgateError::InvalidResetToken => "INVALID_RESET_TOKEN",
            LeadgateError::UserAlreadyExists => "USER_EXISTS",
            LeadgateError::NotFound(_) => "NOT_FOUND",
            LeadgateError::BadRequest(_) => "BAD_REQUEST",
            LeadgateError::Validation(_) => "VALIDATION_ERROR",
            LeadgateError::Internal(_) => "INTERNAL_ERROR",
            LeadgateError::Database(_) => "DATABASE_ERROR",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            LeadgateError::Internal(_) | LeadgateError::Database(_)
        )
    }
}

/// Error detail for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl axum::response::IntoResponse for LeadgateError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        // 500-class detail goes to the log, never to the wire.
        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                code: self.error_code().to_string(),
                message,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}
