//! Web-specific error types and conversions
//!
//! Converts service-layer failures into HTTP responses with the unified
//! `{"error": {code, message}}` envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use tessera_api_types::ApiError;
use tessera_rbac::AuthError;

/// Web-specific error type for HTTP API operations
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            WebError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            WebError::Forbidden { .. } => StatusCode::FORBIDDEN,
            WebError::NotFound { .. } => StatusCode::NOT_FOUND,
            WebError::Conflict { .. } => StatusCode::CONFLICT,
            WebError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            WebError::BadRequest { .. } => "BAD_REQUEST",
            WebError::Unauthorized { .. } => "UNAUTHORIZED",
            WebError::Forbidden { .. } => "FORBIDDEN",
            WebError::NotFound { .. } => "NOT_FOUND",
            WebError::Conflict { .. } => "CONFLICT",
            WebError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Pipeline rejections map onto the HTTP taxonomy once, here
impl From<AuthError> for WebError {
    fn from(error: AuthError) -> Self {
        match &error {
            AuthError::Unauthenticated => WebError::Unauthorized {
                message: error.to_string(),
            },
            AuthError::TenantRequired => WebError::BadRequest {
                message: error.to_string(),
            },
            AuthError::GodModeRequired
            | AuthError::TenantAccessDenied { .. }
            | AuthError::AppNotEnabled { .. }
            | AuthError::AppPermissionDenied { .. } => WebError::Forbidden {
                message: error.to_string(),
            },
            AuthError::Internal { .. } | AuthError::Database(_) => WebError::Internal {
                message: error.to_string(),
            },
        }
    }
}

impl From<WebError> for ApiError {
    fn from(error: WebError) -> Self {
        ApiError::new(error.error_code(), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_auth_error_status_mapping() {
        let cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AuthError::GodModeRequired, StatusCode::FORBIDDEN),
            (AuthError::TenantRequired, StatusCode::BAD_REQUEST),
            (
                AuthError::TenantAccessDenied {
                    tenant_id: Uuid::new_v4(),
                    user_id: Uuid::new_v4(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                AuthError::AppNotEnabled { app: "crm".into() },
                StatusCode::FORBIDDEN,
            ),
            (
                AuthError::AppPermissionDenied { app: "crm".into() },
                StatusCode::FORBIDDEN,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(WebError::from(error).status_code(), status);
        }
    }
}
