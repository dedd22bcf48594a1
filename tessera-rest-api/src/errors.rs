//! REST API error types and response conversions

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use tessera_entity::EntityError;
use tessera_factory::FactoryError;
use tessera_interfaces::DatabaseError;
use tessera_rbac::{AuthError, RbacError};
use tessera_web::WebError;

/// REST API specific error type
#[derive(Error, Debug)]
pub enum RestError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error")]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Web(#[from] WebError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Rbac(#[from] RbacError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    /// Status code and error code for the response envelope
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            RestError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            RestError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            RestError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            RestError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            RestError::Web(err) => (err.status_code(), err.error_code()),
            RestError::Auth(err) => auth_parts(err),
            RestError::Rbac(err) => rbac_parts(err),
            RestError::Entity(err) => entity_parts(err),
            RestError::Factory(err) => factory_parts(err),
        }
    }
}

/// Pipeline rejections: 401 for missing claims, 400 for a missing tenant
/// ref, 403 for every denial
fn auth_parts(err: &AuthError) -> (StatusCode, &'static str) {
    match err {
        AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        AuthError::TenantRequired => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        AuthError::GodModeRequired
        | AuthError::TenantAccessDenied { .. }
        | AuthError::AppNotEnabled { .. }
        | AuthError::AppPermissionDenied { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        AuthError::Internal { .. } | AuthError::Database(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

fn rbac_parts(err: &RbacError) -> (StatusCode, &'static str) {
    match err {
        RbacError::RoleNotFound { .. }
        | RbacError::TenantNotFound { .. }
        | RbacError::MembershipNotFound { .. }
        | RbacError::AppNotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RbacError::DuplicateRoleName { .. } => (StatusCode::CONFLICT, "CONFLICT"),
        RbacError::SystemRoleImmutable { .. } | RbacError::AppNotAllowed { .. } => {
            (StatusCode::FORBIDDEN, "FORBIDDEN")
        }
        RbacError::InvalidMatrix { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        RbacError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

fn entity_parts(err: &EntityError) -> (StatusCode, &'static str) {
    match err {
        EntityError::DefinitionNotFound { .. } | EntityError::RecordNotFound { .. } => {
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        }
        EntityError::DuplicateSlug { .. } | EntityError::DuplicateFieldKey { .. } => {
            (StatusCode::CONFLICT, "CONFLICT")
        }
        EntityError::InvalidName { .. } | EntityError::RecordInvalid { .. } => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        }
        EntityError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

fn factory_parts(err: &FactoryError) -> (StatusCode, &'static str) {
    match err {
        FactoryError::TemplateNotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        FactoryError::UnknownModuleSlug { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        FactoryError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
        FactoryError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
                "status": status.as_u16(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_status_mapping() {
        let cases: Vec<(RestError, StatusCode)> = vec![
            (
                RestError::Entity(EntityError::DefinitionNotFound { slug: "x".into() }),
                StatusCode::NOT_FOUND,
            ),
            (
                RestError::Entity(EntityError::DuplicateSlug { slug: "x".into() }),
                StatusCode::CONFLICT,
            ),
            (
                RestError::Rbac(RbacError::SystemRoleImmutable { name: "owner".into() }),
                StatusCode::FORBIDDEN,
            ),
            (
                RestError::Factory(FactoryError::TemplateNotFound { slug: "x".into() }),
                StatusCode::NOT_FOUND,
            ),
            (RestError::Auth(AuthError::GodModeRequired), StatusCode::FORBIDDEN),
            (RestError::Auth(AuthError::Unauthenticated), StatusCode::UNAUTHORIZED),
        ];
        for (error, status) in cases {
            assert_eq!(error.parts().0, status, "{error}");
        }
    }
}
