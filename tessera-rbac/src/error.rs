//! Error types for authorization and role management

use thiserror::Error;
use uuid::Uuid;

use tessera_interfaces::DatabaseError;

/// Result type for pipeline decisions
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for role and tenant management operations
pub type RbacResult<T> = Result<T, RbacError>;

/// Terminal rejections produced by the authorization pipeline
///
/// A stage failure short-circuits the chain before any business logic runs
/// and is never retried.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No verified claim set on the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Platform-root route without a god-mode claim
    #[error("Platform access requires god mode")]
    GodModeRequired,

    /// No tenant identifier anywhere in the request
    #[error("A tenant identifier is required for this route")]
    TenantRequired,

    /// No active membership links the subject to the tenant
    #[error("User {user_id} has no access to tenant {tenant_id}")]
    TenantAccessDenied { tenant_id: Uuid, user_id: Uuid },

    /// The tenant has not enabled the app this route belongs to
    #[error("App not enabled for tenant: {app}")]
    AppNotEnabled { app: String },

    /// Member without an explicit grant for an enabled app
    #[error("Missing app permission: {app}")]
    AppPermissionDenied { app: String },

    /// Pipeline invariant breach (stage ran without its predecessor)
    #[error("Authorization pipeline error: {message}")]
    Internal { message: String },

    /// Membership/app store read failed
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AuthError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this rejection is an access decision (versus a fault)
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::GodModeRequired
                | Self::TenantAccessDenied { .. }
                | Self::AppNotEnabled { .. }
                | Self::AppPermissionDenied { .. }
        )
    }
}

/// Errors from role and tenant management
#[derive(Error, Debug)]
pub enum RbacError {
    #[error("Role not found: {role}")]
    RoleNotFound { role: String },

    #[error("A role named {name:?} already exists in this tenant")]
    DuplicateRoleName { name: String },

    #[error("System role {name:?} cannot be modified or deleted")]
    SystemRoleImmutable { name: String },

    #[error("Invalid permission matrix: {message}")]
    InvalidMatrix { message: String },

    #[error("Tenant not found: {tenant_id}")]
    TenantNotFound { tenant_id: Uuid },

    #[error("User {user_id} is not a member of tenant {tenant_id}")]
    MembershipNotFound { tenant_id: Uuid, user_id: Uuid },

    #[error("App not found: {code}")]
    AppNotFound { code: String },

    #[error("App {code:?} is not available on this tenant's plan")]
    AppNotAllowed { code: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl RbacError {
    pub fn invalid_matrix(message: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RoleNotFound { .. }
                | Self::TenantNotFound { .. }
                | Self::MembershipNotFound { .. }
                | Self::AppNotFound { .. }
        )
    }
}
