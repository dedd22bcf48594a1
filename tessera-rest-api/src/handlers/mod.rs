//! REST API handlers

pub mod apps;
pub mod entities;
pub mod factory;
pub mod health;
pub mod members;
pub mod platform;
pub mod roles;

pub use apps::{delete_app, get_app, grant_app, patch_app, post_app, revoke_app};
pub use members::{add_member, list_members};
pub use entities::{
    create_record, create_schema, delete_record, get_record, get_schema, list_records,
    list_schemas, update_record,
};
pub use factory::{instantiate, list_templates};
pub use health::health_check;
pub use platform::{create_tenant, list_tenants};
pub use roles::{create_role, delete_role, list_roles, update_role};

use tessera_rbac::{AuthError, RequestContext, TenantScope};

use crate::errors::RestError;

/// Tenant scope from an admitted context; absence is a pipeline invariant breach
pub(crate) fn tenant_scope(ctx: &RequestContext) -> Result<&TenantScope, RestError> {
    ctx.scope()
        .ok_or_else(|| RestError::Auth(AuthError::internal("tenant scope missing after TenantCheck")))
}

/// Owner/admin (or god) gate for management mutations
pub(crate) fn require_privileged(scope: &TenantScope) -> Result<(), RestError> {
    if scope.is_god() || scope.is_privileged() {
        Ok(())
    } else {
        Err(RestError::Forbidden(
            "This operation requires the owner or admin role".to_string(),
        ))
    }
}
