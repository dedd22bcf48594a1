//! Role management: built-in matrices and custom role CRUD

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::info;
use uuid::Uuid;

use tessera_api_types::{
    BuiltinRole, CustomRole, EntityPermissions, PermissionMatrix, WritePermission,
};
use tessera_interfaces::{AuditAction, AuditEvent, AuditSink, RepositoryFactory};

use crate::{
    auth::GOD_ROLE,
    error::{RbacError, RbacResult},
};

static OWNER_MATRIX: Lazy<PermissionMatrix> = Lazy::new(PermissionMatrix::unrestricted);

static ADMIN_MATRIX: Lazy<PermissionMatrix> = Lazy::new(PermissionMatrix::unrestricted);

static MEMBER_MATRIX: Lazy<PermissionMatrix> = Lazy::new(|| {
    PermissionMatrix::new().with_entity(
        PermissionMatrix::WILDCARD,
        EntityPermissions {
            read: true,
            write: WritePermission::Allowed,
            delete: false,
            fields: None,
        },
    )
});

static VIEWER_MATRIX: Lazy<PermissionMatrix> =
    Lazy::new(|| PermissionMatrix::new().with_entity(PermissionMatrix::WILDCARD, EntityPermissions::read_only()));

/// Fixed matrix seeded for a built-in role
///
/// Built-ins use the `"*"` wildcard entry so they keep working for entity
/// types created after the role was seeded.
pub fn builtin_matrix(role: BuiltinRole) -> PermissionMatrix {
    match role {
        BuiltinRole::Owner => OWNER_MATRIX.clone(),
        BuiltinRole::Admin => ADMIN_MATRIX.clone(),
        BuiltinRole::Member => MEMBER_MATRIX.clone(),
        BuiltinRole::Viewer => VIEWER_MATRIX.clone(),
    }
}

/// Validate a matrix's shape at role-creation time
///
/// Shape problems are rejected here so permission reads never have to cope
/// with malformed matrices.
fn validate_matrix(matrix: &PermissionMatrix) -> RbacResult<()> {
    if matrix.0.is_empty() {
        return Err(RbacError::invalid_matrix("matrix must name at least one entity"));
    }
    for (entity, entry) in &matrix.0 {
        if entity.trim().is_empty() {
            return Err(RbacError::invalid_matrix("entity names must be non-empty"));
        }
        if let Some(fields) = &entry.fields {
            for key in fields.keys() {
                if key.trim().is_empty() {
                    return Err(RbacError::invalid_matrix(format!(
                        "entity {entity:?} has an empty field key"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Repository-backed role operations
#[derive(Clone)]
pub struct RoleService {
    repos: Arc<dyn RepositoryFactory>,
    audit: Arc<dyn AuditSink>,
}

impl RoleService {
    pub fn new(repos: Arc<dyn RepositoryFactory>, audit: Arc<dyn AuditSink>) -> Self {
        Self { repos, audit }
    }

    /// Seed the four system roles for a fresh tenant
    pub async fn seed_system_roles(&self, tenant_id: Uuid, created_by: Option<Uuid>) -> RbacResult<()> {
        for role in BuiltinRole::ALL {
            let row = CustomRole {
                id: Uuid::new_v4(),
                tenant_id,
                name: role.as_str().to_string(),
                description: None,
                permissions: builtin_matrix(role),
                is_system: true,
                created_at: chrono::Utc::now(),
                created_by,
            };
            self.repos.roles().create(row).await?;
        }
        info!(%tenant_id, "seeded system roles");
        Ok(())
    }

    /// Resolve a role name to its permission matrix
    ///
    /// `"god"` resolves to the unrestricted matrix; built-in names resolve to
    /// their fixed matrices without a store read.
    pub async fn resolve_matrix(&self, tenant_id: Uuid, role: &str) -> RbacResult<PermissionMatrix> {
        if role == GOD_ROLE {
            return Ok(PermissionMatrix::unrestricted());
        }
        if let Some(builtin) = BuiltinRole::parse(role) {
            return Ok(builtin_matrix(builtin));
        }
        let custom = self
            .repos
            .roles()
            .find_by_name(tenant_id, role)
            .await?
            .ok_or_else(|| RbacError::RoleNotFound { role: role.to_string() })?;
        Ok(custom.permissions)
    }

    pub async fn list_roles(&self, tenant_id: Uuid) -> RbacResult<Vec<CustomRole>> {
        Ok(self.repos.roles().list_by_tenant(tenant_id).await?)
    }

    /// Create a tenant custom role
    pub async fn create_role(
        &self,
        tenant_id: Uuid,
        name: String,
        description: Option<String>,
        permissions: PermissionMatrix,
        actor: Option<Uuid>,
    ) -> RbacResult<CustomRole> {
        validate_matrix(&permissions)?;

        let role = CustomRole {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.clone(),
            description,
            permissions,
            is_system: false,
            created_at: chrono::Utc::now(),
            created_by: actor,
        };

        let created = self.repos.roles().create(role).await.map_err(|err| {
            if err.is_unique_violation() {
                RbacError::DuplicateRoleName { name: name.clone() }
            } else {
                err.into()
            }
        })?;

        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Created, "custom_role", created.id)
                    .with_new_value(serde_json::json!({"name": created.name})),
            )
            .await;
        info!(%tenant_id, role = %created.name, "custom role created");
        Ok(created)
    }

    /// Update a custom role's description and matrix
    pub async fn update_role(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
        description: Option<String>,
        permissions: PermissionMatrix,
        actor: Option<Uuid>,
    ) -> RbacResult<CustomRole> {
        validate_matrix(&permissions)?;

        let mut role = self.require_tenant_role(tenant_id, role_id).await?;
        if role.is_system {
            return Err(RbacError::SystemRoleImmutable { name: role.name });
        }

        let old = serde_json::to_value(&role.permissions).unwrap_or_default();
        role.description = description;
        role.permissions = permissions;
        let updated = self.repos.roles().update(role).await?;

        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Updated, "custom_role", updated.id)
                    .with_old_value(old)
                    .with_new_value(serde_json::to_value(&updated.permissions).unwrap_or_default()),
            )
            .await;
        Ok(updated)
    }

    /// Delete a custom role
    pub async fn delete_role(&self, tenant_id: Uuid, role_id: Uuid, actor: Option<Uuid>) -> RbacResult<()> {
        let role = self.require_tenant_role(tenant_id, role_id).await?;
        if role.is_system {
            return Err(RbacError::SystemRoleImmutable { name: role.name });
        }

        self.repos.roles().delete(role.id).await?;
        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Deleted, "custom_role", role.id)
                    .with_old_value(serde_json::json!({"name": role.name})),
            )
            .await;
        Ok(())
    }

    /// Fetch a role, treating cross-tenant ids as not found
    async fn require_tenant_role(&self, tenant_id: Uuid, role_id: Uuid) -> RbacResult<CustomRole> {
        self.repos
            .roles()
            .find_by_id(role_id)
            .await?
            .filter(|role| role.tenant_id == tenant_id)
            .ok_or_else(|| RbacError::RoleNotFound {
                role: role_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_api_types::PermissionAction;

    use crate::permissions::check_permission;

    #[test]
    fn test_builtin_matrices_cover_any_entity() {
        for role in [BuiltinRole::Owner, BuiltinRole::Admin] {
            let matrix = builtin_matrix(role);
            assert!(check_permission(&matrix, "anything", PermissionAction::Delete, None));
        }
        let member = builtin_matrix(BuiltinRole::Member);
        assert!(check_permission(&member, "anything", PermissionAction::Write, None));
        assert!(!check_permission(&member, "anything", PermissionAction::Delete, None));

        let viewer = builtin_matrix(BuiltinRole::Viewer);
        assert!(check_permission(&viewer, "anything", PermissionAction::Read, None));
        assert!(!check_permission(&viewer, "anything", PermissionAction::Write, None));
    }

    #[test]
    fn test_matrix_validation() {
        assert!(validate_matrix(&PermissionMatrix::new()).is_err());

        let bad_field: PermissionMatrix = serde_json::from_value(serde_json::json!({
            "client": {"read": true, "write": false, "delete": false, "fields": {"": false}}
        }))
        .unwrap();
        assert!(validate_matrix(&bad_field).is_err());

        let ok: PermissionMatrix = serde_json::from_value(serde_json::json!({
            "client": {"read": true, "write": "own", "delete": false}
        }))
        .unwrap();
        assert!(validate_matrix(&ok).is_ok());
    }
}
