//! Role service tests against the in-memory backend

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use tessera_api_types::{PermissionAction, PermissionMatrix};
use tessera_interfaces::NullAuditSink;
use tessera_rbac::{check_permission, filter_fields, RbacError, RoleService};
use tessera_storage::InMemoryBackend;

fn service() -> RoleService {
    RoleService::new(Arc::new(InMemoryBackend::new()), Arc::new(NullAuditSink))
}

fn client_matrix() -> PermissionMatrix {
    serde_json::from_value(json!({
        "client": {"read": true, "write": "own", "delete": false, "fields": {"ssn": false}}
    }))
    .unwrap()
}

#[tokio::test]
async fn custom_role_round_trip() {
    let roles = service();
    let tenant_id = Uuid::new_v4();

    let role = roles
        .create_role(tenant_id, "paralegal".into(), None, client_matrix(), None)
        .await
        .unwrap();
    assert!(!role.is_system);

    let matrix = roles.resolve_matrix(tenant_id, "paralegal").await.unwrap();
    assert!(!check_permission(&matrix, "client", PermissionAction::Delete, None));
    assert_eq!(
        filter_fields(&matrix, "client", &json!({"name": "A", "ssn": "123"})),
        json!({"name": "A"})
    );
}

#[tokio::test]
async fn duplicate_role_name_rejected() {
    let roles = service();
    let tenant_id = Uuid::new_v4();

    roles
        .create_role(tenant_id, "paralegal".into(), None, client_matrix(), None)
        .await
        .unwrap();
    let err = roles
        .create_role(tenant_id, "paralegal".into(), None, client_matrix(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RbacError::DuplicateRoleName { name } if name == "paralegal"));
}

#[tokio::test]
async fn same_name_in_another_tenant_is_fine() {
    let roles = service();
    roles
        .create_role(Uuid::new_v4(), "paralegal".into(), None, client_matrix(), None)
        .await
        .unwrap();
    assert!(roles
        .create_role(Uuid::new_v4(), "paralegal".into(), None, client_matrix(), None)
        .await
        .is_ok());
}

#[tokio::test]
async fn system_roles_are_immutable() {
    let roles = service();
    let tenant_id = Uuid::new_v4();
    roles.seed_system_roles(tenant_id, None).await.unwrap();

    let seeded = roles.list_roles(tenant_id).await.unwrap();
    assert_eq!(seeded.len(), 4);
    let owner = seeded.iter().find(|r| r.name == "owner").unwrap();

    let update = roles
        .update_role(tenant_id, owner.id, None, client_matrix(), None)
        .await
        .unwrap_err();
    assert!(matches!(update, RbacError::SystemRoleImmutable { .. }));

    let delete = roles.delete_role(tenant_id, owner.id, None).await.unwrap_err();
    assert!(matches!(delete, RbacError::SystemRoleImmutable { .. }));
}

#[tokio::test]
async fn seeding_blocks_builtin_name_collisions() {
    let roles = service();
    let tenant_id = Uuid::new_v4();
    roles.seed_system_roles(tenant_id, None).await.unwrap();

    let err = roles
        .create_role(tenant_id, "admin".into(), None, client_matrix(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RbacError::DuplicateRoleName { .. }));
}

#[tokio::test]
async fn unknown_role_is_not_found() {
    let roles = service();
    let err = roles.resolve_matrix(Uuid::new_v4(), "sales_rep").await.unwrap_err();
    assert!(matches!(err, RbacError::RoleNotFound { .. }));
}

#[tokio::test]
async fn invalid_matrix_rejected_at_creation() {
    let roles = service();
    let err = roles
        .create_role(Uuid::new_v4(), "broken".into(), None, PermissionMatrix::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RbacError::InvalidMatrix { .. }));
}

#[tokio::test]
async fn cross_tenant_role_mutation_is_not_found() {
    let roles = service();
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();
    let role = roles
        .create_role(tenant_a, "paralegal".into(), None, client_matrix(), None)
        .await
        .unwrap();

    let err = roles.delete_role(tenant_b, role.id, None).await.unwrap_err();
    assert!(matches!(err, RbacError::RoleNotFound { .. }));
}
