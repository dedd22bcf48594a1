//! Constraint and ordering tests for the in-memory backend

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use tessera_api_types::{
    CustomRole, EntityDefinition, EntityField, EntityRecord, FieldType, Membership,
    PermissionMatrix, Tenant, TenantPlan,
};
use tessera_interfaces::{
    AppGrantRepository, DatabaseError, EntityDefinitionRepository, EntityRecordRepository,
    MembershipRepository, RepositoryFactory, RoleRepository, TenantAppRepository, TenantRepository,
};
use tessera_storage::InMemoryBackend;

fn definition(tenant_id: Uuid, slug: &str) -> EntityDefinition {
    EntityDefinition {
        id: Uuid::new_v4(),
        tenant_id,
        name: slug.to_string(),
        slug: slug.to_string(),
        icon: None,
        description: None,
        created_at: Utc::now(),
        created_by: None,
    }
}

fn field(definition_id: Uuid, key: &str, order: i32) -> EntityField {
    EntityField {
        id: Uuid::new_v4(),
        definition_id,
        name: key.to_string(),
        key: key.to_string(),
        field_type: FieldType::Text,
        is_required: false,
        options: vec![],
        order,
    }
}

#[tokio::test]
async fn membership_unique_per_tenant_and_user() {
    let backend = InMemoryBackend::new();
    let tenant = Uuid::new_v4();
    let user = Uuid::new_v4();

    MembershipRepository::create(&backend, Membership::new(tenant, user, "member"))
        .await
        .unwrap();
    let err = MembershipRepository::create(&backend, Membership::new(tenant, user, "viewer"))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation { .. }));

    // Same user in a different tenant is fine
    assert!(
        MembershipRepository::create(&backend, Membership::new(Uuid::new_v4(), user, "member"))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn role_name_unique_per_tenant() {
    let backend = InMemoryBackend::new();
    let tenant = Uuid::new_v4();
    let role = |name: &str, tenant_id: Uuid| CustomRole {
        id: Uuid::new_v4(),
        tenant_id,
        name: name.to_string(),
        description: None,
        permissions: PermissionMatrix::unrestricted(),
        is_system: false,
        created_at: Utc::now(),
        created_by: None,
    };

    RoleRepository::create(&backend, role("paralegal", tenant)).await.unwrap();
    let err = RoleRepository::create(&backend, role("paralegal", tenant))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
    assert!(RoleRepository::create(&backend, role("paralegal", Uuid::new_v4()))
        .await
        .is_ok());
}

#[tokio::test]
async fn definition_slug_unique_per_tenant() {
    let backend = InMemoryBackend::new();
    let tenant = Uuid::new_v4();

    backend
        .create_with_fields(definition(tenant, "clients"), vec![])
        .await
        .unwrap();
    let err = backend
        .create_with_fields(definition(tenant, "clients"), vec![])
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn fields_come_back_in_order() {
    let backend = InMemoryBackend::new();
    let tenant = Uuid::new_v4();
    let def = definition(tenant, "clients");
    let def_id = def.id;

    // Stored shuffled; returned ascending by order
    backend
        .create_with_fields(
            def,
            vec![field(def_id, "third", 2), field(def_id, "first", 0), field(def_id, "second", 1)],
        )
        .await
        .unwrap();

    let fetched = backend.find_by_slug(tenant, "clients").await.unwrap().unwrap();
    let keys: Vec<&str> = fetched.fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn records_ordered_by_creation_desc() {
    let backend = InMemoryBackend::new();
    let tenant = Uuid::new_v4();
    let definition_id = Uuid::new_v4();
    let base = Utc::now();

    for (offset, label) in [(0, "old"), (60, "new"), (30, "mid")] {
        EntityRecordRepository::create(
            &backend,
            EntityRecord {
                id: Uuid::new_v4(),
                tenant_id: tenant,
                definition_id,
                data: json!({"label": label}),
                owner_id: Uuid::new_v4(),
                created_by: Uuid::new_v4(),
                created_at: base + Duration::seconds(offset),
                updated_at: base + Duration::seconds(offset),
            },
        )
        .await
        .unwrap();
    }

    let records = backend.list_by_definition(tenant, definition_id).await.unwrap();
    let labels: Vec<&str> = records
        .iter()
        .map(|r| r.data.get("label").and_then(|v| v.as_str()).unwrap())
        .collect();
    assert_eq!(labels, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn tenant_app_upsert_never_duplicates() {
    let backend = InMemoryBackend::new();
    let tenant = Uuid::new_v4();
    let app = Uuid::new_v4();

    let enabled = TenantAppRepository::upsert(&backend, tenant, app, true).await.unwrap();
    let disabled = TenantAppRepository::upsert(&backend, tenant, app, false).await.unwrap();
    assert_eq!(enabled.id, disabled.id);
    assert!(!disabled.enabled);

    let rows = TenantAppRepository::list_by_tenant(&backend, tenant).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn app_grant_upsert_and_revoke() {
    let backend = InMemoryBackend::new();
    let membership = Uuid::new_v4();
    let app = Uuid::new_v4();

    AppGrantRepository::upsert(&backend, membership, app, json!({"scope": "read"}))
        .await
        .unwrap();
    let replaced = AppGrantRepository::upsert(&backend, membership, app, json!({"scope": "write"}))
        .await
        .unwrap();
    assert_eq!(replaced.permissions, json!({"scope": "write"}));

    backend.revoke(membership, app).await.unwrap();
    assert!(AppGrantRepository::find(&backend, membership, app)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn tenant_updates_replace_the_row() {
    let backend = InMemoryBackend::new();
    let mut tenant = Tenant::new("Acme".into(), TenantPlan::Free, Uuid::new_v4(), vec![]);
    tenant = TenantRepository::create(&backend, tenant).await.unwrap();

    tenant.is_active = false;
    TenantRepository::update(&backend, tenant.clone()).await.unwrap();
    let fetched = TenantRepository::find_by_id(&backend, tenant.id).await.unwrap().unwrap();
    assert!(!fetched.is_active);

    // Updating an unknown tenant is a not-found error
    let ghost = Tenant::new("Ghost".into(), TenantPlan::Free, Uuid::new_v4(), vec![]);
    assert!(TenantRepository::update(&backend, ghost).await.is_err());
}

#[tokio::test]
async fn provisioning_session_is_atomic_and_upserting() {
    let backend = InMemoryBackend::new();
    let tenant = Uuid::new_v4();

    let mut session = backend.begin_provisioning(tenant).await.unwrap();
    let def = definition(tenant, "clients");
    let def_id = def.id;
    session.stage_definition(def, vec![field(def_id, "name", 0)]);
    let receipt = session.commit().await.unwrap();
    assert_eq!(receipt.counts.definitions_created, 1);
    assert_eq!(receipt.module_ids["clients"], def_id);

    // A second session staging the same slug reuses the existing row
    let mut session = backend.begin_provisioning(tenant).await.unwrap();
    session.stage_definition(definition(tenant, "clients"), vec![]);
    let receipt = session.commit().await.unwrap();
    assert_eq!(receipt.counts.definitions_created, 0);
    assert_eq!(receipt.counts.definitions_existing, 1);
    assert_eq!(receipt.module_ids["clients"], def_id);
}
