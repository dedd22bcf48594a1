//! Entity engine tests against the in-memory backend

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use tessera_api_types::FieldType;
use tessera_entity::{DefinitionDraft, EntityError, EntityService, FieldDraft};
use tessera_interfaces::NullAuditSink;
use tessera_storage::InMemoryBackend;

fn service() -> EntityService {
    EntityService::new(Arc::new(InMemoryBackend::new()), Arc::new(NullAuditSink))
}

fn client_draft() -> DefinitionDraft {
    DefinitionDraft {
        name: "Clients".into(),
        icon: Some("briefcase".into()),
        description: None,
        fields: vec![
            FieldDraft {
                name: "Full name".into(),
                key: "name".into(),
                field_type: FieldType::Text,
                is_required: true,
                options: vec![],
            },
            FieldDraft {
                name: "Stage".into(),
                key: "stage".into(),
                field_type: FieldType::Select,
                is_required: false,
                options: vec!["lead".into(), "active".into()],
            },
        ],
    }
}

#[tokio::test]
async fn definition_round_trip_with_field_order() {
    let entities = service();
    let tenant = Uuid::new_v4();

    let created = entities.create_definition(tenant, client_draft(), None).await.unwrap();
    assert_eq!(created.definition.slug, "clients");

    let fetched = entities.get_definition(tenant, "clients").await.unwrap();
    let keys: Vec<&str> = fetched.fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["name", "stage"]);
    assert_eq!(fetched.fields[0].order, 0);
    assert_eq!(fetched.fields[1].order, 1);
}

#[tokio::test]
async fn same_name_collides_on_slug() {
    let entities = service();
    let tenant = Uuid::new_v4();

    entities.create_definition(tenant, client_draft(), None).await.unwrap();

    // A differently-cased name derives the same slug
    let mut second = client_draft();
    second.name = "CLIENTS".into();
    let err = entities.create_definition(tenant, second, None).await.unwrap_err();
    assert!(matches!(err, EntityError::DuplicateSlug { slug } if slug == "clients"));
}

#[tokio::test]
async fn same_slug_in_another_tenant_is_fine() {
    let entities = service();
    entities
        .create_definition(Uuid::new_v4(), client_draft(), None)
        .await
        .unwrap();
    assert!(entities
        .create_definition(Uuid::new_v4(), client_draft(), None)
        .await
        .is_ok());
}

#[tokio::test]
async fn duplicate_field_keys_rejected() {
    let entities = service();
    let mut draft = client_draft();
    draft.fields.push(FieldDraft {
        name: "Name again".into(),
        key: "name".into(),
        field_type: FieldType::Text,
        is_required: false,
        options: vec![],
    });

    let err = entities
        .create_definition(Uuid::new_v4(), draft, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::DuplicateFieldKey { key } if key == "name"));
}

#[tokio::test]
async fn symbol_only_name_rejected() {
    let entities = service();
    let mut draft = client_draft();
    draft.name = "!!!".into();
    let err = entities
        .create_definition(Uuid::new_v4(), draft, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::InvalidName { .. }));
}

#[tokio::test]
async fn unknown_definition_propagates_not_found() {
    let entities = service();
    let tenant = Uuid::new_v4();

    let get = entities.get_definition(tenant, "ghosts").await.unwrap_err();
    assert!(matches!(get, EntityError::DefinitionNotFound { .. }));

    let create = entities
        .create_record(tenant, "ghosts", json!({}), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(create, EntityError::DefinitionNotFound { .. }));

    let list = entities.list_records(tenant, "ghosts").await.unwrap_err();
    assert!(matches!(list, EntityError::DefinitionNotFound { .. }));
}

#[tokio::test]
async fn record_ownership_set_from_actor() {
    let entities = service();
    let tenant = Uuid::new_v4();
    let actor = Uuid::new_v4();
    entities.create_definition(tenant, client_draft(), None).await.unwrap();

    let record = entities
        .create_record(tenant, "clients", json!({"name": "Acme"}), actor)
        .await
        .unwrap();
    assert_eq!(record.owner_id, actor);
    assert_eq!(record.created_by, actor);
}

#[tokio::test]
async fn invalid_record_payloads_rejected() {
    let entities = service();
    let tenant = Uuid::new_v4();
    let actor = Uuid::new_v4();
    entities.create_definition(tenant, client_draft(), None).await.unwrap();

    // Missing required field
    let err = entities
        .create_record(tenant, "clients", json!({"stage": "lead"}), actor)
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::RecordInvalid { .. }));

    // Option outside the select list
    let err = entities
        .create_record(tenant, "clients", json!({"name": "A", "stage": "lost"}), actor)
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::RecordInvalid { .. }));

    // Unknown key
    let err = entities
        .create_record(tenant, "clients", json!({"name": "A", "color": "red"}), actor)
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::RecordInvalid { .. }));
}

#[tokio::test]
async fn records_list_newest_first() {
    let entities = service();
    let tenant = Uuid::new_v4();
    let actor = Uuid::new_v4();
    entities.create_definition(tenant, client_draft(), None).await.unwrap();

    for name in ["first", "second", "third"] {
        entities
            .create_record(tenant, "clients", json!({"name": name}), actor)
            .await
            .unwrap();
        // Keep created_at strictly increasing
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let records = entities.list_records(tenant, "clients").await.unwrap();
    let names: Vec<&str> = records
        .iter()
        .map(|r| r.data.get("name").and_then(|v| v.as_str()).unwrap())
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn update_merges_and_revalidates() {
    let entities = service();
    let tenant = Uuid::new_v4();
    let actor = Uuid::new_v4();
    entities.create_definition(tenant, client_draft(), None).await.unwrap();

    let record = entities
        .create_record(tenant, "clients", json!({"name": "Acme", "stage": "lead"}), actor)
        .await
        .unwrap();

    let updated = entities
        .update_record(tenant, "clients", record.id, json!({"stage": "active"}), actor)
        .await
        .unwrap();
    assert_eq!(updated.data, json!({"name": "Acme", "stage": "active"}));

    let err = entities
        .update_record(tenant, "clients", record.id, json!({"stage": "zombie"}), actor)
        .await
        .unwrap_err();
    assert!(matches!(err, EntityError::RecordInvalid { .. }));
}

#[tokio::test]
async fn cross_definition_record_access_is_not_found() {
    let entities = service();
    let tenant = Uuid::new_v4();
    let actor = Uuid::new_v4();
    entities.create_definition(tenant, client_draft(), None).await.unwrap();

    let mut other = client_draft();
    other.name = "Vendors".into();
    entities.create_definition(tenant, other, None).await.unwrap();

    let record = entities
        .create_record(tenant, "clients", json!({"name": "Acme"}), actor)
        .await
        .unwrap();

    // The record exists, but not under the vendors definition
    let err = entities.get_record(tenant, "vendors", record.id).await.unwrap_err();
    assert!(matches!(err, EntityError::RecordNotFound { .. }));
}

#[tokio::test]
async fn delete_removes_the_record() {
    let entities = service();
    let tenant = Uuid::new_v4();
    let actor = Uuid::new_v4();
    entities.create_definition(tenant, client_draft(), None).await.unwrap();

    let record = entities
        .create_record(tenant, "clients", json!({"name": "Acme"}), actor)
        .await
        .unwrap();
    entities.delete_record(tenant, "clients", record.id, actor).await.unwrap();

    let err = entities.get_record(tenant, "clients", record.id).await.unwrap_err();
    assert!(matches!(err, EntityError::RecordNotFound { .. }));
}
