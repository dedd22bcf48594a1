//! Entity schema and record operations

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use tessera_api_types::{EntityDefinition, EntityField, EntityRecord, FieldType};
use tessera_interfaces::{
    AuditAction, AuditEvent, AuditSink, DefinitionWithFields, RepositoryFactory,
};

use crate::{
    error::{EntityError, EntityResult},
    slug::slugify,
    validation::validate_record,
};

/// Field shape accepted when creating a definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
    pub name: String,
    pub key: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Definition shape accepted from clients and template blueprints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionDraft {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FieldDraft>,
}

/// Dynamic entity schema engine
#[derive(Clone)]
pub struct EntityService {
    repos: Arc<dyn RepositoryFactory>,
    audit: Arc<dyn AuditSink>,
}

impl EntityService {
    pub fn new(repos: Arc<dyn RepositoryFactory>, audit: Arc<dyn AuditSink>) -> Self {
        Self { repos, audit }
    }

    /// Create a definition with its ordered fields in one write
    ///
    /// The slug is derived from the name; `(tenant, slug)` collisions surface
    /// as [`EntityError::DuplicateSlug`].
    pub async fn create_definition(
        &self,
        tenant_id: Uuid,
        draft: DefinitionDraft,
        actor: Option<Uuid>,
    ) -> EntityResult<DefinitionWithFields> {
        let slug = slugify(&draft.name).ok_or_else(|| EntityError::InvalidName {
            name: draft.name.clone(),
        })?;

        for (index, field) in draft.fields.iter().enumerate() {
            if draft.fields[..index].iter().any(|other| other.key == field.key) {
                return Err(EntityError::DuplicateFieldKey {
                    key: field.key.clone(),
                });
            }
        }

        let definition = EntityDefinition {
            id: Uuid::new_v4(),
            tenant_id,
            name: draft.name,
            slug: slug.clone(),
            icon: draft.icon,
            description: draft.description,
            created_at: Utc::now(),
            created_by: actor,
        };
        let fields = draft
            .fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| EntityField {
                id: Uuid::new_v4(),
                definition_id: definition.id,
                name: field.name,
                key: field.key,
                field_type: field.field_type,
                is_required: field.is_required,
                options: field.options,
                order: index as i32,
            })
            .collect();

        let created = self
            .repos
            .entity_definitions()
            .create_with_fields(definition, fields)
            .await
            .map_err(|err| {
                if err.is_unique_violation() {
                    EntityError::DuplicateSlug { slug: slug.clone() }
                } else {
                    err.into()
                }
            })?;

        self.audit
            .record(
                AuditEvent::new(
                    Some(tenant_id),
                    actor,
                    AuditAction::Created,
                    "entity_definition",
                    created.definition.id,
                )
                .with_new_value(serde_json::json!({"slug": created.definition.slug})),
            )
            .await;
        info!(%tenant_id, slug = %created.definition.slug, "entity definition created");
        Ok(created)
    }

    /// Fetch a definition with fields ordered ascending
    pub async fn get_definition(&self, tenant_id: Uuid, slug: &str) -> EntityResult<DefinitionWithFields> {
        self.repos
            .entity_definitions()
            .find_by_slug(tenant_id, slug)
            .await?
            .ok_or_else(|| EntityError::DefinitionNotFound { slug: slug.to_string() })
    }

    /// Definitions for a tenant, name ascending
    pub async fn list_definitions(&self, tenant_id: Uuid) -> EntityResult<Vec<EntityDefinition>> {
        Ok(self.repos.entity_definitions().list_by_tenant(tenant_id).await?)
    }

    /// Create a record after validating its payload against the definition
    pub async fn create_record(
        &self,
        tenant_id: Uuid,
        slug: &str,
        data: Value,
        actor: Uuid,
    ) -> EntityResult<EntityRecord> {
        let resolved = self.get_definition(tenant_id, slug).await?;

        let issues = validate_record(&resolved.fields, &data);
        if !issues.is_empty() {
            return Err(EntityError::RecordInvalid { issues });
        }

        let now = Utc::now();
        let record = EntityRecord {
            id: Uuid::new_v4(),
            tenant_id,
            definition_id: resolved.definition.id,
            data,
            owner_id: actor,
            created_by: actor,
            created_at: now,
            updated_at: now,
        };
        let created = self.repos.entity_records().create(record).await?;

        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), Some(actor), AuditAction::Created, "entity_record", created.id)
                    .with_new_value(created.data.clone()),
            )
            .await;
        Ok(created)
    }

    /// Fetch a record, treating cross-tenant or cross-definition ids as absent
    pub async fn get_record(&self, tenant_id: Uuid, slug: &str, id: Uuid) -> EntityResult<EntityRecord> {
        let resolved = self.get_definition(tenant_id, slug).await?;
        self.repos
            .entity_records()
            .find_by_id(id)
            .await?
            .filter(|record| record.tenant_id == tenant_id && record.definition_id == resolved.definition.id)
            .ok_or(EntityError::RecordNotFound { id })
    }

    /// Shallow-merge a patch into a record's data and re-validate
    pub async fn update_record(
        &self,
        tenant_id: Uuid,
        slug: &str,
        id: Uuid,
        patch: Value,
        actor: Uuid,
    ) -> EntityResult<EntityRecord> {
        let resolved = self.get_definition(tenant_id, slug).await?;
        let mut record = self.get_record(tenant_id, slug, id).await?;

        let old = record.data.clone();
        let merged = merge_patch(&record.data, &patch);
        let issues = validate_record(&resolved.fields, &merged);
        if !issues.is_empty() {
            return Err(EntityError::RecordInvalid { issues });
        }

        record.data = merged;
        record.updated_at = Utc::now();
        let updated = self.repos.entity_records().update(record).await?;

        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), Some(actor), AuditAction::Updated, "entity_record", updated.id)
                    .with_old_value(old)
                    .with_new_value(updated.data.clone()),
            )
            .await;
        Ok(updated)
    }

    /// Delete a record
    pub async fn delete_record(&self, tenant_id: Uuid, slug: &str, id: Uuid, actor: Uuid) -> EntityResult<()> {
        let record = self.get_record(tenant_id, slug, id).await?;
        self.repos.entity_records().delete(record.id).await?;

        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), Some(actor), AuditAction::Deleted, "entity_record", record.id)
                    .with_old_value(record.data),
            )
            .await;
        Ok(())
    }

    /// Records for a definition, newest first
    pub async fn list_records(&self, tenant_id: Uuid, slug: &str) -> EntityResult<Vec<EntityRecord>> {
        let resolved = self.get_definition(tenant_id, slug).await?;
        Ok(self
            .repos
            .entity_records()
            .list_by_definition(tenant_id, resolved.definition.id)
            .await?)
    }
}

/// Shallow object merge: patch keys override, everything else is kept
fn merge_patch(data: &Value, patch: &Value) -> Value {
    match (data, patch) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            for (key, value) in overlay {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_patch_overrides_and_keeps() {
        let merged = merge_patch(&json!({"a": 1, "b": 2}), &json!({"b": 3, "c": 4}));
        assert_eq!(merged, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_patch_non_object_replaces() {
        assert_eq!(merge_patch(&json!({"a": 1}), &json!(null)), json!(null));
    }
}
