//! Domain types shared across the Tessera services
//!
//! These are the canonical shapes handed between the REST layer, the
//! authorization pipeline and the repository contracts. Storage backends map
//! their own rows into these types at the trait boundary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::enums::{FieldType, PermissionAction, TenantPlan, WidgetKind, WorkflowTrigger, WritePermission};

/// An isolated organization; the root of multi-tenancy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub plan: TenantPlan,
    /// App codes this tenant's plan permits enabling
    pub allowed_apps: Vec<String>,
    pub owner_user_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(name: String, plan: TenantPlan, owner_user_id: Uuid, allowed_apps: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            plan,
            allowed_apps,
            owner_user_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user's association with a tenant, carrying their role
///
/// Unique per `(tenant_id, user_id)`. The role is a string: either one of the
/// built-in names or the name of a tenant [`CustomRole`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(tenant_id: Uuid, user_id: Uuid, role: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            user_id,
            role: role.into(),
            is_active: true,
            joined_at: Utc::now(),
        }
    }
}

/// Platform-level catalog entry for an installable app
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: Uuid,
    /// Stable code routes declare as their required app (`"crm"`, `"projects"`, ...)
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Core apps are enabled for every new tenant
    pub is_core: bool,
}

/// Per-tenant enablement of a catalog app
///
/// Unique per `(tenant_id, app_id)`. Gates whether the app's routes are
/// reachable for anyone in the tenant, including owners.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantApp {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub app_id: Uuid,
    pub enabled: bool,
    pub updated_at: DateTime<Utc>,
}

/// Explicit app access for a single membership
///
/// Non-privileged roles are denied app access by default; a grant row opts a
/// member in. Unique per `(membership_id, app_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppGrant {
    pub id: Uuid,
    pub membership_id: Uuid,
    pub app_id: Uuid,
    /// Free-form grant payload (e.g. per-feature toggles inside the app)
    pub permissions: Value,
    pub granted_at: DateTime<Utc>,
}

/// Per-entity action flags plus optional field visibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntityPermissions {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: WritePermission,
    #[serde(default)]
    pub delete: bool,
    /// Field visibility map; only keys explicitly set to `false` are hidden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, bool>>,
}

impl EntityPermissions {
    pub fn full() -> Self {
        Self {
            read: true,
            write: WritePermission::Allowed,
            delete: true,
            fields: None,
        }
    }

    pub fn read_only() -> Self {
        Self {
            read: true,
            write: WritePermission::Denied,
            delete: false,
            fields: None,
        }
    }

    pub fn action_allowed(&self, action: PermissionAction) -> bool {
        match action {
            PermissionAction::Read => self.read,
            PermissionAction::Write => self.write.permits(),
            PermissionAction::Delete => self.delete,
        }
    }
}

/// A role's full permission matrix: entity name -> action flags
///
/// The reserved `"*"` key acts as a fallback for entities without an explicit
/// entry; built-in roles use it so they keep working for entity types created
/// after the role was seeded. An explicit entry always wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PermissionMatrix(pub BTreeMap<String, EntityPermissions>);

impl PermissionMatrix {
    pub const WILDCARD: &'static str = "*";

    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Matrix granting everything on every entity (god context, owner role)
    pub fn unrestricted() -> Self {
        let mut map = BTreeMap::new();
        map.insert(Self::WILDCARD.to_string(), EntityPermissions::full());
        Self(map)
    }

    pub fn with_entity(mut self, entity: impl Into<String>, perms: EntityPermissions) -> Self {
        self.0.insert(entity.into(), perms);
        self
    }

    /// Entry for an entity, falling back to the wildcard entry
    pub fn entry(&self, entity: &str) -> Option<&EntityPermissions> {
        self.0.get(entity).or_else(|| self.0.get(Self::WILDCARD))
    }
}

/// Tenant-defined role with a permission matrix
///
/// Unique per `(tenant_id, name)`. System roles are seeded at tenant creation
/// and reject mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRole {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub permissions: PermissionMatrix,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Tenant-authored schema for a custom record type
///
/// Unique per `(tenant_id, slug)`; the slug is derived from the name at
/// creation time and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// One field of an entity definition
///
/// `order` fixes the display and validation sequence; `key` is unique within
/// the definition and names the property inside record `data` payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityField {
    pub id: Uuid,
    pub definition_id: Uuid,
    pub name: String,
    pub key: String,
    pub field_type: FieldType,
    pub is_required: bool,
    /// Option labels for select/multi-select fields; empty otherwise
    pub options: Vec<String>,
    pub order: i32,
}

/// A data instance of a tenant-defined entity type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub definition_id: Uuid,
    /// Schema-shaped payload keyed by field keys
    pub data: Value,
    pub owner_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ordered action inside a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowAction {
    /// Action kind (`"send_email"`, `"update_field"`, `"create_task"`, ...)
    pub kind: String,
    pub params: Value,
    pub order: i32,
}

/// A tenant automation generated from a template blueprint
///
/// References its module by slug: slugs are the stable identifier blueprints
/// speak in, and the workflow layer resolves them at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub module_slug: String,
    pub trigger: WorkflowTrigger,
    pub actions: Vec<WorkflowAction>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// One widget on a dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWidget {
    pub title: String,
    pub kind: WidgetKind,
    pub module_slug: String,
    pub config: Value,
    pub position: i32,
}

/// A role-targeted dashboard generated from a template blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    /// Role name this dashboard is shown to
    pub role: String,
    pub widgets: Vec<DashboardWidget>,
    pub created_at: DateTime<Utc>,
}

/// Field blueprint inside a template module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBlueprint {
    pub name: String,
    pub key: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Module blueprint: mirrors the definition-plus-fields shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleBlueprint {
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<FieldBlueprint>,
}

/// Workflow blueprint inside a template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowBlueprint {
    pub name: String,
    pub module_slug: String,
    pub trigger: WorkflowTrigger,
    pub actions: Vec<WorkflowAction>,
}

/// Dashboard blueprint inside a template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBlueprint {
    pub name: String,
    pub role: String,
    pub widgets: Vec<WidgetBlueprint>,
}

/// Widget blueprint inside a dashboard blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetBlueprint {
    pub title: String,
    pub kind: WidgetKind,
    pub module_slug: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub position: i32,
}

/// Immutable industry blueprint used to bootstrap a tenant's workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryTemplate {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub modules: Vec<ModuleBlueprint>,
    pub workflows: Vec<WorkflowBlueprint>,
    pub dashboards: Vec<DashboardBlueprint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_wildcard_fallback() {
        let matrix = PermissionMatrix::new()
            .with_entity("*", EntityPermissions::read_only())
            .with_entity("client", EntityPermissions::full());

        // Explicit entry wins over the wildcard
        assert!(matrix.entry("client").unwrap().delete);
        // Unlisted entity falls back to the wildcard
        assert!(!matrix.entry("invoice").unwrap().delete);
        assert!(matrix.entry("invoice").unwrap().read);
    }

    #[test]
    fn test_matrix_without_wildcard_has_no_entry() {
        let matrix = PermissionMatrix::new().with_entity("client", EntityPermissions::full());
        assert!(matrix.entry("invoice").is_none());
    }

    #[test]
    fn test_matrix_serde_round_trip() {
        let json = serde_json::json!({
            "client": {"read": true, "write": "own", "delete": false, "fields": {"ssn": false}}
        });
        let matrix: PermissionMatrix = serde_json::from_value(json.clone()).unwrap();
        let entry = matrix.entry("client").unwrap();
        assert!(entry.read);
        assert!(entry.write.is_own_only());
        assert!(!entry.delete);
        assert_eq!(serde_json::to_value(&matrix).unwrap(), json);
    }
}
