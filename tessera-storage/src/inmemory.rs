//! The in-memory backend
//!
//! One `RwLock` over plain row vectors. Uniqueness checks run under the
//! write lock, so constraint behavior matches what a relational unique index
//! would do, one writer at a time. Provisioning sessions buffer rows and
//! apply them in a single locked commit: atomic, with upsert semantics on
//! the natural keys.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use tessera_api_types::{
    App, AppGrant, CustomRole, Dashboard, EntityDefinition, EntityField, EntityRecord,
    IndustryTemplate, Membership, Tenant, TenantApp, Workflow,
};
use tessera_interfaces::{
    AppGrantRepository, AppRepository, DashboardRepository, DatabaseError, DefinitionWithFields,
    EntityDefinitionRepository, EntityRecordRepository, MembershipRepository, ProvisionCounts,
    ProvisionReceipt, ProvisioningSession, Repository, RepositoryFactory, RoleRepository,
    TemplateRepository, TenantAppRepository, TenantRepository, WorkflowRepository,
};

#[derive(Default)]
struct StoreState {
    tenants: Vec<Tenant>,
    memberships: Vec<Membership>,
    apps: Vec<App>,
    tenant_apps: Vec<TenantApp>,
    app_grants: Vec<AppGrant>,
    roles: Vec<CustomRole>,
    definitions: Vec<EntityDefinition>,
    fields: Vec<EntityField>,
    records: Vec<EntityRecord>,
    templates: Vec<IndustryTemplate>,
    workflows: Vec<Workflow>,
    dashboards: Vec<Dashboard>,
}

/// In-memory implementation of every repository trait
///
/// Cloning shares the underlying store, matching the pooled-connection feel
/// of a real backend.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an immutable template blueprint (seed path; the repository
    /// trait is read-only by design)
    pub async fn insert_template(&self, template: IndustryTemplate) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if state.templates.iter().any(|t| t.slug == template.slug) {
            return Err(DatabaseError::unique_violation("industry_templates.slug"));
        }
        state.templates.push(template);
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryBackend {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        // A poisoned lock is impossible with tokio's RwLock; nothing to probe
        Ok(())
    }
}

#[async_trait]
impl TenantRepository for InMemoryBackend {
    async fn create(&self, tenant: Tenant) -> Result<Tenant, DatabaseError> {
        let mut state = self.state.write().await;
        state.tenants.push(tenant.clone());
        Ok(tenant)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Tenant>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.tenants.clone())
    }

    async fn update(&self, tenant: Tenant) -> Result<Tenant, DatabaseError> {
        let mut state = self.state.write().await;
        let slot = state
            .tenants
            .iter_mut()
            .find(|t| t.id == tenant.id)
            .ok_or_else(|| DatabaseError::not_found("tenant", tenant.id))?;
        *slot = tenant.clone();
        Ok(tenant)
    }
}

#[async_trait]
impl MembershipRepository for InMemoryBackend {
    async fn create(&self, membership: Membership) -> Result<Membership, DatabaseError> {
        let mut state = self.state.write().await;
        if state
            .memberships
            .iter()
            .any(|m| m.tenant_id == membership.tenant_id && m.user_id == membership.user_id)
        {
            return Err(DatabaseError::unique_violation("memberships.tenant_id_user_id"));
        }
        state.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Membership>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.memberships.iter().find(|m| m.id == id).cloned())
    }

    async fn find_by_tenant_and_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .find(|m| m.tenant_id == tenant_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Membership>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn set_role(&self, id: Uuid, role: &str) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        let membership = state
            .memberships
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| DatabaseError::not_found("membership", id))?;
        membership.role = role.to_string();
        Ok(())
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        let membership = state
            .memberships
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| DatabaseError::not_found("membership", id))?;
        membership.is_active = is_active;
        Ok(())
    }
}

#[async_trait]
impl AppRepository for InMemoryBackend {
    async fn create(&self, app: App) -> Result<App, DatabaseError> {
        let mut state = self.state.write().await;
        if state.apps.iter().any(|a| a.code == app.code) {
            return Err(DatabaseError::unique_violation("apps.code"));
        }
        state.apps.push(app.clone());
        Ok(app)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<App>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.apps.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<App>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.apps.iter().find(|a| a.code == code).cloned())
    }

    async fn list(&self) -> Result<Vec<App>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.apps.clone())
    }
}

#[async_trait]
impl TenantAppRepository for InMemoryBackend {
    async fn find(&self, tenant_id: Uuid, app_id: Uuid) -> Result<Option<TenantApp>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .tenant_apps
            .iter()
            .find(|ta| ta.tenant_id == tenant_id && ta.app_id == app_id)
            .cloned())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<TenantApp>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .tenant_apps
            .iter()
            .filter(|ta| ta.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn upsert(&self, tenant_id: Uuid, app_id: Uuid, enabled: bool) -> Result<TenantApp, DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .tenant_apps
            .iter_mut()
            .find(|ta| ta.tenant_id == tenant_id && ta.app_id == app_id)
        {
            existing.enabled = enabled;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        let row = TenantApp {
            id: Uuid::new_v4(),
            tenant_id,
            app_id,
            enabled,
            updated_at: Utc::now(),
        };
        state.tenant_apps.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, tenant_id: Uuid, app_id: Uuid) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        // Deleting an absent enablement row is a no-op, keeping the route idempotent
        state
            .tenant_apps
            .retain(|ta| !(ta.tenant_id == tenant_id && ta.app_id == app_id));
        Ok(())
    }
}

#[async_trait]
impl AppGrantRepository for InMemoryBackend {
    async fn find(&self, membership_id: Uuid, app_id: Uuid) -> Result<Option<AppGrant>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .app_grants
            .iter()
            .find(|g| g.membership_id == membership_id && g.app_id == app_id)
            .cloned())
    }

    async fn upsert(
        &self,
        membership_id: Uuid,
        app_id: Uuid,
        permissions: serde_json::Value,
    ) -> Result<AppGrant, DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .app_grants
            .iter_mut()
            .find(|g| g.membership_id == membership_id && g.app_id == app_id)
        {
            existing.permissions = permissions;
            return Ok(existing.clone());
        }
        let grant = AppGrant {
            id: Uuid::new_v4(),
            membership_id,
            app_id,
            permissions,
            granted_at: Utc::now(),
        };
        state.app_grants.push(grant.clone());
        Ok(grant)
    }

    async fn revoke(&self, membership_id: Uuid, app_id: Uuid) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        state
            .app_grants
            .retain(|g| !(g.membership_id == membership_id && g.app_id == app_id));
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryBackend {
    async fn create(&self, role: CustomRole) -> Result<CustomRole, DatabaseError> {
        let mut state = self.state.write().await;
        if state
            .roles
            .iter()
            .any(|r| r.tenant_id == role.tenant_id && r.name == role.name)
        {
            return Err(DatabaseError::unique_violation("custom_roles.tenant_id_name"));
        }
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomRole>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> Result<Option<CustomRole>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .iter()
            .find(|r| r.tenant_id == tenant_id && r.name == name)
            .cloned())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<CustomRole>, DatabaseError> {
        let state = self.state.read().await;
        let mut roles: Vec<CustomRole> = state
            .roles
            .iter()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn update(&self, role: CustomRole) -> Result<CustomRole, DatabaseError> {
        let mut state = self.state.write().await;
        let slot = state
            .roles
            .iter_mut()
            .find(|r| r.id == role.id)
            .ok_or_else(|| DatabaseError::not_found("custom_role", role.id))?;
        *slot = role.clone();
        Ok(role)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        let before = state.roles.len();
        state.roles.retain(|r| r.id != id);
        if state.roles.len() == before {
            return Err(DatabaseError::not_found("custom_role", id));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityDefinitionRepository for InMemoryBackend {
    async fn create_with_fields(
        &self,
        definition: EntityDefinition,
        fields: Vec<EntityField>,
    ) -> Result<DefinitionWithFields, DatabaseError> {
        let mut state = self.state.write().await;
        if state
            .definitions
            .iter()
            .any(|d| d.tenant_id == definition.tenant_id && d.slug == definition.slug)
        {
            return Err(DatabaseError::unique_violation("entity_definitions.tenant_id_slug"));
        }
        state.definitions.push(definition.clone());
        state.fields.extend(fields.iter().cloned());
        Ok(DefinitionWithFields { definition, fields })
    }

    async fn find_by_slug(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<DefinitionWithFields>, DatabaseError> {
        let state = self.state.read().await;
        let Some(definition) = state
            .definitions
            .iter()
            .find(|d| d.tenant_id == tenant_id && d.slug == slug)
            .cloned()
        else {
            return Ok(None);
        };
        let mut fields: Vec<EntityField> = state
            .fields
            .iter()
            .filter(|f| f.definition_id == definition.id)
            .cloned()
            .collect();
        fields.sort_by_key(|f| f.order);
        Ok(Some(DefinitionWithFields { definition, fields }))
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<EntityDefinition>, DatabaseError> {
        let state = self.state.read().await;
        let mut definitions: Vec<EntityDefinition> = state
            .definitions
            .iter()
            .filter(|d| d.tenant_id == tenant_id)
            .cloned()
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(definitions)
    }
}

#[async_trait]
impl EntityRecordRepository for InMemoryBackend {
    async fn create(&self, record: EntityRecord) -> Result<EntityRecord, DatabaseError> {
        let mut state = self.state.write().await;
        state.records.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EntityRecord>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_definition(
        &self,
        tenant_id: Uuid,
        definition_id: Uuid,
    ) -> Result<Vec<EntityRecord>, DatabaseError> {
        let state = self.state.read().await;
        let mut records: Vec<EntityRecord> = state
            .records
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.definition_id == definition_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn update(&self, record: EntityRecord) -> Result<EntityRecord, DatabaseError> {
        let mut state = self.state.write().await;
        let slot = state
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| DatabaseError::not_found("entity_record", record.id))?;
        *slot = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        if state.records.len() == before {
            return Err(DatabaseError::not_found("entity_record", id));
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateRepository for InMemoryBackend {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<IndustryTemplate>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.templates.iter().find(|t| t.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<IndustryTemplate>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.templates.clone())
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryBackend {
    async fn create(&self, workflow: Workflow) -> Result<Workflow, DatabaseError> {
        let mut state = self.state.write().await;
        state.workflows.push(workflow.clone());
        Ok(workflow)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Workflow>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .workflows
            .iter()
            .filter(|w| w.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DashboardRepository for InMemoryBackend {
    async fn create(&self, dashboard: Dashboard) -> Result<Dashboard, DatabaseError> {
        let mut state = self.state.write().await;
        state.dashboards.push(dashboard.clone());
        Ok(dashboard)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Dashboard>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .dashboards
            .iter()
            .filter(|d| d.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

/// Buffered provisioning writes, applied in one locked commit
struct InMemoryProvisioningSession {
    state: Arc<RwLock<StoreState>>,
    tenant_id: Uuid,
    definitions: Vec<(EntityDefinition, Vec<EntityField>)>,
    workflows: Vec<Workflow>,
    dashboards: Vec<Dashboard>,
}

#[async_trait]
impl ProvisioningSession for InMemoryProvisioningSession {
    fn stage_definition(&mut self, definition: EntityDefinition, fields: Vec<EntityField>) {
        self.definitions.push((definition, fields));
    }

    fn stage_workflow(&mut self, workflow: Workflow) {
        self.workflows.push(workflow);
    }

    fn stage_dashboard(&mut self, dashboard: Dashboard) {
        self.dashboards.push(dashboard);
    }

    async fn commit(self: Box<Self>) -> Result<ProvisionReceipt, DatabaseError> {
        // One write lock for the whole commit: concurrent instantiations
        // serialize here, and the loser sees the winner's rows as existing.
        let mut state = self.state.write().await;
        let mut module_ids = BTreeMap::new();
        let mut counts = ProvisionCounts::default();

        // Definitions first: workflows and dashboards reference them by slug.
        for (definition, fields) in self.definitions {
            let existing_id = state
                .definitions
                .iter()
                .find(|d| d.tenant_id == self.tenant_id && d.slug == definition.slug)
                .map(|d| d.id);
            match existing_id {
                Some(id) => {
                    module_ids.insert(definition.slug.clone(), id);
                    counts.definitions_existing += 1;
                }
                None => {
                    module_ids.insert(definition.slug.clone(), definition.id);
                    state.definitions.push(definition);
                    state.fields.extend(fields);
                    counts.definitions_created += 1;
                }
            }
        }

        for workflow in self.workflows {
            if state
                .workflows
                .iter()
                .any(|w| w.tenant_id == self.tenant_id && w.name == workflow.name)
            {
                counts.workflows_existing += 1;
            } else {
                state.workflows.push(workflow);
                counts.workflows_created += 1;
            }
        }

        for dashboard in self.dashboards {
            if state
                .dashboards
                .iter()
                .any(|d| d.tenant_id == self.tenant_id && d.name == dashboard.name)
            {
                counts.dashboards_existing += 1;
            } else {
                state.dashboards.push(dashboard);
                counts.dashboards_created += 1;
            }
        }

        Ok(ProvisionReceipt { module_ids, counts })
    }
}

#[async_trait]
impl RepositoryFactory for InMemoryBackend {
    fn tenants(&self) -> &dyn TenantRepository {
        self
    }

    fn memberships(&self) -> &dyn MembershipRepository {
        self
    }

    fn apps(&self) -> &dyn AppRepository {
        self
    }

    fn tenant_apps(&self) -> &dyn TenantAppRepository {
        self
    }

    fn app_grants(&self) -> &dyn AppGrantRepository {
        self
    }

    fn roles(&self) -> &dyn RoleRepository {
        self
    }

    fn entity_definitions(&self) -> &dyn EntityDefinitionRepository {
        self
    }

    fn entity_records(&self) -> &dyn EntityRecordRepository {
        self
    }

    fn templates(&self) -> &dyn TemplateRepository {
        self
    }

    fn workflows(&self) -> &dyn WorkflowRepository {
        self
    }

    fn dashboards(&self) -> &dyn DashboardRepository {
        self
    }

    async fn begin_provisioning(
        &self,
        tenant_id: Uuid,
    ) -> Result<Box<dyn ProvisioningSession>, DatabaseError> {
        Ok(Box::new(InMemoryProvisioningSession {
            state: self.state.clone(),
            tenant_id,
            definitions: Vec::new(),
            workflows: Vec::new(),
            dashboards: Vec::new(),
        }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Repository::health_check(self).await
    }
}
