//! Database repository interfaces
//!
//! These traits are the narrow seam between the Tessera core and whatever
//! persistence backend is wired in. The backend owns uniqueness enforcement
//! (the constraints are named on each trait); callers own translating the
//! resulting [`DatabaseError::UniqueViolation`] into their domain errors.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tessera_api_types::{
    App, AppGrant, CustomRole, Dashboard, EntityDefinition, EntityField, EntityRecord,
    IndustryTemplate, Membership, Tenant, TenantApp, Workflow,
};
use uuid::Uuid;

/// Common database error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatabaseError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violation: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Transaction error: {message}")]
    Transaction { message: String },

    #[error("Internal database error: {message}")]
    Internal { message: String },
}

impl DatabaseError {
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn unique_violation(constraint: impl Into<String>) -> Self {
        Self::UniqueViolation {
            constraint: constraint.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

/// Base repository trait with health check capability
#[async_trait]
pub trait Repository: Send + Sync {
    /// Check if the repository is healthy and can serve requests
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Tenant repository interface
#[async_trait]
pub trait TenantRepository: Repository {
    async fn create(&self, tenant: Tenant) -> Result<Tenant, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DatabaseError>;

    async fn list(&self) -> Result<Vec<Tenant>, DatabaseError>;

    async fn update(&self, tenant: Tenant) -> Result<Tenant, DatabaseError>;
}

/// Membership repository interface
///
/// Backend enforces `(tenant_id, user_id)` uniqueness.
#[async_trait]
pub trait MembershipRepository: Repository {
    async fn create(&self, membership: Membership) -> Result<Membership, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Membership>, DatabaseError>;

    /// The row the TenantCheck stage reads; `None` when the user has no
    /// association with the tenant at all
    async fn find_by_tenant_and_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, DatabaseError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Membership>, DatabaseError>;

    async fn set_role(&self, id: Uuid, role: &str) -> Result<(), DatabaseError>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<(), DatabaseError>;
}

/// Platform app catalog interface
#[async_trait]
pub trait AppRepository: Repository {
    async fn create(&self, app: App) -> Result<App, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<App>, DatabaseError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<App>, DatabaseError>;

    async fn list(&self) -> Result<Vec<App>, DatabaseError>;
}

/// Per-tenant app enablement interface
///
/// Backend enforces `(tenant_id, app_id)` uniqueness; `upsert` is the only
/// write path so enable/disable toggles never race into duplicate rows.
#[async_trait]
pub trait TenantAppRepository: Repository {
    async fn find(&self, tenant_id: Uuid, app_id: Uuid) -> Result<Option<TenantApp>, DatabaseError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<TenantApp>, DatabaseError>;

    async fn upsert(&self, tenant_id: Uuid, app_id: Uuid, enabled: bool) -> Result<TenantApp, DatabaseError>;

    async fn delete(&self, tenant_id: Uuid, app_id: Uuid) -> Result<(), DatabaseError>;
}

/// Explicit per-membership app grant interface
///
/// Backend enforces `(membership_id, app_id)` uniqueness.
#[async_trait]
pub trait AppGrantRepository: Repository {
    async fn find(&self, membership_id: Uuid, app_id: Uuid) -> Result<Option<AppGrant>, DatabaseError>;

    async fn upsert(
        &self,
        membership_id: Uuid,
        app_id: Uuid,
        permissions: serde_json::Value,
    ) -> Result<AppGrant, DatabaseError>;

    async fn revoke(&self, membership_id: Uuid, app_id: Uuid) -> Result<(), DatabaseError>;
}

/// Custom role repository interface
///
/// Backend enforces `(tenant_id, name)` uniqueness.
#[async_trait]
pub trait RoleRepository: Repository {
    async fn create(&self, role: CustomRole) -> Result<CustomRole, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomRole>, DatabaseError>;

    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> Result<Option<CustomRole>, DatabaseError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<CustomRole>, DatabaseError>;

    async fn update(&self, role: CustomRole) -> Result<CustomRole, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

/// An entity definition together with its ordered fields
#[derive(Debug, Clone)]
pub struct DefinitionWithFields {
    pub definition: EntityDefinition,
    /// Ascending by `order`
    pub fields: Vec<EntityField>,
}

/// Entity definition repository interface
///
/// Backend enforces `(tenant_id, slug)` uniqueness and returns fields in
/// ascending `order`.
#[async_trait]
pub trait EntityDefinitionRepository: Repository {
    /// Persist a definition with its fields in one write
    async fn create_with_fields(
        &self,
        definition: EntityDefinition,
        fields: Vec<EntityField>,
    ) -> Result<DefinitionWithFields, DatabaseError>;

    async fn find_by_slug(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> Result<Option<DefinitionWithFields>, DatabaseError>;

    /// Definitions for a tenant, name ascending, without field expansion
    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<EntityDefinition>, DatabaseError>;
}

/// Entity record repository interface
#[async_trait]
pub trait EntityRecordRepository: Repository {
    async fn create(&self, record: EntityRecord) -> Result<EntityRecord, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EntityRecord>, DatabaseError>;

    /// Records for a definition, creation time descending
    async fn list_by_definition(
        &self,
        tenant_id: Uuid,
        definition_id: Uuid,
    ) -> Result<Vec<EntityRecord>, DatabaseError>;

    async fn update(&self, record: EntityRecord) -> Result<EntityRecord, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

/// Industry template catalog interface (read-only blueprints)
#[async_trait]
pub trait TemplateRepository: Repository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<IndustryTemplate>, DatabaseError>;

    async fn list(&self) -> Result<Vec<IndustryTemplate>, DatabaseError>;
}

/// Workflow repository interface
#[async_trait]
pub trait WorkflowRepository: Repository {
    async fn create(&self, workflow: Workflow) -> Result<Workflow, DatabaseError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Workflow>, DatabaseError>;
}

/// Dashboard repository interface
#[async_trait]
pub trait DashboardRepository: Repository {
    async fn create(&self, dashboard: Dashboard) -> Result<Dashboard, DatabaseError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Dashboard>, DatabaseError>;
}

/// Row counts from a provisioning commit, split created vs already-present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionCounts {
    pub definitions_created: usize,
    pub definitions_existing: usize,
    pub workflows_created: usize,
    pub workflows_existing: usize,
    pub dashboards_created: usize,
    pub dashboards_existing: usize,
}

/// Result of committing a provisioning session
#[derive(Debug, Clone)]
pub struct ProvisionReceipt {
    /// Module slug -> definition id, covering staged and pre-existing rows
    pub module_ids: BTreeMap<String, Uuid>,
    pub counts: ProvisionCounts,
}

/// Staged multi-row write session for template instantiation
///
/// All staged rows commit atomically: either every row lands or none does.
/// Commits upsert — a definition staged for an occupied `(tenant, slug)`
/// reuses the existing row, and workflows/dashboards dedupe on
/// `(tenant, name)` — so re-running a provisioning converges instead of
/// failing. Definitions are applied before workflows and dashboards.
#[async_trait]
pub trait ProvisioningSession: Send {
    fn stage_definition(&mut self, definition: EntityDefinition, fields: Vec<EntityField>);

    fn stage_workflow(&mut self, workflow: Workflow);

    fn stage_dashboard(&mut self, dashboard: Dashboard);

    /// Apply every staged row under one exclusive commit
    async fn commit(self: Box<Self>) -> Result<ProvisionReceipt, DatabaseError>;
}

/// Factory trait handing out repository instances
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    fn tenants(&self) -> &dyn TenantRepository;

    fn memberships(&self) -> &dyn MembershipRepository;

    fn apps(&self) -> &dyn AppRepository;

    fn tenant_apps(&self) -> &dyn TenantAppRepository;

    fn app_grants(&self) -> &dyn AppGrantRepository;

    fn roles(&self) -> &dyn RoleRepository;

    fn entity_definitions(&self) -> &dyn EntityDefinitionRepository;

    fn entity_records(&self) -> &dyn EntityRecordRepository;

    fn templates(&self) -> &dyn TemplateRepository;

    fn workflows(&self) -> &dyn WorkflowRepository;

    fn dashboards(&self) -> &dyn DashboardRepository;

    /// Open a staged provisioning session for a tenant
    async fn begin_provisioning(
        &self,
        tenant_id: Uuid,
    ) -> Result<Box<dyn ProvisioningSession>, DatabaseError>;

    /// Check health of all repositories
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
