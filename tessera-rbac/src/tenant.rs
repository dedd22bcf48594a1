//! Tenant lifecycle management
//!
//! Creation seeds the owner membership, the four system roles and the core
//! app enablements; the rest is membership and app-enablement housekeeping
//! used by the tenant routes.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tessera_api_types::{App, AppGrant, BuiltinRole, Membership, Tenant, TenantApp, TenantPlan};
use tessera_interfaces::{AuditAction, AuditEvent, AuditSink, RepositoryFactory};

use crate::{
    error::{RbacError, RbacResult},
    roles::RoleService,
};

/// Tenant manager for multi-tenant operations
#[derive(Clone)]
pub struct TenantManager {
    repos: Arc<dyn RepositoryFactory>,
    roles: RoleService,
    audit: Arc<dyn AuditSink>,
}

impl TenantManager {
    pub fn new(repos: Arc<dyn RepositoryFactory>, roles: RoleService, audit: Arc<dyn AuditSink>) -> Self {
        Self { repos, roles, audit }
    }

    /// Create a tenant: the tenant row, the owner membership, the system
    /// roles, and an enablement row for every core app
    ///
    /// `allowed_apps` defaults to the full catalog when not constrained by a
    /// plan.
    pub async fn create_tenant(
        &self,
        name: String,
        plan: TenantPlan,
        owner_user_id: Uuid,
        allowed_apps: Option<Vec<String>>,
        actor: Option<Uuid>,
    ) -> RbacResult<Tenant> {
        let catalog = self.repos.apps().list().await?;
        let allowed = match allowed_apps {
            Some(apps) => apps,
            None => catalog.iter().map(|app| app.code.clone()).collect(),
        };

        let tenant = self
            .repos
            .tenants()
            .create(Tenant::new(name, plan, owner_user_id, allowed))
            .await?;

        self.repos
            .memberships()
            .create(Membership::new(tenant.id, owner_user_id, BuiltinRole::Owner.as_str()))
            .await?;

        self.roles.seed_system_roles(tenant.id, actor).await?;

        for app in catalog.iter().filter(|app| app.is_core) {
            self.repos.tenant_apps().upsert(tenant.id, app.id, true).await?;
        }

        self.audit
            .record(
                AuditEvent::new(Some(tenant.id), actor, AuditAction::Created, "tenant", tenant.id)
                    .with_new_value(serde_json::json!({"name": tenant.name, "plan": tenant.plan})),
            )
            .await;
        info!(tenant_id = %tenant.id, name = %tenant.name, "tenant created");
        Ok(tenant)
    }

    pub async fn get_tenant(&self, tenant_id: Uuid) -> RbacResult<Tenant> {
        self.repos
            .tenants()
            .find_by_id(tenant_id)
            .await?
            .ok_or(RbacError::TenantNotFound { tenant_id })
    }

    pub async fn list_tenants(&self) -> RbacResult<Vec<Tenant>> {
        Ok(self.repos.tenants().list().await?)
    }

    /// Add a member with a role name (built-in or custom)
    pub async fn add_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: &str,
        actor: Option<Uuid>,
    ) -> RbacResult<Membership> {
        // Fails fast on unknown custom role names
        self.roles.resolve_matrix(tenant_id, role).await?;

        let membership = self
            .repos
            .memberships()
            .create(Membership::new(tenant_id, user_id, role))
            .await?;

        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Created, "membership", membership.id)
                    .with_new_value(serde_json::json!({"userId": user_id, "role": role})),
            )
            .await;
        Ok(membership)
    }

    pub async fn list_members(&self, tenant_id: Uuid) -> RbacResult<Vec<Membership>> {
        Ok(self.repos.memberships().list_by_tenant(tenant_id).await?)
    }

    /// Look up an app by its stable code
    pub async fn require_app(&self, code: &str) -> RbacResult<App> {
        self.repos
            .apps()
            .find_by_code(code)
            .await?
            .ok_or_else(|| RbacError::AppNotFound { code: code.to_string() })
    }

    /// Enablement status for one app, if a row exists
    pub async fn app_status(&self, tenant_id: Uuid, app_id: Uuid) -> RbacResult<Option<TenantApp>> {
        Ok(self.repos.tenant_apps().find(tenant_id, app_id).await?)
    }

    /// Enable or disable an app for a tenant
    ///
    /// Enabling an app outside the tenant's `allowed_apps` rejects; a
    /// disabled-but-allowed app can always be re-enabled.
    pub async fn set_app_enabled(
        &self,
        tenant_id: Uuid,
        app: &App,
        enabled: bool,
        actor: Option<Uuid>,
    ) -> RbacResult<TenantApp> {
        if enabled {
            let tenant = self.get_tenant(tenant_id).await?;
            if !tenant.allowed_apps.iter().any(|code| code == &app.code) {
                return Err(RbacError::AppNotAllowed { code: app.code.clone() });
            }
        }

        let row = self.repos.tenant_apps().upsert(tenant_id, app.id, enabled).await?;
        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Updated, "tenant_app", row.id)
                    .with_new_value(serde_json::json!({"app": app.code, "enabled": enabled})),
            )
            .await;
        info!(%tenant_id, app = %app.code, enabled, "app enablement changed");
        Ok(row)
    }

    /// Drop the enablement row entirely (uninstall)
    pub async fn remove_app(&self, tenant_id: Uuid, app: &App, actor: Option<Uuid>) -> RbacResult<()> {
        self.repos.tenant_apps().delete(tenant_id, app.id).await?;
        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Deleted, "tenant_app", app.id)
                    .with_old_value(serde_json::json!({"app": app.code})),
            )
            .await;
        Ok(())
    }

    /// Grant a member explicit access to an app
    pub async fn grant_app(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        app: &App,
        permissions: serde_json::Value,
        actor: Option<Uuid>,
    ) -> RbacResult<AppGrant> {
        let membership = self
            .repos
            .memberships()
            .find_by_tenant_and_user(tenant_id, user_id)
            .await?
            .ok_or(RbacError::MembershipNotFound { tenant_id, user_id })?;

        let grant = self
            .repos
            .app_grants()
            .upsert(membership.id, app.id, permissions)
            .await?;

        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Created, "app_grant", grant.id)
                    .with_new_value(serde_json::json!({"userId": user_id, "app": app.code})),
            )
            .await;
        Ok(grant)
    }

    /// Revoke a member's explicit app access
    pub async fn revoke_app(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        app: &App,
        actor: Option<Uuid>,
    ) -> RbacResult<()> {
        let membership = self
            .repos
            .memberships()
            .find_by_tenant_and_user(tenant_id, user_id)
            .await?
            .ok_or(RbacError::MembershipNotFound { tenant_id, user_id })?;

        self.repos.app_grants().revoke(membership.id, app.id).await?;
        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Deleted, "app_grant", membership.id)
                    .with_old_value(serde_json::json!({"userId": user_id, "app": app.code})),
            )
            .await;
        Ok(())
    }
}
