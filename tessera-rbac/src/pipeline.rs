//! The cascading authorization pipeline
//!
//! Requests pass through an ordered chain of guard stages:
//! `PlatformCheck -> TenantCheck -> AppCheck -> handler`. Each stage either
//! rejects (terminal, never retried) or returns an augmented context for the
//! next stage. There are no backward transitions and the chain is the only
//! composer, so a stage cannot run without its predecessors.
//!
//! Ordering inside the app stage is load-bearing: enablement is checked
//! before the owner/admin bypass, so a disabled app blocks even the
//! workspace owner.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use tessera_interfaces::RepositoryFactory;

use crate::{
    auth::{RequestContext, TenantScope, GOD_ROLE},
    error::{AuthError, AuthResult},
    IdentityClaims,
};

/// One decision stage in the guard chain
#[async_trait]
pub trait GuardStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Admit with an augmented context, or reject terminally
    async fn evaluate(&self, ctx: RequestContext) -> AuthResult<RequestContext>;
}

/// Left-to-right composition of guard stages
pub struct GuardChain {
    stages: Vec<Arc<dyn GuardStage>>,
}

impl GuardChain {
    pub fn new(stages: Vec<Arc<dyn GuardStage>>) -> Self {
        Self { stages }
    }

    /// Run every stage in order, short-circuiting on the first rejection
    pub async fn run(&self, mut ctx: RequestContext) -> AuthResult<RequestContext> {
        for stage in &self.stages {
            ctx = stage.evaluate(ctx).await?;
            debug!(stage = stage.name(), subject = %ctx.claims.subject_id, "guard stage admitted");
        }
        Ok(ctx)
    }
}

/// PlatformCheck: platform-root routes require a god-mode claim
pub struct PlatformStage;

#[async_trait]
impl GuardStage for PlatformStage {
    fn name(&self) -> &'static str {
        "platform"
    }

    async fn evaluate(&self, ctx: RequestContext) -> AuthResult<RequestContext> {
        if !ctx.claims.is_god {
            return Err(AuthError::GodModeRequired);
        }
        Ok(ctx)
    }
}

/// TenantCheck: resolves the tenant scope for the request
///
/// God-mode claims admit unconditionally with the [`GOD_ROLE`] scope and no
/// membership; everyone else needs an active membership row.
pub struct TenantStage {
    repos: Arc<dyn RepositoryFactory>,
}

impl TenantStage {
    pub fn new(repos: Arc<dyn RepositoryFactory>) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl GuardStage for TenantStage {
    fn name(&self) -> &'static str {
        "tenant"
    }

    async fn evaluate(&self, ctx: RequestContext) -> AuthResult<RequestContext> {
        let tenant_id = ctx.tenant_ref.ok_or(AuthError::TenantRequired)?;

        if ctx.claims.is_god {
            let scope = TenantScope {
                tenant_id,
                role: GOD_ROLE.to_string(),
                membership_id: None,
            };
            return Ok(ctx.with_scope(scope));
        }

        let user_id = ctx.claims.subject_id;
        let membership = self
            .repos
            .memberships()
            .find_by_tenant_and_user(tenant_id, user_id)
            .await?;

        match membership {
            Some(m) if m.is_active => {
                let scope = TenantScope {
                    tenant_id,
                    role: m.role,
                    membership_id: Some(m.id),
                };
                Ok(ctx.with_scope(scope))
            }
            _ => Err(AuthError::TenantAccessDenied { tenant_id, user_id }),
        }
    }
}

/// AppCheck: gates routes that declare a required app code
///
/// Decision order: enablement first, then the owner/admin bypass, then the
/// explicit per-membership grant.
pub struct AppStage {
    app_code: String,
    repos: Arc<dyn RepositoryFactory>,
}

impl AppStage {
    pub fn new(app_code: impl Into<String>, repos: Arc<dyn RepositoryFactory>) -> Self {
        Self {
            app_code: app_code.into(),
            repos,
        }
    }
}

#[async_trait]
impl GuardStage for AppStage {
    fn name(&self) -> &'static str {
        "app"
    }

    async fn evaluate(&self, ctx: RequestContext) -> AuthResult<RequestContext> {
        let scope = ctx
            .scope()
            .ok_or_else(|| AuthError::internal("AppCheck evaluated before TenantCheck"))?;

        if scope.is_god() {
            return Ok(ctx);
        }

        // An unknown app code reads the same as a never-enabled app.
        let app = self
            .repos
            .apps()
            .find_by_code(&self.app_code)
            .await?
            .ok_or_else(|| AuthError::AppNotEnabled {
                app: self.app_code.clone(),
            })?;

        let enabled = self
            .repos
            .tenant_apps()
            .find(scope.tenant_id, app.id)
            .await?
            .map(|ta| ta.enabled)
            .unwrap_or(false);
        if !enabled {
            return Err(AuthError::AppNotEnabled {
                app: self.app_code.clone(),
            });
        }

        if scope.is_privileged() {
            return Ok(ctx);
        }

        let membership_id = scope
            .membership_id
            .ok_or_else(|| AuthError::internal("membership scope without membership id"))?;
        let grant = self.repos.app_grants().find(membership_id, app.id).await?;
        if grant.is_none() {
            return Err(AuthError::AppPermissionDenied {
                app: self.app_code.clone(),
            });
        }

        Ok(ctx)
    }
}

/// Builds and runs the guard chains for the three route classes
#[derive(Clone)]
pub struct AuthorizationPipeline {
    repos: Arc<dyn RepositoryFactory>,
}

impl AuthorizationPipeline {
    pub fn new(repos: Arc<dyn RepositoryFactory>) -> Self {
        Self { repos }
    }

    /// Platform-root routes: god mode only
    pub async fn authorize_platform(&self, claims: &IdentityClaims) -> AuthResult<RequestContext> {
        let chain = GuardChain::new(vec![Arc::new(PlatformStage)]);
        chain.run(RequestContext::new(claims.clone())).await
    }

    /// Tenant-scoped routes without an app requirement
    pub async fn authorize_tenant(
        &self,
        claims: &IdentityClaims,
        tenant_ref: Option<uuid::Uuid>,
    ) -> AuthResult<RequestContext> {
        let chain = GuardChain::new(vec![Arc::new(TenantStage::new(self.repos.clone()))]);
        chain
            .run(RequestContext::new(claims.clone()).with_tenant_ref(tenant_ref))
            .await
    }

    /// Tenant-scoped routes declaring a required app code
    pub async fn authorize_app(
        &self,
        claims: &IdentityClaims,
        tenant_ref: Option<uuid::Uuid>,
        app_code: &str,
    ) -> AuthResult<RequestContext> {
        let chain = GuardChain::new(vec![
            Arc::new(TenantStage::new(self.repos.clone())),
            Arc::new(AppStage::new(app_code, self.repos.clone())),
        ]);
        chain
            .run(RequestContext::new(claims.clone()).with_tenant_ref(tenant_ref))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_platform_stage_rejects_non_god() {
        let ctx = RequestContext::new(IdentityClaims::new(Uuid::new_v4(), "u@t.io"));
        let err = PlatformStage.evaluate(ctx).await.unwrap_err();
        assert!(matches!(err, AuthError::GodModeRequired));
    }

    #[tokio::test]
    async fn test_platform_stage_admits_god() {
        let ctx = RequestContext::new(IdentityClaims::god(Uuid::new_v4(), "root@platform"));
        assert!(PlatformStage.evaluate(ctx).await.is_ok());
    }
}
