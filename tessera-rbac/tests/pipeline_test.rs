//! End-to-end authorization pipeline tests against the in-memory backend

use std::sync::Arc;

use uuid::Uuid;

use tessera_api_types::{Tenant, TenantPlan};
use tessera_interfaces::{NullAuditSink, RepositoryFactory};
use tessera_rbac::{
    AuthError, AuthorizationPipeline, IdentityClaims, RoleService, TenantManager, GOD_ROLE,
};
use tessera_storage::{seed_catalog, InMemoryBackend};

struct Fixture {
    repos: Arc<dyn RepositoryFactory>,
    pipeline: AuthorizationPipeline,
    manager: TenantManager,
    tenant: Tenant,
    owner: Uuid,
}

async fn fixture() -> Fixture {
    let backend = InMemoryBackend::new();
    seed_catalog(&backend).await.unwrap();
    let repos: Arc<dyn RepositoryFactory> = Arc::new(backend);
    let audit = Arc::new(NullAuditSink);
    let roles = RoleService::new(repos.clone(), audit.clone());
    let manager = TenantManager::new(repos.clone(), roles, audit);

    let owner = Uuid::new_v4();
    let tenant = manager
        .create_tenant("Acme Legal".into(), TenantPlan::Professional, owner, None, None)
        .await
        .unwrap();

    Fixture {
        pipeline: AuthorizationPipeline::new(repos.clone()),
        repos,
        manager,
        tenant,
        owner,
    }
}

#[tokio::test]
async fn god_admits_without_membership_lookup_content() {
    let fx = fixture().await;
    let god = IdentityClaims::god(Uuid::new_v4(), "root@platform");

    // God has no membership row in this tenant, and admits anyway
    let ctx = fx
        .pipeline
        .authorize_tenant(&god, Some(fx.tenant.id))
        .await
        .unwrap();
    let scope = ctx.scope().unwrap();
    assert_eq!(scope.role, GOD_ROLE);
    assert!(scope.membership_id.is_none());
}

#[tokio::test]
async fn god_still_needs_a_tenant_ref() {
    let fx = fixture().await;
    let god = IdentityClaims::god(Uuid::new_v4(), "root@platform");

    let err = fx.pipeline.authorize_tenant(&god, None).await.unwrap_err();
    assert!(matches!(err, AuthError::TenantRequired));
}

#[tokio::test]
async fn missing_membership_is_denied() {
    let fx = fixture().await;
    let stranger = IdentityClaims::new(Uuid::new_v4(), "stranger@other.io");

    let err = fx
        .pipeline
        .authorize_tenant(&stranger, Some(fx.tenant.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TenantAccessDenied { .. }));
}

#[tokio::test]
async fn inactive_membership_is_denied() {
    let fx = fixture().await;
    let user = Uuid::new_v4();
    let membership = fx.manager.add_member(fx.tenant.id, user, "member", None).await.unwrap();
    fx.repos.memberships().set_active(membership.id, false).await.unwrap();

    let claims = IdentityClaims::new(user, "user@acme.io");
    let err = fx
        .pipeline
        .authorize_tenant(&claims, Some(fx.tenant.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TenantAccessDenied { .. }));
}

#[tokio::test]
async fn membership_attaches_scope() {
    let fx = fixture().await;
    let claims = IdentityClaims::new(fx.owner, "owner@acme.io");

    let ctx = fx
        .pipeline
        .authorize_tenant(&claims, Some(fx.tenant.id))
        .await
        .unwrap();
    let scope = ctx.scope().unwrap();
    assert_eq!(scope.tenant_id, fx.tenant.id);
    assert_eq!(scope.role, "owner");
    assert!(scope.membership_id.is_some());
}

#[tokio::test]
async fn disabled_app_blocks_even_the_owner() {
    let fx = fixture().await;
    let claims = IdentityClaims::new(fx.owner, "owner@acme.io");

    // crm is a core app, enabled at tenant creation; disable it
    let app = fx.manager.require_app("crm").await.unwrap();
    fx.manager.set_app_enabled(fx.tenant.id, &app, false, None).await.unwrap();

    let err = fx
        .pipeline
        .authorize_app(&claims, Some(fx.tenant.id), "crm")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AppNotEnabled { app } if app == "crm"));
}

#[tokio::test]
async fn missing_enablement_row_reads_as_disabled() {
    let fx = fixture().await;
    let claims = IdentityClaims::new(fx.owner, "owner@acme.io");

    // invoicing is not core, so no enablement row exists yet
    let err = fx
        .pipeline
        .authorize_app(&claims, Some(fx.tenant.id), "invoicing")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AppNotEnabled { .. }));
}

#[tokio::test]
async fn owner_bypasses_grants_once_enabled() {
    let fx = fixture().await;
    let claims = IdentityClaims::new(fx.owner, "owner@acme.io");

    let ctx = fx
        .pipeline
        .authorize_app(&claims, Some(fx.tenant.id), "crm")
        .await
        .unwrap();
    assert!(ctx.scope().unwrap().is_privileged());
}

#[tokio::test]
async fn member_needs_an_explicit_grant() {
    let fx = fixture().await;
    let user = Uuid::new_v4();
    fx.manager.add_member(fx.tenant.id, user, "member", None).await.unwrap();
    let claims = IdentityClaims::new(user, "user@acme.io");

    let err = fx
        .pipeline
        .authorize_app(&claims, Some(fx.tenant.id), "crm")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AppPermissionDenied { .. }));

    let app = fx.manager.require_app("crm").await.unwrap();
    fx.manager
        .grant_app(fx.tenant.id, user, &app, serde_json::json!({}), None)
        .await
        .unwrap();

    assert!(fx
        .pipeline
        .authorize_app(&claims, Some(fx.tenant.id), "crm")
        .await
        .is_ok());
}

#[tokio::test]
async fn god_short_circuits_app_checks() {
    let fx = fixture().await;
    let god = IdentityClaims::god(Uuid::new_v4(), "root@platform");

    // Even a disabled app admits god mode
    let app = fx.manager.require_app("crm").await.unwrap();
    fx.manager.set_app_enabled(fx.tenant.id, &app, false, None).await.unwrap();

    assert!(fx
        .pipeline
        .authorize_app(&god, Some(fx.tenant.id), "crm")
        .await
        .is_ok());
}

#[tokio::test]
async fn platform_routes_require_god() {
    let fx = fixture().await;
    let claims = IdentityClaims::new(fx.owner, "owner@acme.io");

    let err = fx.pipeline.authorize_platform(&claims).await.unwrap_err();
    assert!(matches!(err, AuthError::GodModeRequired));

    let god = IdentityClaims::god(Uuid::new_v4(), "root@platform");
    assert!(fx.pipeline.authorize_platform(&god).await.is_ok());
}
