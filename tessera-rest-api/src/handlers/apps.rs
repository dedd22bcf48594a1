//! App enablement and per-user app grant endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use uuid::Uuid;

use tessera_api_types::App;
use tessera_web::{ApiResponse, Identity};

use crate::{
    context::AppContext,
    errors::RestResult,
    handlers::{require_privileged, tenant_scope},
    models::{GrantAppRequest, SetAppEnabledRequest},
};

/// Resolve the `{app_id}` path segment: a catalog UUID or a stable app code
async fn resolve_app(ctx: &AppContext, app_ref: &str) -> RestResult<App> {
    if let Ok(id) = Uuid::parse_str(app_ref) {
        if let Some(app) = ctx.repos.apps().find_by_id(id).await? {
            return Ok(app);
        }
    }
    Ok(ctx.tenants.require_app(app_ref).await?)
}

/// Enablement status for one app
pub async fn get_app(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Path((tenant_id, app_ref)): Path<(Uuid, String)>,
) -> RestResult<impl IntoResponse> {
    ctx.pipeline.authorize_tenant(&claims, Some(tenant_id)).await?;

    let app = resolve_app(&ctx, &app_ref).await?;
    let status = ctx.tenants.app_status(tenant_id, app.id).await?;
    Ok(Json(ApiResponse::new(status)))
}

/// Enable an app for the tenant
pub async fn post_app(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Path((tenant_id, app_ref)): Path<(Uuid, String)>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx.pipeline.authorize_tenant(&claims, Some(tenant_id)).await?;
    require_privileged(tenant_scope(&authz)?)?;

    let app = resolve_app(&ctx, &app_ref).await?;
    let row = ctx
        .tenants
        .set_app_enabled(tenant_id, &app, true, Some(claims.subject_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(row))))
}

/// Set an app's enabled flag
pub async fn patch_app(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Path((tenant_id, app_ref)): Path<(Uuid, String)>,
    Json(request): Json<SetAppEnabledRequest>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx.pipeline.authorize_tenant(&claims, Some(tenant_id)).await?;
    require_privileged(tenant_scope(&authz)?)?;

    let app = resolve_app(&ctx, &app_ref).await?;
    let row = ctx
        .tenants
        .set_app_enabled(tenant_id, &app, request.enabled, Some(claims.subject_id))
        .await?;
    Ok(Json(ApiResponse::new(row)))
}

/// Remove the enablement row entirely
pub async fn delete_app(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Path((tenant_id, app_ref)): Path<(Uuid, String)>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx.pipeline.authorize_tenant(&claims, Some(tenant_id)).await?;
    require_privileged(tenant_scope(&authz)?)?;

    let app = resolve_app(&ctx, &app_ref).await?;
    ctx.tenants.remove_app(tenant_id, &app, Some(claims.subject_id)).await?;
    info!(%tenant_id, app = %app.code, "app uninstalled");
    Ok(StatusCode::NO_CONTENT)
}

/// Grant a member explicit access to an app
pub async fn grant_app(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Path((tenant_id, user_id, app_ref)): Path<(Uuid, Uuid, String)>,
    Json(request): Json<GrantAppRequest>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx.pipeline.authorize_tenant(&claims, Some(tenant_id)).await?;
    require_privileged(tenant_scope(&authz)?)?;

    let app = resolve_app(&ctx, &app_ref).await?;
    let grant = ctx
        .tenants
        .grant_app(tenant_id, user_id, &app, request.permissions, Some(claims.subject_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(grant))))
}

/// Revoke a member's explicit app access
pub async fn revoke_app(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Path((tenant_id, user_id, app_ref)): Path<(Uuid, Uuid, String)>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx.pipeline.authorize_tenant(&claims, Some(tenant_id)).await?;
    require_privileged(tenant_scope(&authz)?)?;

    let app = resolve_app(&ctx, &app_ref).await?;
    ctx.tenants
        .revoke_app(tenant_id, user_id, &app, Some(claims.subject_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
