//! Template catalog and instantiation endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use tessera_web::{ApiResponse, Identity, TenantRef};

use crate::{
    context::AppContext,
    errors::RestResult,
    handlers::{require_privileged, tenant_scope},
    models::InstantiateRequest,
};

/// Industry template catalog
pub async fn list_templates(
    State(ctx): State<AppContext>,
    Identity(_claims): Identity,
) -> RestResult<impl IntoResponse> {
    let templates = ctx.factory.list_templates().await?;
    Ok(Json(ApiResponse::new(templates)))
}

/// Provision a tenant's workspace from a template
///
/// The tenant is resolved from the body (no header or path carrier on this
/// route), and the operation is owner/admin-gated: it bulk-writes the
/// tenant's schema space.
pub async fn instantiate(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Json(request): Json<InstantiateRequest>,
) -> RestResult<impl IntoResponse> {
    let resolved = tenant_ref.resolve(None, Some(request.tenant_id));
    let authz = ctx.pipeline.authorize_tenant(&claims, resolved).await?;
    let scope = tenant_scope(&authz)?;
    require_privileged(scope)?;

    info!(tenant_id = %scope.tenant_id, template = %request.template_slug, "instantiating template");
    let summary = ctx
        .factory
        .instantiate(scope.tenant_id, &request.template_slug, Some(claims.subject_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(summary))))
}
