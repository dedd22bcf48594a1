//! Custom role endpoints
//!
//! The tenant comes from the request (header or query); system roles reject
//! every mutation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use tessera_api_types::ApiId;
use tessera_web::{ApiResponse, Identity, TenantRef};

use crate::{
    context::AppContext,
    errors::{RestError, RestResult},
    handlers::{require_privileged, tenant_scope},
    models::{CreateRoleRequest, UpdateRoleRequest},
};

/// List the tenant's roles, system and custom alike
pub async fn list_roles(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_tenant(&claims, tenant_ref.resolve(None, None))
        .await?;
    let scope = tenant_scope(&authz)?;

    let roles = ctx.roles.list_roles(scope.tenant_id).await?;
    Ok(Json(ApiResponse::new(roles)))
}

/// Create a custom role
pub async fn create_role(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Json(request): Json<CreateRoleRequest>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_tenant(&claims, tenant_ref.resolve(None, None))
        .await?;
    let scope = tenant_scope(&authz)?;
    require_privileged(scope)?;

    let role = ctx
        .roles
        .create_role(
            scope.tenant_id,
            request.name,
            request.description,
            request.permissions,
            Some(claims.subject_id),
        )
        .await?;
    info!(tenant_id = %scope.tenant_id, role = %role.name, "role created");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(role))))
}

/// Replace a custom role's description and matrix
pub async fn update_role(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Path(role_id): Path<ApiId>,
    Json(request): Json<UpdateRoleRequest>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_tenant(&claims, tenant_ref.resolve(None, None))
        .await?;
    let scope = tenant_scope(&authz)?;
    require_privileged(scope)?;

    let role_id = role_id
        .as_uuid()
        .ok_or_else(|| RestError::BadRequest(format!("invalid role id: {role_id}")))?;
    let role = ctx
        .roles
        .update_role(
            scope.tenant_id,
            role_id,
            request.description,
            request.permissions,
            Some(claims.subject_id),
        )
        .await?;
    Ok(Json(ApiResponse::new(role)))
}

/// Delete a custom role
pub async fn delete_role(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Path(role_id): Path<ApiId>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_tenant(&claims, tenant_ref.resolve(None, None))
        .await?;
    let scope = tenant_scope(&authz)?;
    require_privileged(scope)?;

    let role_id = role_id
        .as_uuid()
        .ok_or_else(|| RestError::BadRequest(format!("invalid role id: {role_id}")))?;
    ctx.roles
        .delete_role(scope.tenant_id, role_id, Some(claims.subject_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
