//! Tenant membership endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use tessera_web::{ApiResponse, Identity};

use crate::{
    context::AppContext,
    errors::RestResult,
    handlers::{require_privileged, tenant_scope},
    models::AddMemberRequest,
};

/// List the tenant's memberships
pub async fn list_members(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Path(tenant_id): Path<Uuid>,
) -> RestResult<impl IntoResponse> {
    ctx.pipeline.authorize_tenant(&claims, Some(tenant_id)).await?;

    let members = ctx.tenants.list_members(tenant_id).await?;
    Ok(Json(ApiResponse::new(members)))
}

/// Add a member with a role (built-in or custom)
pub async fn add_member(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx.pipeline.authorize_tenant(&claims, Some(tenant_id)).await?;
    require_privileged(tenant_scope(&authz)?)?;

    let membership = ctx
        .tenants
        .add_member(tenant_id, request.user_id, &request.role, Some(claims.subject_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(membership))))
}
