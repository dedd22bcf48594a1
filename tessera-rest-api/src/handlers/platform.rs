//! Platform-root endpoints (god mode only)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use tessera_web::{ApiResponse, Identity};

use crate::{context::AppContext, errors::RestResult, models::CreateTenantRequest};

/// List every tenant on the platform
pub async fn list_tenants(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
) -> RestResult<impl IntoResponse> {
    ctx.pipeline.authorize_platform(&claims).await?;

    let tenants = ctx.tenants.list_tenants().await?;
    Ok(Json(ApiResponse::new(tenants)))
}

/// Create a tenant with its owner membership, system roles and core apps
pub async fn create_tenant(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    Json(request): Json<CreateTenantRequest>,
) -> RestResult<impl IntoResponse> {
    ctx.pipeline.authorize_platform(&claims).await?;
    info!(name = %request.name, "creating tenant");

    let tenant = ctx
        .tenants
        .create_tenant(
            request.name,
            request.plan,
            request.owner_user_id,
            request.allowed_apps,
            Some(claims.subject_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(tenant))))
}
