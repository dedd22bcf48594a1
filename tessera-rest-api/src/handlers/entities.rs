//! Dynamic entity schema and record endpoints
//!
//! These routes belong to the `entities` app (Custom Objects), so the full
//! guard chain runs: membership, app enablement, then the explicit-grant
//! check for non-privileged roles. Record payloads are checked against the
//! caller's permission matrix: action flags gate the operation, the
//! tri-state write rule is enforced against record ownership, and reads are
//! field-filtered.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use tessera_api_types::{ApiId, EntityRecord, PermissionAction, PermissionMatrix};
use tessera_entity::DefinitionDraft;
use tessera_rbac::{check_permission, filter_fields, write_rule, TenantScope};
use tessera_web::{ApiResponse, Identity, TenantRef};

use crate::{
    context::AppContext,
    errors::{RestError, RestResult},
    handlers::tenant_scope,
};

/// App code gating every entity route
pub const ENTITIES_APP: &str = "entities";

async fn matrix_for(ctx: &AppContext, scope: &TenantScope) -> RestResult<PermissionMatrix> {
    Ok(ctx.roles.resolve_matrix(scope.tenant_id, &scope.role).await?)
}

fn require_action(matrix: &PermissionMatrix, entity: &str, action: PermissionAction) -> RestResult<()> {
    if check_permission(matrix, entity, action, None) {
        Ok(())
    } else {
        Err(RestError::Forbidden(format!(
            "Role does not permit {} on {entity}",
            action.as_str()
        )))
    }
}

/// Enforce the tri-state write rule against a record's owner
fn require_write(matrix: &PermissionMatrix, entity: &str, record: &EntityRecord, actor: Uuid) -> RestResult<()> {
    let rule = write_rule(matrix, entity);
    if !rule.permits() {
        return Err(RestError::Forbidden(format!("Role does not permit write on {entity}")));
    }
    if rule.is_own_only() && record.owner_id != actor {
        return Err(RestError::Forbidden(format!(
            "Role permits writing only its own {entity} records"
        )));
    }
    Ok(())
}

/// Strip hidden fields from a record before it leaves the API
fn redact(matrix: &PermissionMatrix, entity: &str, mut record: EntityRecord) -> EntityRecord {
    record.data = filter_fields(matrix, entity, &record.data);
    record
}

/// Create an entity definition
pub async fn create_schema(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Json(draft): Json<DefinitionDraft>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_app(&claims, tenant_ref.resolve(None, None), ENTITIES_APP)
        .await?;
    let scope = tenant_scope(&authz)?;

    let created = ctx
        .entities
        .create_definition(scope.tenant_id, draft, Some(claims.subject_id))
        .await?;
    info!(tenant_id = %scope.tenant_id, slug = %created.definition.slug, "schema created");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(created.definition))))
}

/// List the tenant's entity definitions
pub async fn list_schemas(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_app(&claims, tenant_ref.resolve(None, None), ENTITIES_APP)
        .await?;
    let scope = tenant_scope(&authz)?;

    let definitions = ctx.entities.list_definitions(scope.tenant_id).await?;
    Ok(Json(ApiResponse::new(definitions)))
}

/// Fetch one definition with its ordered fields
pub async fn get_schema(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Path(slug): Path<String>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_app(&claims, tenant_ref.resolve(None, None), ENTITIES_APP)
        .await?;
    let scope = tenant_scope(&authz)?;

    let resolved = ctx.entities.get_definition(scope.tenant_id, &slug).await?;
    Ok(Json(ApiResponse::new(serde_json::json!({
        "definition": resolved.definition,
        "fields": resolved.fields,
    }))))
}

/// Create a record of a tenant-defined type
pub async fn create_record(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Path(slug): Path<String>,
    Json(data): Json<Value>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_app(&claims, tenant_ref.resolve(None, None), ENTITIES_APP)
        .await?;
    let scope = tenant_scope(&authz)?;

    let matrix = matrix_for(&ctx, scope).await?;
    require_action(&matrix, &slug, PermissionAction::Write)?;

    let record = ctx
        .entities
        .create_record(scope.tenant_id, &slug, data, claims.subject_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(record))))
}

/// List records, newest first, field-filtered for the caller's role
pub async fn list_records(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Path(slug): Path<String>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_app(&claims, tenant_ref.resolve(None, None), ENTITIES_APP)
        .await?;
    let scope = tenant_scope(&authz)?;

    let matrix = matrix_for(&ctx, scope).await?;
    require_action(&matrix, &slug, PermissionAction::Read)?;

    let records = ctx.entities.list_records(scope.tenant_id, &slug).await?;
    let redacted: Vec<EntityRecord> = records
        .into_iter()
        .map(|record| redact(&matrix, &slug, record))
        .collect();
    Ok(Json(ApiResponse::new(redacted)))
}

/// Fetch one record, field-filtered for the caller's role
pub async fn get_record(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Path((slug, record_id)): Path<(String, ApiId)>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_app(&claims, tenant_ref.resolve(None, None), ENTITIES_APP)
        .await?;
    let scope = tenant_scope(&authz)?;

    let matrix = matrix_for(&ctx, scope).await?;
    require_action(&matrix, &slug, PermissionAction::Read)?;

    let record_id = record_id
        .as_uuid()
        .ok_or_else(|| RestError::BadRequest(format!("invalid record id: {record_id}")))?;
    let record = ctx.entities.get_record(scope.tenant_id, &slug, record_id).await?;
    Ok(Json(ApiResponse::new(redact(&matrix, &slug, record))))
}

/// Patch a record's data; `write: "own"` is enforced against the owner
pub async fn update_record(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Path((slug, record_id)): Path<(String, ApiId)>,
    Json(patch): Json<Value>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_app(&claims, tenant_ref.resolve(None, None), ENTITIES_APP)
        .await?;
    let scope = tenant_scope(&authz)?;

    let record_id = record_id
        .as_uuid()
        .ok_or_else(|| RestError::BadRequest(format!("invalid record id: {record_id}")))?;
    let matrix = matrix_for(&ctx, scope).await?;
    let existing = ctx.entities.get_record(scope.tenant_id, &slug, record_id).await?;
    require_write(&matrix, &slug, &existing, claims.subject_id)?;

    let updated = ctx
        .entities
        .update_record(scope.tenant_id, &slug, record_id, patch, claims.subject_id)
        .await?;
    Ok(Json(ApiResponse::new(redact(&matrix, &slug, updated))))
}

/// Delete a record
pub async fn delete_record(
    State(ctx): State<AppContext>,
    Identity(claims): Identity,
    tenant_ref: TenantRef,
    Path((slug, record_id)): Path<(String, ApiId)>,
) -> RestResult<impl IntoResponse> {
    let authz = ctx
        .pipeline
        .authorize_app(&claims, tenant_ref.resolve(None, None), ENTITIES_APP)
        .await?;
    let scope = tenant_scope(&authz)?;

    let matrix = matrix_for(&ctx, scope).await?;
    require_action(&matrix, &slug, PermissionAction::Delete)?;

    let record_id = record_id
        .as_uuid()
        .ok_or_else(|| RestError::BadRequest(format!("invalid record id: {record_id}")))?;
    ctx.entities
        .delete_record(scope.tenant_id, &slug, record_id, claims.subject_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
