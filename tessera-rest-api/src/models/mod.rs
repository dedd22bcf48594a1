//! Request and response bodies for the REST surface

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use tessera_api_types::{PermissionMatrix, TenantPlan};

/// Body for `POST /platform/tenants`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,
    #[serde(default)]
    pub plan: TenantPlan,
    pub owner_user_id: Uuid,
    /// Omit to allow the full app catalog
    #[serde(default)]
    pub allowed_apps: Option<Vec<String>>,
}

/// Body for `POST /tenants/{tenant_id}/users`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: String,
}

/// Body for `PATCH /tenants/{tenant_id}/apps/{app_id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAppEnabledRequest {
    pub enabled: bool,
}

/// Body for `POST /tenants/{tenant_id}/users/{user_id}/apps/{app_id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAppRequest {
    /// Free-form grant payload stored on the grant row
    #[serde(default)]
    pub permissions: Value,
}

/// Body for `POST /roles`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub permissions: PermissionMatrix,
}

/// Body for `PUT /roles/{role_id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub description: Option<String>,
    pub permissions: PermissionMatrix,
}

/// Body for `POST /factory/instantiate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantiateRequest {
    pub tenant_id: Uuid,
    pub template_slug: String,
}

/// Health probe response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
