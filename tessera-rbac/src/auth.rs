//! Authentication context carried through the pipeline

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tessera_api_types::BuiltinRole;

/// Role name attached to god-mode requests after TenantCheck
pub const GOD_ROLE: &str = "god";

/// Verified claim set handed to the core by the external identity provider
///
/// The core never issues or cryptographically verifies tokens; it trusts
/// these fields as already verified upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    pub subject_id: Uuid,
    pub email: String,
    pub is_god: bool,
}

impl IdentityClaims {
    pub fn new(subject_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            subject_id,
            email: email.into(),
            is_god: false,
        }
    }

    pub fn god(subject_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            subject_id,
            email: email.into(),
            is_god: true,
        }
    }
}

/// Tenant scope attached to the context once TenantCheck admits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantScope {
    pub tenant_id: Uuid,
    /// Membership role name, or [`GOD_ROLE`] for god-mode requests
    pub role: String,
    /// `None` for god-mode requests, which have no membership row
    pub membership_id: Option<Uuid>,
}

impl TenantScope {
    pub fn is_god(&self) -> bool {
        self.role == GOD_ROLE
    }

    /// The built-in role this scope's role names, if any
    pub fn builtin_role(&self) -> Option<BuiltinRole> {
        BuiltinRole::parse(&self.role)
    }

    /// Owner/admin scopes bypass explicit app grants
    pub fn is_privileged(&self) -> bool {
        self.builtin_role().is_some_and(|r| r.is_privileged())
    }
}

/// Per-request context flowing through the guard chain
///
/// Stages never mutate in place: each stage consumes the context and returns
/// an augmented copy, so a rejected request leaves nothing half-attached.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub claims: IdentityClaims,
    /// Tenant identifier resolved from the request (header/path/query/body)
    pub tenant_ref: Option<Uuid>,
    /// Populated by the tenant stage; `None` until then
    pub tenant: Option<TenantScope>,
}

impl RequestContext {
    pub fn new(claims: IdentityClaims) -> Self {
        Self {
            claims,
            tenant_ref: None,
            tenant: None,
        }
    }

    pub fn with_tenant_ref(mut self, tenant_ref: Option<Uuid>) -> Self {
        self.tenant_ref = tenant_ref;
        self
    }

    pub(crate) fn with_scope(mut self, scope: TenantScope) -> Self {
        self.tenant = Some(scope);
        self
    }

    /// Tenant scope, present only after the tenant stage admitted
    pub fn scope(&self) -> Option<&TenantScope> {
        self.tenant.as_ref()
    }
}
