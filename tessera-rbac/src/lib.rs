//! Authorization for the Tessera multi-tenant platform
//!
//! This crate provides the cascading authorization pipeline and the
//! role/field-permission engine:
//! - Ordered guard stages composing platform super-access, tenant membership
//!   and per-app enablement into one request decision
//! - A typed JSON permission matrix with per-action flags, a tri-state write
//!   rule and field-level visibility
//! - Role management with immutable system roles
//! - Tenant lifecycle management (memberships, app enablement, app grants)

pub mod auth;
pub mod error;
pub mod permissions;
pub mod pipeline;
pub mod roles;
pub mod tenant;

pub use auth::{IdentityClaims, RequestContext, TenantScope, GOD_ROLE};
pub use error::{AuthError, AuthResult, RbacError, RbacResult};
pub use permissions::{check_permission, filter_fields, write_rule};
pub use pipeline::{AppStage, AuthorizationPipeline, GuardChain, GuardStage, PlatformStage, TenantStage};
pub use roles::{builtin_matrix, RoleService};
pub use tenant::TenantManager;
