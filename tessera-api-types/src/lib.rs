//! Unified API types for the Tessera multi-tenant platform
//!
//! This crate provides the type definitions shared by the REST surface and
//! the service crates: tenancy and membership records, the app catalog, the
//! role permission matrix, tenant-defined entity schemas and records, and
//! industry template blueprints. Keeping them here avoids duplication between
//! the storage contracts and the web layer.

pub mod domain;
pub mod enums;
pub mod errors;
pub mod ids;

// Re-export main types for convenience
pub use domain::{
    App, AppGrant, CustomRole, Dashboard, DashboardBlueprint, DashboardWidget, EntityDefinition,
    EntityField, EntityPermissions, EntityRecord, FieldBlueprint, IndustryTemplate, Membership,
    ModuleBlueprint, PermissionMatrix, Tenant, TenantApp, WidgetBlueprint, Workflow,
    WorkflowAction, WorkflowBlueprint,
};
pub use enums::{
    BuiltinRole, FieldType, PermissionAction, TenantPlan, WidgetKind, WorkflowTrigger,
    WritePermission,
};
pub use errors::ApiError;
pub use ids::ApiId;
