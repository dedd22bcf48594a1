//! Error types for template instantiation

use thiserror::Error;

use tessera_interfaces::DatabaseError;

/// Result type for factory operations
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Template instantiation errors
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Industry template not found: {slug}")]
    TemplateNotFound { slug: String },

    /// Blueprint internal consistency failure: a workflow or widget names a
    /// module the template does not define
    #[error("Template {template:?} references unknown module slug {module_slug:?}")]
    UnknownModuleSlug { template: String, module_slug: String },

    /// Lost a provisioning race; the caller may re-run to converge
    #[error("Provisioning conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
