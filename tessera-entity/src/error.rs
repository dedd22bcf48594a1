//! Error types for the entity schema engine

use thiserror::Error;
use uuid::Uuid;

use tessera_interfaces::DatabaseError;

use crate::validation::FieldIssue;

/// Result type for entity operations
pub type EntityResult<T> = Result<T, EntityError>;

/// Entity engine errors
#[derive(Error, Debug)]
pub enum EntityError {
    #[error("Entity definition not found: {slug}")]
    DefinitionNotFound { slug: String },

    #[error("Record not found: {id}")]
    RecordNotFound { id: Uuid },

    #[error("An entity with slug {slug:?} already exists in this tenant")]
    DuplicateSlug { slug: String },

    #[error("Duplicate field key in definition: {key}")]
    DuplicateFieldKey { key: String },

    #[error("Entity name {name:?} does not yield a usable slug")]
    InvalidName { name: String },

    #[error("Record does not conform to its definition: {}", format_issues(.issues))]
    RecordInvalid { issues: Vec<FieldIssue> },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl EntityError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DefinitionNotFound { .. } | Self::RecordNotFound { .. })
    }
}
