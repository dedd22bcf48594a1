//! Dynamic entity schema engine
//!
//! Tenants define their own record types at runtime: an
//! [`tessera_api_types::EntityDefinition`] with ordered, typed fields, and
//! records whose `data` payloads are validated against that definition
//! between resolution and persistence.

pub mod error;
pub mod service;
pub mod slug;
pub mod validation;

pub use error::{EntityError, EntityResult};
pub use service::{DefinitionDraft, EntityService, FieldDraft};
pub use slug::slugify;
pub use validation::{validate_record, FieldIssue};
