//! Industry template instantiation
//!
//! Materializes a tenant's whole workspace — entity definitions, automation
//! workflows and dashboards — from an immutable blueprint in one atomic,
//! idempotent provisioning commit.

pub mod error;
pub mod service;

pub use error::{FactoryError, FactoryResult};
pub use service::{ProvisionSummary, TemplateFactory};
