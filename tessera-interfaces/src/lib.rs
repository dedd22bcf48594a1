//! Core interfaces for the Tessera modular architecture
//!
//! This crate defines the repository traits the service crates program
//! against, decoupling them from any concrete persistence backend. The
//! backend enforces the uniqueness constraints named on each trait; services
//! translate [`DatabaseError::UniqueViolation`] into their own taxonomies.

pub mod audit;
pub mod database;

pub use audit::{AuditAction, AuditEvent, AuditSink, NullAuditSink};
pub use database::{
    AppGrantRepository, AppRepository, DashboardRepository, DatabaseError, DefinitionWithFields,
    EntityDefinitionRepository, EntityRecordRepository, MembershipRepository, ProvisionCounts,
    ProvisionReceipt, ProvisioningSession, Repository, RepositoryFactory, RoleRepository,
    TemplateRepository, TenantAppRepository, TenantRepository, WorkflowRepository,
};
