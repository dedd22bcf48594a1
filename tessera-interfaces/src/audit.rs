//! Audit sink contract
//!
//! Every create/update/delete the core performs emits an [`AuditEvent`] to a
//! sink. The sink is an external collaborator: implementations forward to a
//! log pipeline, a table, or a message bus. Recording is fire-and-forget so
//! an audit outage never fails the business write it describes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Provisioned,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::Deleted => "deleted",
            AuditAction::Provisioned => "provisioned",
        }
    }
}

/// One audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub tenant_id: Option<Uuid>,
    /// Acting user; `None` for system-initiated writes
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    /// Entity kind (`"tenant"`, `"custom_role"`, `"entity_record"`, ...)
    pub entity: String,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        tenant_id: Option<Uuid>,
        user_id: Option<Uuid>,
        action: AuditAction,
        entity: impl Into<String>,
        entity_id: impl std::fmt::Display,
    ) -> Self {
        Self {
            tenant_id,
            user_id,
            action,
            entity: entity.into(),
            entity_id: entity_id.to_string(),
            old_value: None,
            new_value: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_old_value(mut self, value: serde_json::Value) -> Self {
        self.old_value = Some(value);
        self
    }

    pub fn with_new_value(mut self, value: serde_json::Value) -> Self {
        self.new_value = Some(value);
        self
    }
}

/// Destination for audit events
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record an event; implementations must not fail the caller
    async fn record(&self, event: AuditEvent);
}

/// Sink that drops every event; test and bootstrap default
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn record(&self, _event: AuditEvent) {}
}
