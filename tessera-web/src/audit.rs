//! Tracing-backed audit sink
//!
//! Emits every audit event as a structured `tracing` event under the
//! `audit` target, where the log pipeline picks it up. Swap in a different
//! [`AuditSink`] to ship events to a table or a bus instead.

use async_trait::async_trait;
use tracing::info;

use tessera_interfaces::{AuditEvent, AuditSink};

/// Audit sink writing structured events to the `audit` log target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) {
        info!(
            target: "audit",
            tenant_id = event.tenant_id.map(|id| id.to_string()),
            user_id = event.user_id.map(|id| id.to_string()),
            action = event.action.as_str(),
            entity = %event.entity,
            entity_id = %event.entity_id,
            old_value = event.old_value.as_ref().map(|v| v.to_string()),
            new_value = event.new_value.as_ref().map(|v| v.to_string()),
            "audit event"
        );
    }
}
