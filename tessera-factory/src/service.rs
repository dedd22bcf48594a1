//! Template instantiation service

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use tessera_api_types::{
    Dashboard, DashboardWidget, EntityDefinition, EntityField, IndustryTemplate, Workflow,
};
use tessera_interfaces::{
    AuditAction, AuditEvent, AuditSink, ProvisionCounts, RepositoryFactory,
};

use crate::error::{FactoryError, FactoryResult};

/// Outcome of instantiating a template for a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionSummary {
    pub template_slug: String,
    pub template_name: String,
    /// Module slug -> entity definition id, staged and pre-existing alike
    pub module_ids: BTreeMap<String, Uuid>,
    pub counts: ProvisionCounts,
}

/// Drives entity, workflow and dashboard creation from a blueprint
#[derive(Clone)]
pub struct TemplateFactory {
    repos: Arc<dyn RepositoryFactory>,
    audit: Arc<dyn AuditSink>,
}

impl TemplateFactory {
    pub fn new(repos: Arc<dyn RepositoryFactory>, audit: Arc<dyn AuditSink>) -> Self {
        Self { repos, audit }
    }

    /// Template catalog
    pub async fn list_templates(&self) -> FactoryResult<Vec<IndustryTemplate>> {
        Ok(self.repos.templates().list().await?)
    }

    /// Materialize a tenant's workspace from a template
    ///
    /// Stages one entity definition per module, one workflow and one
    /// dashboard per blueprint entry, then commits everything through a
    /// single provisioning session: atomic, and idempotent by upsert on
    /// `(tenant, slug)` / `(tenant, name)`, so re-running converges instead
    /// of duplicating or failing. Workflows and widgets reference modules by
    /// slug; the slug -> definition id map is returned for callers that want
    /// the minted ids.
    pub async fn instantiate(
        &self,
        tenant_id: Uuid,
        template_slug: &str,
        actor: Option<Uuid>,
    ) -> FactoryResult<ProvisionSummary> {
        let template = self
            .repos
            .templates()
            .find_by_slug(template_slug)
            .await?
            .ok_or_else(|| FactoryError::TemplateNotFound {
                slug: template_slug.to_string(),
            })?;

        validate_module_references(&template)?;

        let mut session = self.repos.begin_provisioning(tenant_id).await?;

        for module in &template.modules {
            let definition = EntityDefinition {
                id: Uuid::new_v4(),
                tenant_id,
                name: module.name.clone(),
                slug: module.slug.clone(),
                icon: module.icon.clone(),
                description: module.description.clone(),
                created_at: Utc::now(),
                created_by: actor,
            };
            let fields = module
                .fields
                .iter()
                .enumerate()
                .map(|(index, field)| EntityField {
                    id: Uuid::new_v4(),
                    definition_id: definition.id,
                    name: field.name.clone(),
                    key: field.key.clone(),
                    field_type: field.field_type,
                    is_required: field.is_required,
                    options: field.options.clone(),
                    order: index as i32,
                })
                .collect();
            session.stage_definition(definition, fields);
        }

        for blueprint in &template.workflows {
            session.stage_workflow(Workflow {
                id: Uuid::new_v4(),
                tenant_id,
                name: blueprint.name.clone(),
                module_slug: blueprint.module_slug.clone(),
                trigger: blueprint.trigger,
                actions: blueprint.actions.clone(),
                enabled: true,
                created_at: Utc::now(),
            });
        }

        for blueprint in &template.dashboards {
            session.stage_dashboard(Dashboard {
                id: Uuid::new_v4(),
                tenant_id,
                name: blueprint.name.clone(),
                role: blueprint.role.clone(),
                widgets: blueprint
                    .widgets
                    .iter()
                    .map(|widget| DashboardWidget {
                        title: widget.title.clone(),
                        kind: widget.kind,
                        module_slug: widget.module_slug.clone(),
                        config: widget.config.clone(),
                        position: widget.position,
                    })
                    .collect(),
                created_at: Utc::now(),
            });
        }

        let receipt = session.commit().await.map_err(|err| {
            if err.is_unique_violation() {
                FactoryError::Conflict {
                    message: err.to_string(),
                }
            } else {
                FactoryError::Database(err)
            }
        })?;

        self.audit
            .record(
                AuditEvent::new(Some(tenant_id), actor, AuditAction::Provisioned, "industry_template", &template.slug)
                    .with_new_value(serde_json::to_value(&receipt.counts).unwrap_or_default()),
            )
            .await;
        info!(
            %tenant_id,
            template = %template.slug,
            definitions = receipt.counts.definitions_created,
            workflows = receipt.counts.workflows_created,
            dashboards = receipt.counts.dashboards_created,
            "tenant provisioned from template"
        );

        Ok(ProvisionSummary {
            template_slug: template.slug,
            template_name: template.name,
            module_ids: receipt.module_ids,
            counts: receipt.counts,
        })
    }
}

/// Reject blueprints whose workflows or widgets name modules the template
/// does not define, before anything is staged
fn validate_module_references(template: &IndustryTemplate) -> FactoryResult<()> {
    let known: Vec<&str> = template.modules.iter().map(|m| m.slug.as_str()).collect();

    for workflow in &template.workflows {
        if !known.contains(&workflow.module_slug.as_str()) {
            return Err(FactoryError::UnknownModuleSlug {
                template: template.slug.clone(),
                module_slug: workflow.module_slug.clone(),
            });
        }
    }
    for dashboard in &template.dashboards {
        for widget in &dashboard.widgets {
            if !known.contains(&widget.module_slug.as_str()) {
                return Err(FactoryError::UnknownModuleSlug {
                    template: template.slug.clone(),
                    module_slug: widget.module_slug.clone(),
                });
            }
        }
    }
    Ok(())
}
