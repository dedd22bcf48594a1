//! Seed catalog: platform apps and built-in industry templates
//!
//! The app catalog and template blueprints are platform-level data every
//! deployment starts from; tenants never write them.

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use tessera_api_types::{
    App, DashboardBlueprint, FieldBlueprint, FieldType, IndustryTemplate, ModuleBlueprint,
    WidgetBlueprint, WidgetKind, WorkflowAction, WorkflowBlueprint, WorkflowTrigger,
};
use tessera_interfaces::{AppRepository, DatabaseError};

use crate::inmemory::InMemoryBackend;

/// Load the platform app catalog and the built-in templates
pub async fn seed_catalog(backend: &InMemoryBackend) -> Result<(), DatabaseError> {
    for (code, name, is_core) in [
        ("entities", "Custom Objects", true),
        ("crm", "CRM", true),
        ("projects", "Projects", true),
        ("invoicing", "Invoicing", false),
        ("documents", "Documents", false),
        ("automation", "Automation", false),
    ] {
        AppRepository::create(
            backend,
            App {
                id: Uuid::new_v4(),
                code: code.to_string(),
                name: name.to_string(),
                description: None,
                is_core,
            },
        )
        .await?;
    }

    backend.insert_template(law_firm_template()).await?;
    backend.insert_template(real_estate_template()).await?;

    info!("seeded app catalog and industry templates");
    Ok(())
}

fn field(name: &str, key: &str, field_type: FieldType, required: bool, options: &[&str]) -> FieldBlueprint {
    FieldBlueprint {
        name: name.to_string(),
        key: key.to_string(),
        field_type,
        is_required: required,
        options: options.iter().map(|s| s.to_string()).collect(),
    }
}

fn law_firm_template() -> IndustryTemplate {
    IndustryTemplate {
        id: Uuid::new_v4(),
        slug: "law-firm".to_string(),
        name: "Law Firm".to_string(),
        description: Some("Clients, matters and intake automation for a small practice".to_string()),
        modules: vec![
            ModuleBlueprint {
                name: "Clients".to_string(),
                slug: "clients".to_string(),
                icon: Some("briefcase".to_string()),
                description: None,
                fields: vec![
                    field("Full name", "name", FieldType::Text, true, &[]),
                    field("Email", "email", FieldType::Email, false, &[]),
                    field("Phone", "phone", FieldType::Phone, false, &[]),
                    field("SSN", "ssn", FieldType::Text, false, &[]),
                ],
            },
            ModuleBlueprint {
                name: "Matters".to_string(),
                slug: "matters".to_string(),
                icon: Some("scale".to_string()),
                description: None,
                fields: vec![
                    field("Title", "title", FieldType::Text, true, &[]),
                    field("Status", "status", FieldType::Select, true, &["open", "pending", "closed"]),
                    field("Opened on", "opened_on", FieldType::Date, false, &[]),
                    field("Estimated value", "estimated_value", FieldType::Currency, false, &[]),
                ],
            },
        ],
        workflows: vec![WorkflowBlueprint {
            name: "Matter intake".to_string(),
            module_slug: "matters".to_string(),
            trigger: WorkflowTrigger::RecordCreated,
            actions: vec![
                WorkflowAction {
                    kind: "send_email".to_string(),
                    params: json!({"template": "matter-opened", "to": "{{owner.email}}"}),
                    order: 0,
                },
                WorkflowAction {
                    kind: "create_task".to_string(),
                    params: json!({"title": "Run conflict check", "dueInDays": 2}),
                    order: 1,
                },
            ],
        }],
        dashboards: vec![DashboardBlueprint {
            name: "Partner overview".to_string(),
            role: "owner".to_string(),
            widgets: vec![
                WidgetBlueprint {
                    title: "Active clients".to_string(),
                    kind: WidgetKind::Stat,
                    module_slug: "clients".to_string(),
                    config: json!({"metric": "count"}),
                    position: 0,
                },
                WidgetBlueprint {
                    title: "Open matters".to_string(),
                    kind: WidgetKind::List,
                    module_slug: "matters".to_string(),
                    config: json!({"filter": {"status": "open"}, "limit": 10}),
                    position: 1,
                },
            ],
        }],
    }
}

fn real_estate_template() -> IndustryTemplate {
    IndustryTemplate {
        id: Uuid::new_v4(),
        slug: "real-estate".to_string(),
        name: "Real Estate Agency".to_string(),
        description: Some("Listings and viewings for an agency".to_string()),
        modules: vec![
            ModuleBlueprint {
                name: "Properties".to_string(),
                slug: "properties".to_string(),
                icon: Some("home".to_string()),
                description: None,
                fields: vec![
                    field("Address", "address", FieldType::Text, true, &[]),
                    field("Asking price", "price", FieldType::Currency, true, &[]),
                    field("Status", "status", FieldType::Select, true, &["listed", "under_offer", "sold"]),
                    field("Listing URL", "listing_url", FieldType::Url, false, &[]),
                ],
            },
            ModuleBlueprint {
                name: "Viewings".to_string(),
                slug: "viewings".to_string(),
                icon: Some("calendar".to_string()),
                description: None,
                fields: vec![
                    field("Scheduled for", "scheduled_for", FieldType::DateTime, true, &[]),
                    field("Notes", "notes", FieldType::Textarea, false, &[]),
                ],
            },
        ],
        workflows: vec![WorkflowBlueprint {
            name: "New listing announcement".to_string(),
            module_slug: "properties".to_string(),
            trigger: WorkflowTrigger::RecordCreated,
            actions: vec![WorkflowAction {
                kind: "send_email".to_string(),
                params: json!({"template": "new-listing", "to": "{{team}}"}),
                order: 0,
            }],
        }],
        dashboards: vec![DashboardBlueprint {
            name: "Agent dashboard".to_string(),
            role: "member".to_string(),
            widgets: vec![WidgetBlueprint {
                title: "Listings by status".to_string(),
                kind: WidgetKind::Chart,
                module_slug: "properties".to_string(),
                config: json!({"groupBy": "status"}),
                position: 0,
            }],
        }],
    }
}
