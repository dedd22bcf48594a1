//! Dependency injection context for the REST handlers

use std::sync::Arc;

use tessera_entity::EntityService;
use tessera_factory::TemplateFactory;
use tessera_interfaces::{AuditSink, RepositoryFactory};
use tessera_rbac::{AuthorizationPipeline, RoleService, TenantManager};

/// Application context shared by every handler group
///
/// Built once at startup from a repository factory and an audit sink; every
/// service inside shares both, so swapping the backend swaps the whole
/// surface.
#[derive(Clone)]
pub struct AppContext {
    pub repos: Arc<dyn RepositoryFactory>,
    pub pipeline: AuthorizationPipeline,
    pub roles: RoleService,
    pub tenants: TenantManager,
    pub entities: EntityService,
    pub factory: TemplateFactory,
}

impl AppContext {
    pub fn new(repos: Arc<dyn RepositoryFactory>, audit: Arc<dyn AuditSink>) -> Self {
        let pipeline = AuthorizationPipeline::new(repos.clone());
        let roles = RoleService::new(repos.clone(), audit.clone());
        let tenants = TenantManager::new(repos.clone(), roles.clone(), audit.clone());
        let entities = EntityService::new(repos.clone(), audit.clone());
        let factory = TemplateFactory::new(repos.clone(), audit.clone());
        Self {
            repos,
            pipeline,
            roles,
            tenants,
            entities,
            factory,
        }
    }
}
