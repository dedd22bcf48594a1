//! REST API implementation for the Tessera multi-tenant platform
//!
//! Handlers are thin: each one runs the authorization pipeline for its route
//! class, then delegates to the service crates. Dependency injection happens
//! through [`context::AppContext`], so the whole surface runs against any
//! [`tessera_interfaces::RepositoryFactory`] implementation.

pub mod app;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod models;

pub use app::{create_rest_app, AppConfig};
pub use context::AppContext;
pub use errors::{RestError, RestResult};
