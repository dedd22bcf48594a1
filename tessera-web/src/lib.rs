//! Reusable web middleware and utilities for the Tessera APIs
//!
//! Everything HTTP-shaped but handler-agnostic lives here: the web error
//! type and its response mapping, the identity and request-id middleware,
//! the tenant-reference extractor, the response envelope, and the
//! tracing-backed audit sink.

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use audit::TracingAuditSink;
pub use errors::{WebError, WebResult};
pub use extractors::{Identity, TenantRef};
pub use middleware::{identity_middleware, request_id_middleware};
pub use response::ApiResponse;
