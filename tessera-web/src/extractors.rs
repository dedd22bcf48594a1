//! Request extractors for identity and tenant scope

use axum::{extract::FromRequestParts, http::request::Parts};
use http::HeaderMap;
use uuid::Uuid;

use tessera_rbac::IdentityClaims;

use crate::errors::WebError;

/// Header carrying the tenant identifier
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Query parameter carrying the tenant identifier
pub const TENANT_QUERY_PARAM: &str = "tenantId";

/// Verified identity claims for the request
///
/// The identity middleware inserts [`IdentityClaims`] into request
/// extensions; this extractor surfaces their absence as the
/// `Unauthenticated` condition before any pipeline stage runs.
#[derive(Debug, Clone)]
pub struct Identity(pub IdentityClaims);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityClaims>()
            .cloned()
            .map(Identity)
            .ok_or_else(|| WebError::unauthorized("Authentication required"))
    }
}

/// Tenant identifier candidates found on the request line
///
/// Captures the header and query carriers; the path and body carriers are
/// handler-specific and supplied to [`TenantRef::resolve`]. Precedence is
/// header, then path, then query, then body — first present wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantRef {
    pub header: Option<Uuid>,
    pub query: Option<Uuid>,
}

impl TenantRef {
    /// Apply the resolution precedence over all four carriers
    pub fn resolve(&self, path: Option<Uuid>, body: Option<Uuid>) -> Option<Uuid> {
        self.header.or(path).or(self.query).or(body)
    }
}

impl<S> FromRequestParts<S> for TenantRef
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(TenantRef {
            header: tenant_from_headers(&parts.headers),
            query: tenant_from_query(parts.uri.query()),
        })
    }
}

fn tenant_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

fn tenant_from_query(query: Option<&str>) -> Option<Uuid> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == TENANT_QUERY_PARAM)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
