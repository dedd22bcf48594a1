//! Identity middleware
//!
//! Tessera does not issue or verify tokens. The external identity provider
//! terminates authentication upstream and forwards the verified claim set as
//! gateway headers; this middleware turns those headers into
//! [`IdentityClaims`] request extensions. Requests without a parseable claim
//! set simply carry no claims, and the `Identity` extractor rejects them
//! with the `Unauthenticated` condition.

use axum::{extract::Request, middleware::Next, response::Response};
use http::HeaderMap;
use tracing::trace;
use uuid::Uuid;

use tessera_rbac::IdentityClaims;

/// Header carrying the verified subject id (UUID)
pub const SUBJECT_HEADER: &str = "x-auth-subject";

/// Header carrying the verified email
pub const EMAIL_HEADER: &str = "x-auth-email";

/// Header flagging platform god mode
pub const GOD_HEADER: &str = "x-auth-god";

/// Attach [`IdentityClaims`] from the gateway headers, when present
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    if let Some(claims) = claims_from_headers(request.headers()) {
        trace!(subject = %claims.subject_id, is_god = claims.is_god, "identity claims attached");
        request.extensions_mut().insert(claims);
    }
    next.run(request).await
}

fn claims_from_headers(headers: &HeaderMap) -> Option<IdentityClaims> {
    let subject_id = headers
        .get(SUBJECT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())?;
    let email = headers
        .get(EMAIL_HEADER)
        .and_then(|value| value.to_str().ok())?
        .to_string();
    let is_god = headers
        .get(GOD_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| matches!(value.trim(), "true" | "1"))
        .unwrap_or(false);

    Some(IdentityClaims {
        subject_id,
        email,
        is_god,
    })
}
