//! Unified API error type
//!
//! A single wire-level error shape shared by every handler, so clients see
//! one envelope regardless of which service produced the failure.

use serde::{Deserialize, Serialize};

/// Unified API error carrying a stable code and a human-readable message
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Stable machine-readable error code (`"NOT_FOUND"`, `"FORBIDDEN"`, ...)
    pub code: String,
    pub message: String,
    /// Optional structured detail (validation issues, conflicting keys, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new("UNAUTHENTICATED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found: {id}"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// HTTP status this error maps to at the web boundary
    pub fn http_status_code(&self) -> u16 {
        match self.code.as_str() {
            "UNAUTHENTICATED" => 401,
            "FORBIDDEN" => 403,
            "NOT_FOUND" => 404,
            "CONFLICT" => 409,
            "BAD_REQUEST" | "VALIDATION_ERROR" => 400,
            _ => 500,
        }
    }
}
