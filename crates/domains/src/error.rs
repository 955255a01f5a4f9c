//! # ForumError
//!
//! Centralized error handling for the Agora ecosystem.
//! Outcomes are precise enough for the request layer to pick a status code
//! without inspecting message text.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The primary error type for all domain operations.
#[derive(Error, Debug, PartialEq)]
pub enum ForumError {
    /// Referenced entity absent (e.g., forum, thread, response, account)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// A mutating action was attempted while a ban is active.
    /// Carries `banned_until` so the caller can render "banned until X".
    #[error("account is banned until {0}")]
    Banned(DateTime<Utc>),

    /// Actor is neither the owner nor a holder of the required capability
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// One or more request fields were missing, oversized, or malformed
    #[error("validation failed: {}", describe_fields(.0))]
    ValidationFailed(Vec<FieldError>),

    /// Structurally disallowed operation (e.g., deleting a root post)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Uniqueness violation (e.g., display name already taken)
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Infrastructure failure (e.g., store unavailable)
    #[error("internal service error: {0}")]
    Internal(String),
}

fn describe_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A specialized Result type for Agora domain logic.
pub type Result<T> = std::result::Result<T, ForumError>;
