//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limiting, eventual-consistency lag and other conditions that
    /// resolve on their own. Only this variant is retried.
    #[error("Transient error: {0}")]
    Transient(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid resource id `{id}`: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("Field `{field}` of {resource_type} cannot be changed in place")]
    ImmutableField {
        resource_type: String,
        field: String,
    },

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("Timeout while waiting for {operation}: {last_error}")]
    Timeout {
        operation: String,
        last_error: String,
    },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether the remote side reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::ResourceNotFound(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, CloudError::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
