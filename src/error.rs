//! Error types for keyspace
//!
//! Provides a unified error type for all namespace operations.

use thiserror::Error;

/// Result type alias using KeyspaceError
pub type Result<T> = std::result::Result<T, KeyspaceError>;

/// Unified error type for keyspace operations
///
/// A missing key is not an error: reads return `Ok(None)`.
#[derive(Debug, Error)]
pub enum KeyspaceError {
    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any failure reported by the underlying store. Propagated as-is.
    #[error("Store error: {0}")]
    Store(String),

    // -------------------------------------------------------------------------
    // Hook Errors
    // -------------------------------------------------------------------------
    /// A pre- or post-hook returned an error.
    #[error("Hook failed in namespace '{namespace}': {message}")]
    Hook { namespace: String, message: String },

    /// The opt-in recursion guard tripped while staging a cascade.
    #[error("Cascade depth {depth} exceeds limit {limit}")]
    CascadeDepthExceeded { depth: usize, limit: usize },

    // -------------------------------------------------------------------------
    // Namespace Errors
    // -------------------------------------------------------------------------
    #[error("Invalid namespace name: {0}")]
    InvalidNamespace(String),

    #[error("Write batch belongs to namespace '{found}', not '{expected}'")]
    ForeignBatch { expected: String, found: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KeyspaceError {
    /// Build a hook error for the given namespace
    pub fn hook(namespace: impl Into<String>, message: impl Into<String>) -> Self {
        KeyspaceError::Hook {
            namespace: namespace.into(),
            message: message.into(),
        }
    }
}
