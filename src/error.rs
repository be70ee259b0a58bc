//!
//! Defines error types for the security engine.
//!
//! Denials are not errors: `Denied`/`AclDenied` results come back through the
//! normal success path. The variants here are for defects and unsupported
//! operations.

/// Errors surfaced by the security facade and policies.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    /// The configured policies are inconsistent (e.g. authentication without
    /// authorization). Not recoverable at runtime.
    #[error("Security misconfiguration: {0}")]
    Configuration(String),
    /// The active authorization policy cannot answer this question.
    #[error("Operation not implemented by {policy}: {operation}")]
    NotImplemented { policy: &'static str, operation: &'static str },
    /// A policy or facade call was handed malformed input.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// A permission check was required to pass and it did not.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Loading security configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading a [`crate::config::SecurityConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read security config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse security config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid security config: {0}")]
    Invalid(String),
}
