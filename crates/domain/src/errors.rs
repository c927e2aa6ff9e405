use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Timeout waiting for upstream {server}")]
    UpstreamTimeout { server: String },

    #[error("Upstream {server} unreachable: {reason}")]
    UpstreamUnreachable { server: String, reason: String },

    #[error("Failed to bind listener on {addr}: {reason}")]
    BindFailure { addr: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// True for failures that leave the client without an upstream answer.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            DomainError::UpstreamTimeout { .. } | DomainError::UpstreamUnreachable { .. }
        )
    }
}
