use thiserror::Error;

/// Result type alias for cep-router operations
pub type Result<T, E = CepRouterError> = std::result::Result<T, E>;

/// Errors that stop the service from starting or serving
#[derive(Error, Debug)]
pub enum CepRouterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ValidationError),
}

/// Failure of a single upstream lookup.
///
/// Only these three kinds ever leave an upstream client; the resolver treats
/// them as opaque.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Upstream transport error: {0}")]
    Transport(String),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

/// An upstream failure tagged with the provider that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    pub provider: &'static str,
    pub error: UpstreamError,
}

/// Terminal failures of a resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("All upstreams failed ({} failures)", failures.len())]
    BothFailed { failures: Vec<UpstreamFailure> },

    /// The deadline elapsed with no success. `failed` counts the upstreams
    /// that had already failed at that moment.
    #[error("Deadline elapsed with {failed} upstream(s) failed")]
    Timeout { failed: usize },
}
