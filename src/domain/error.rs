use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Cycle aborted: {0}")]
    Cycle(String),
}

/// Failure to acquire content from a URL or an API feed. Always absorbed by
/// the scheduler; never fails a cycle.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// HTTP or network error
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// Response parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error (missing API token, etc.)
    #[error("Config error: {0}")]
    Config(String),
}
