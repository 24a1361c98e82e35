//! Error types for the offline agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, OfflineError>;

/// Error types that can occur in the offline agent
#[derive(Error, Debug, Clone)]
pub enum OfflineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Timeout after {0} ms")]
    Timeout(u64),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Population failure: {0}")]
    PopulationFailure(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for OfflineError {
    fn from(err: std::io::Error) -> Self {
        OfflineError::NetworkFailure(err.to_string())
    }
}

impl OfflineError {
    /// Convert error to the HTTP status code of the synthesized response
    ///
    /// The requester never sees a raw error; every failure path ends in a
    /// well-formed response carrying this status.
    ///
    /// - Network failures, timeouts, storage and population failures map
    ///   to 503 Service Unavailable
    /// - Parse errors map to 400 Bad Request
    /// - Configuration and internal errors map to 500
    pub fn to_http_status(&self) -> u16 {
        match self {
            OfflineError::NetworkFailure(_) => 503,
            OfflineError::Timeout(_) => 503,
            OfflineError::StorageFailure(_) => 503,
            OfflineError::PopulationFailure(_) => 503,
            OfflineError::ParseError(_) => 400,
            OfflineError::ConfigError(_) => 500,
            OfflineError::InternalError(_) => 500,
        }
    }

    /// Whether this error is recovered locally by a caching strategy
    ///
    /// Recoverable errors fall back to cache or a synthesized 503 inside
    /// the strategy that observed them. Non-recoverable errors abort the
    /// surrounding operation (configuration loading, installation).
    pub fn is_recoverable(&self) -> bool {
        match self {
            OfflineError::NetworkFailure(_) => true,
            OfflineError::Timeout(_) => true,
            OfflineError::StorageFailure(_) => true,
            OfflineError::PopulationFailure(_) => false,
            OfflineError::ParseError(_) => false,
            OfflineError::ConfigError(_) => false,
            OfflineError::InternalError(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            OfflineError::NetworkFailure("refused".to_string()).to_http_status(),
            503
        );
        assert_eq!(OfflineError::Timeout(5000).to_http_status(), 503);
        assert_eq!(
            OfflineError::StorageFailure("poisoned".to_string()).to_http_status(),
            503
        );
        assert_eq!(
            OfflineError::ParseError("bad json".to_string()).to_http_status(),
            400
        );
        assert_eq!(
            OfflineError::ConfigError("empty origin".to_string()).to_http_status(),
            500
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(OfflineError::NetworkFailure("x".to_string()).is_recoverable());
        assert!(OfflineError::Timeout(5000).is_recoverable());
        assert!(OfflineError::StorageFailure("x".to_string()).is_recoverable());
        assert!(!OfflineError::PopulationFailure("x".to_string()).is_recoverable());
        assert!(!OfflineError::ConfigError("x".to_string()).is_recoverable());
    }
}
