//! Error types for docproc-client
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants (validation, transport, processing, cache)
//! - `#[from]` conversions for the underlying I/O, HTTP, and JSON errors
//! - Classification of transport failures for the optional unified retry policy

use thiserror::Error;

/// Result type alias for docproc-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for docproc-client
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Input validation failed before any request was issued
    /// (missing file, empty file, unsupported extension, empty task id)
    #[error("validation error: {0}")]
    Validation(String),

    /// Network or transport error while talking to the processing service
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// Error message from the response body, or a generic description
        message: String,
    },

    /// The requested task does not exist on the server
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// The server reported that document processing failed
    #[error("processing failed: {0}")]
    Processing(String),

    /// The server response did not match the expected shape
    /// (e.g. missing task id, completed task without a result payload)
    #[error("malformed server response: {0}")]
    MalformedResponse(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured base URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Document cache read or write failed
    #[error("cache error: {0}")]
    Cache(String),

    /// A poll session for this task is already running
    #[error("task {0} is already being polled")]
    AlreadyPolling(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns true if the error occurred at the transport layer (the status
    /// query never produced a server-reported task status).
    ///
    /// By default the poller surfaces these immediately; when
    /// [`PollConfig::retry_transport_errors`](crate::config::PollConfig) is
    /// enabled they are retried on the normal poll cadence instead, against
    /// the same attempt budget.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = Error::Validation("no file selected".to_string());
        assert_eq!(err.to_string(), "validation error: no file selected");
    }

    #[test]
    fn api_error_display_includes_status() {
        let err = Error::Api {
            status: 500,
            message: "internal error".to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 500): internal error");
    }

    #[test]
    fn task_not_found_display() {
        let err = Error::TaskNotFound("abc123".to_string());
        assert_eq!(err.to_string(), "task not found: abc123");
    }

    #[test]
    fn processing_error_display() {
        let err = Error::Processing("extraction produced no results".to_string());
        assert_eq!(
            err.to_string(),
            "processing failed: extraction produced no results"
        );
    }

    #[test]
    fn serialization_error_converts() {
        let json_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn io_error_converts_and_is_not_transport() {
        let err: Error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn url_parse_error_converts() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn non_network_errors_are_not_transport() {
        assert!(!Error::Validation("x".to_string()).is_transport());
        assert!(!Error::TaskNotFound("y".to_string()).is_transport());
        assert!(
            !Error::Api {
                status: 503,
                message: "busy".to_string()
            }
            .is_transport()
        );
        assert!(!Error::Cache("locked".to_string()).is_transport());
        assert!(!Error::AlreadyPolling("z".to_string()).is_transport());
        assert!(!Error::Other("unknown".to_string()).is_transport());
    }
}
