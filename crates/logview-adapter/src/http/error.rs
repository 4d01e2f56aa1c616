/*
[INPUT]:  Error sources (HTTP transport, file IO, URL parsing, response status)
[OUTPUT]: Structured error types for feed opening and chunk reads
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new transports or fatal feed conditions
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the logview adapter.
///
/// Every variant is fatal for the feed that produced it. Malformed NDJSON lines
/// are not errors; see [`crate::stream::DecodeWarning`].
#[derive(Error, Debug)]
pub enum LogviewError {
    /// HTTP request or body read failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Local file or stdin read failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Feed responded with a non-success status
    #[error("Failed to fetch logs: {reason} (status {code})")]
    Status { code: u16, reason: String },

    /// Feed responded without a body to read
    #[error("Response body is null")]
    MissingBody,

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// URL scheme has no transport
    #[error("Unsupported feed scheme: {0}")]
    UnsupportedScheme(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LogviewError {
    /// Check if the error was raised before any body bytes could be read
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            LogviewError::Status { .. }
                | LogviewError::MissingBody
                | LogviewError::UrlParse(_)
                | LogviewError::UnsupportedScheme(_)
        )
    }

    /// Check if the error came from the underlying transport
    pub fn is_transport_error(&self) -> bool {
        matches!(self, LogviewError::Http(_) | LogviewError::Io(_))
    }

    /// Create a status error from a response status code
    pub fn status_error(status: StatusCode) -> Self {
        LogviewError::Status {
            code: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        }
    }
}

/// Result type alias for logview adapter operations
pub type Result<T> = std::result::Result<T, LogviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_creation() {
        let err = LogviewError::status_error(StatusCode::BAD_GATEWAY);
        match &err {
            LogviewError::Status { code, reason } => {
                assert_eq!(*code, 502);
                assert_eq!(reason, "Bad Gateway");
            }
            _ => panic!("Expected Status error variant"),
        }
        assert_eq!(
            err.to_string(),
            "Failed to fetch logs: Bad Gateway (status 502)"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(LogviewError::MissingBody.is_open_failure());
        assert!(!LogviewError::MissingBody.is_transport_error());

        let io_err = LogviewError::from(std::io::Error::other("broken pipe"));
        assert!(io_err.is_transport_error());
        assert!(!io_err.is_open_failure());
    }
}
