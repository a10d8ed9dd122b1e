//! Crate-wide error type for boundaries that must surface a hard failure.
//!
//! Per the engine's error-handling design, most numeric and store-level
//! failures are routine and represented by `Option`, never by this type.
//! [`EngineError`] is reserved for startup configuration failures and
//! transport failures from the prediction-market fetcher and notifier.

use thiserror::Error;

/// Unified error type for operations that can fail hard.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required credential is missing or empty.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description of what's missing.
        message: String,
    },

    /// HTTP transport error from reqwest.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP error with a non-2xx status code.
    #[error("HTTP {status}: {}", body_preview(.body))]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// JSON deserialization failed.
    #[error("deserialization error: {source}")]
    Deserialize {
        /// The underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// A snippet of the body that failed to parse.
        body_snippet: String,
    },

    /// Invalid argument provided to a method.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Quote listener transport failure (connection, auth, or closed channel).
    #[error("listener error: {0}")]
    Listener(String),
}

/// Truncate a response body to 200 characters to prevent huge error messages.
fn body_preview(body: &str) -> String {
    if body.len() > 200 {
        format!("{}...", &body[..200])
    } else {
        body.to_string()
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_preview_short() {
        assert_eq!(body_preview("short body"), "short body");
    }

    #[test]
    fn test_body_preview_long() {
        let long_body = "x".repeat(500);
        let preview = body_preview(&long_body);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), 203);
    }

    #[test]
    fn test_configuration_display() {
        let err = EngineError::Configuration {
            message: "required credential MASSIVE_API_KEY is not set".to_string(),
        };
        assert!(format!("{err}").contains("MASSIVE_API_KEY"));
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = EngineError::InvalidArgument("ticker is required");
        assert_eq!(format!("{err}"), "invalid argument: ticker is required");
    }

    #[test]
    fn test_http_status_display_truncates() {
        let err = EngineError::HttpStatus {
            status: 503,
            body: "x".repeat(300),
        };
        let display = format!("{err}");
        assert!(display.starts_with("HTTP 503:"));
        assert!(display.ends_with("..."));
    }
}
