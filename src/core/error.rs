// File: core/error.rs
// Unified error type for every request and extraction in the crate.

use reqwest::StatusCode;
use thiserror::Error;

// --- 1. CoreError ---
// Returned by the ApiClient, the extractor and the config layer.

#[derive(Debug, Error)]
pub enum CoreError {
    /// Transport-level failure: DNS, connection reset, timeout, truncated body.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered, but not with a 2xx status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: StatusCode, url: String },

    /// The endpoint needs a logged-in session, or the page came back in
    /// its anonymous rendering.
    #[error("Login required for {endpoint}")]
    AuthRequired { endpoint: &'static str },

    /// A mandatory node is missing from a fully received document.
    #[error("Malformed document: missing {node}")]
    MalformedDocument { node: &'static str },

    #[error("Failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Failed to parse JSON response or payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid headers: {0}")]
    InvalidHeader(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    /// True when the transport gave up waiting. Never true for `HttpStatus`.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Network(e) if e.is_timeout())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CoreError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_is_not_timeout() {
        let err = CoreError::HttpStatus {
            status: StatusCode::NOT_FOUND,
            url: "http://example.com/".to_string(),
        };
        assert!(!err.is_timeout());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_malformed_document_message() {
        let err = CoreError::MalformedDocument { node: "div.avatar" };
        assert_eq!(err.to_string(), "Malformed document: missing div.avatar");
        assert_eq!(err.status(), None);
    }
}
