// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for lighthttp
//!
//! Transport failures, malformed requests and body decoding problems all
//! surface through [`Error`]. Variants carry the URL and timing context
//! that is available at the point of failure.

use thiserror::Error;

/// Result type alias for lighthttp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lighthttp
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Header name or value rejected
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// Request was aborted through `WebBrowser::abort`
    #[error("Request to {url} was aborted")]
    Aborted { url: String },

    /// All attempts failed
    #[error("Request to {url} failed after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// Charset label not known to the decoder
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Response body could not be decompressed
    #[error("Failed to decode {encoding} body: {reason}")]
    Decompression { encoding: String, reason: String },

    /// Proxy configuration rejected
    #[error("Invalid proxy {host}:{port}: {reason}")]
    Proxy {
        host: String,
        port: u16,
        reason: String,
    },

    /// Multipart body could not be assembled
    #[error("Multipart error in part '{part}': {reason}")]
    Multipart { part: String, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a header error
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create an abort error
    pub fn aborted(url: impl Into<String>) -> Self {
        Error::Aborted { url: url.into() }
    }

    /// Create a multipart error
    pub fn multipart(part: impl Into<String>, reason: impl ToString) -> Self {
        Error::Multipart {
            part: part.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            Error::RetriesExhausted { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Check if the request was aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted { .. })
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// Check if another attempt may succeed.
    ///
    /// Timeouts are not retried: the server had its full budget already.
    /// Neither are unknown hosts.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Http(e) => {
                !e.is_timeout() && !e.is_builder() && !e.is_redirect() && !is_dns_failure(e)
            }
            _ => false,
        }
    }

    /// Check if the host name could not be resolved
    pub fn is_unknown_host(&self) -> bool {
        match self {
            Error::Http(e) => is_dns_failure(e),
            Error::RetriesExhausted { source, .. } => source.is_unknown_host(),
            _ => false,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url: Some(u), .. } => Some(u),
            Error::Aborted { url } => Some(url),
            Error::RetriesExhausted { url, .. } => Some(url),
            Error::Http(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }
}

// reqwest has no resolver error kind; hyper's connector reports it as
// "dns error" somewhere down the source chain.
fn is_dns_failure(err: &reqwest::Error) -> bool {
    if !err.is_connect() {
        return false;
    }
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let message = cause.to_string();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add URL context to error
    fn with_url(self, url: &str) -> Result<T>;

    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Timeout {
                operation,
                duration_ms,
                ..
            } => Error::Timeout {
                operation,
                duration_ms,
                url: Some(url.to_string()),
            },
            other => other,
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error() {
        let err = Error::timeout_with_url("request", 5000, "https://example.com");

        assert!(err.is_timeout());
        assert!(!err.is_recoverable());
        assert_eq!(err.url(), Some("https://example.com"));
    }

    #[test]
    fn test_with_url_fills_timeout() {
        let res: Result<()> = Err(Error::Timeout {
            operation: "request".to_string(),
            duration_ms: 100,
            url: None,
        });
        let err = res.with_url("http://localhost/slow").unwrap_err();
        assert_eq!(err.url(), Some("http://localhost/slow"));
    }

    #[test]
    fn test_retries_exhausted_wraps_source() {
        let err = Error::RetriesExhausted {
            url: "http://localhost".to_string(),
            attempts: 4,
            source: Box::new(Error::Other("connection reset".to_string())),
        };
        assert_eq!(err.url(), Some("http://localhost"));
        assert!(err.to_string().contains("4 attempt(s)"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_aborted_is_not_recoverable() {
        let err = Error::aborted("http://localhost/");
        assert!(err.is_aborted());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_non_transport_errors_are_not_unknown_host() {
        assert!(!Error::aborted("http://localhost/").is_unknown_host());
        assert!(!Error::Config("bad".to_string()).is_unknown_host());
    }
}
