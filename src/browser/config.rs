// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser configuration

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::http::headers::{ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE};
use crate::http::DEFAULT_USER_AGENT;

/// Extra attempts after a failed transport attempt
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Per-request read timeout
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(60);
/// Time allowed to establish a connection
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Proxy host and port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

/// Browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// User agent string, replaced by a `User-Agent` default header
    pub user_agent: String,
    /// Headers sent with every request
    pub default_headers: HashMap<String, String>,
    /// Extra attempts for failed transport attempts
    pub retry_count: u32,
    /// Per-request read timeout
    #[serde(with = "duration_ms", rename = "socket_timeout_ms")]
    pub socket_timeout: Duration,
    /// Connect timeout
    #[serde(with = "duration_ms", rename = "connection_timeout_ms")]
    pub connection_timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Proxy used for all requests
    pub proxy: Option<ProxyConfig>,
    /// Whether the browser will be shared between threads
    pub thread_safe: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: HashMap::new(),
            retry_count: DEFAULT_RETRY_COUNT,
            socket_timeout: DEFAULT_SOCKET_TIMEOUT,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            max_redirects: 10,
            ignore_https_errors: false,
            proxy: None,
            thread_safe: false,
        }
    }
}

impl BrowserConfig {
    /// Create a new browser config
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset sending the Accept headers a desktop browser sends
    pub fn browser_like() -> Self {
        Self::default()
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .header(ACCEPT_ENCODING, "gzip, deflate")
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|n, _| !n.eq_ignore_ascii_case(&name));
        self.default_headers.insert(name, value.into());
        self
    }

    /// Set retry count
    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Set socket timeout
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    /// Set connection timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set maximum redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy = Some(ProxyConfig {
            host: host.into(),
            port,
        });
        self
    }

    /// Mark the browser as shared between threads
    pub fn thread_safe(mut self, thread_safe: bool) -> Self {
        self.thread_safe = thread_safe;
        self
    }
}

/// Parse headers from properties text.
///
/// Each line is `name=value` or `name: value`. Blank lines and lines
/// starting with `#` or `!` are skipped.
pub fn parse_headers_properties(text: &str) -> Result<HashMap<String, String>> {
    let mut headers = HashMap::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let split = match (line.find('='), line.find(':')) {
            (Some(eq), Some(colon)) => eq.min(colon),
            (Some(pos), None) | (None, Some(pos)) => pos,
            (None, None) => {
                return Err(Error::Config(format!(
                    "line {}: expected name=value or name: value",
                    idx + 1
                )))
            }
        };

        let name = line[..split].trim();
        if name.is_empty() {
            return Err(Error::Config(format!("line {}: empty header name", idx + 1)));
        }
        headers.insert(name.to_string(), line[split + 1..].trim().to_string());
    }

    Ok(headers)
}

/// Read headers from a properties file, see [`parse_headers_properties`]
pub fn load_headers_properties(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_headers_properties(&text)
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
