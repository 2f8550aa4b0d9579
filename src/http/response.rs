// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Completed HTTP response

use std::collections::HashMap;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::decoding::{charset_from_content_type, decode_text};
use super::headers::{CONTENT_TYPE, SET_COOKIE};
use crate::error::{Error, Result};

/// A completed response with its body fully read and decompressed.
///
/// Redirects are followed by the browser, so 3xx codes are normally not
/// seen here.
#[derive(Debug, Clone)]
pub struct WebResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Url,
    redirected: bool,
    response_time_ms: u64,
    charset: Option<String>,
}

impl WebResponse {
    /// Create a new response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        redirected: bool,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            response_time_ms,
            charset: None,
        }
    }

    /// Charset to decode [`WebResponse::text`] with, overriding the one
    /// announced by the server
    pub fn with_charset(mut self, charset: Option<String>) -> Self {
        self.charset = charset;
        self
    }

    /// URL the response was served from (after redirects)
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether at least one redirect was followed
    pub fn redirected(&self) -> bool {
        self.redirected
    }

    /// Time from sending the request to receiving the full body
    pub fn response_time_ms(&self) -> u64 {
        self.response_time_ms
    }

    /// Status code sent by the server
    pub fn response_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Status as a typed code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if status is client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Check if status is server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Charset used by [`WebResponse::text`]: the expected charset if one
    /// was given, else the one from `Content-Type`
    pub fn charset(&self) -> Option<&str> {
        self.charset
            .as_deref()
            .or_else(|| self.content_type().and_then(charset_from_content_type))
    }

    /// Body as text, UTF-8 unless a charset is known
    pub fn text(&self) -> Result<String> {
        decode_text(&self.body, self.charset())
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Raw body bytes (after content decoding)
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Get body length
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Value of the `Content-Type` header
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// Header value by name, case-insensitive. The first value is
    /// returned for repeated headers.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Headers as a name -> value map; for repeated headers the last
    /// value wins. Names are lowercase.
    pub fn headers(&self) -> HashMap<String, String> {
        let mut map = HashMap::with_capacity(self.headers.keys_len());
        for (name, value) in self.headers.iter() {
            if let Ok(value) = value.to_str() {
                map.insert(name.as_str().to_string(), value.to_string());
            }
        }
        map
    }

    /// Headers as received
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get content length
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all(SET_COOKIE)
    }
}
