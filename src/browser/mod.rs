// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser facades
//!
//! A [`WebBrowser`] holds default headers, cookies, retry and timeout
//! settings and issues [`WebRequest`]s with them. Three flavours exist:
//! - [`DefaultWebBrowser`]: one client, shareable when created thread-safe
//! - [`ThreadLocalWebBrowser`]: one independent browser per thread
//! - [`MultiThreadWebBrowser`]: one browser per thread with shared settings
//!   and cookies

mod config;
mod default;
mod multi_thread;
mod per_thread;
mod thread_local;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::http::{Cookie, WebRequest, WebResponse};

pub use config::{
    load_headers_properties, parse_headers_properties, BrowserConfig, ProxyConfig,
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_RETRY_COUNT, DEFAULT_SOCKET_TIMEOUT,
};
pub use default::DefaultWebBrowser;
pub use multi_thread::MultiThreadWebBrowser;
pub use thread_local::ThreadLocalWebBrowser;

/// HTTP facade with browser-like state
#[async_trait]
pub trait WebBrowser: Send + Sync {
    /// GET `url`
    async fn get(&self, url: &str) -> Result<WebResponse> {
        self.execute(&WebRequest::get(url)).await
    }

    /// GET `url`, decoding the body text with `charset`
    async fn get_with_charset(&self, url: &str, charset: &str) -> Result<WebResponse> {
        self.execute_with_charset(&WebRequest::get(url), charset).await
    }

    /// Send a request
    async fn execute(&self, request: &WebRequest) -> Result<WebResponse>;

    /// Send a request, decoding the body text with `charset` regardless of
    /// what the server announces
    async fn execute_with_charset(&self, request: &WebRequest, charset: &str)
        -> Result<WebResponse>;

    /// Default headers sent with every request
    fn headers(&self) -> HashMap<String, String>;

    /// Default header by name, case-insensitive
    fn header(&self, name: &str) -> Option<String>;

    /// Add a default header, replacing one with the same name
    fn add_header(&self, name: &str, value: &str);

    /// Add several default headers
    fn add_headers(&self, headers: &HashMap<String, String>);

    /// Replace all default headers
    fn set_default_headers(&self, headers: HashMap<String, String>);

    fn retry_count(&self) -> u32;

    fn set_retry_count(&self, retry_count: u32);

    fn socket_timeout(&self) -> Duration;

    fn set_socket_timeout(&self, timeout: Duration);

    fn connection_timeout(&self) -> Duration;

    fn set_connection_timeout(&self, timeout: Duration);

    /// All stored cookies
    fn cookies(&self) -> Vec<Cookie>;

    /// Stored cookie by name
    fn cookie_by_name(&self, name: &str) -> Option<Cookie>;

    fn add_cookie(&self, cookie: Cookie);

    fn add_cookies(&self, cookies: Vec<Cookie>);

    fn clear_all_cookies(&self);

    /// Route all requests through an HTTP proxy
    fn set_proxy(&self, host: &str, port: u16) -> Result<()>;

    /// Connect directly
    fn clear_proxy(&self);

    /// Cancel the requests this browser has in flight. They fail with
    /// [`Error::Aborted`](crate::Error::Aborted).
    fn abort(&self);
}
