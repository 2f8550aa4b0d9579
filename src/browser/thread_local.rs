// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! One independent browser per thread

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use tracing::debug;

use super::per_thread::PerThread;
use super::{DefaultWebBrowser, WebBrowser};
use crate::error::Result;
use crate::http::{Cookie, WebRequest, WebResponse};

lazy_static! {
    static ref INSTANCE: ThreadLocalWebBrowser = ThreadLocalWebBrowser::new();
}

/// Delegates every call to a browser owned by the calling thread.
///
/// Headers, timeouts, proxy and cookies set from one thread are invisible
/// to the others. Under a multi-threaded tokio runtime the thread is the
/// one the call starts on. A thread's browser is dropped when the thread
/// exits.
#[derive(Debug, Default)]
pub struct ThreadLocalWebBrowser {
    browsers: PerThread<Arc<DefaultWebBrowser>>,
}

impl ThreadLocalWebBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance
    pub fn instance() -> &'static ThreadLocalWebBrowser {
        &INSTANCE
    }

    /// Browser of the calling thread, created on first use
    pub fn current(&self) -> Arc<DefaultWebBrowser> {
        self.browsers.get_or_insert_with(|| {
            debug!(thread = ?thread::current().id(), "Creating thread-local browser");
            Arc::new(DefaultWebBrowser::new())
        })
    }

    /// Number of threads that have a browser
    pub fn browser_count(&self) -> usize {
        self.browsers.len()
    }
}

#[async_trait]
impl WebBrowser for ThreadLocalWebBrowser {
    async fn execute(&self, request: &WebRequest) -> Result<WebResponse> {
        let browser = self.current();
        browser.execute(request).await
    }

    async fn execute_with_charset(
        &self,
        request: &WebRequest,
        charset: &str,
    ) -> Result<WebResponse> {
        let browser = self.current();
        browser.execute_with_charset(request, charset).await
    }

    fn headers(&self) -> HashMap<String, String> {
        self.current().headers()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.current().header(name)
    }

    fn add_header(&self, name: &str, value: &str) {
        self.current().add_header(name, value)
    }

    fn add_headers(&self, headers: &HashMap<String, String>) {
        self.current().add_headers(headers)
    }

    fn set_default_headers(&self, headers: HashMap<String, String>) {
        self.current().set_default_headers(headers)
    }

    fn retry_count(&self) -> u32 {
        self.current().retry_count()
    }

    fn set_retry_count(&self, retry_count: u32) {
        self.current().set_retry_count(retry_count)
    }

    fn socket_timeout(&self) -> Duration {
        self.current().socket_timeout()
    }

    fn set_socket_timeout(&self, timeout: Duration) {
        self.current().set_socket_timeout(timeout)
    }

    fn connection_timeout(&self) -> Duration {
        self.current().connection_timeout()
    }

    fn set_connection_timeout(&self, timeout: Duration) {
        self.current().set_connection_timeout(timeout)
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.current().cookies()
    }

    fn cookie_by_name(&self, name: &str) -> Option<Cookie> {
        self.current().cookie_by_name(name)
    }

    fn add_cookie(&self, cookie: Cookie) {
        self.current().add_cookie(cookie)
    }

    fn add_cookies(&self, cookies: Vec<Cookie>) {
        self.current().add_cookies(cookies)
    }

    fn clear_all_cookies(&self) {
        self.current().clear_all_cookies()
    }

    fn set_proxy(&self, host: &str, port: u16) -> Result<()> {
        self.current().set_proxy(host, port)
    }

    fn clear_proxy(&self) {
        self.current().clear_proxy()
    }

    fn abort(&self) {
        self.current().abort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_are_per_thread() {
        let browser = Arc::new(ThreadLocalWebBrowser::new());
        browser.add_header("X-Thread", "main");
        browser.set_retry_count(7);

        let other = browser.clone();
        let (header, retries) = thread::spawn(move || (other.header("X-Thread"), other.retry_count()))
            .join()
            .unwrap();

        assert!(header.is_none());
        assert_eq!(retries, 3);
        assert_eq!(browser.header("x-thread").as_deref(), Some("main"));
        assert_eq!(browser.retry_count(), 7);
        assert_eq!(browser.browser_count(), 1);
    }

    #[test]
    fn test_cookies_are_per_thread() {
        let browser = Arc::new(ThreadLocalWebBrowser::new());
        browser.add_cookie(Cookie::new("localhost", "sid", "1"));

        let other = browser.clone();
        let seen = thread::spawn(move || other.cookie_by_name("sid")).join().unwrap();

        assert!(seen.is_none());
        assert!(browser.cookie_by_name("sid").is_some());
    }

    #[test]
    fn test_browsers_of_exited_threads_are_dropped() {
        let browser = Arc::new(ThreadLocalWebBrowser::new());
        for _ in 0..50 {
            let other = browser.clone();
            thread::spawn(move || other.add_header("X-Worker", "1"))
                .join()
                .unwrap();
        }
        assert_eq!(browser.browser_count(), 0);

        browser.set_retry_count(1);
        assert_eq!(browser.browser_count(), 1);
    }

    #[test]
    fn test_same_browser_on_same_thread() {
        let browser = ThreadLocalWebBrowser::new();
        assert!(Arc::ptr_eq(&browser.current(), &browser.current()));
    }

    #[test]
    fn test_instance_is_shared() {
        assert!(std::ptr::eq(
            ThreadLocalWebBrowser::instance(),
            ThreadLocalWebBrowser::instance()
        ));
    }
}
