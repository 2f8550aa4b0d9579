// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-thread browsers with shared settings and cookies

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::config::{BrowserConfig, ProxyConfig};
use super::default::http_proxy;
use super::per_thread::PerThread;
use super::{DefaultWebBrowser, WebBrowser};
use crate::error::Result;
use crate::http::{Cookie, CookieJar, WebRequest, WebResponse};

/// Keeps one [`DefaultWebBrowser`] per thread, configured alike.
///
/// Setters update a template and every browser created so far; browsers
/// for new threads start from the template. All browsers store cookies in
/// one jar. Getters report the calling thread's browser. A thread's
/// browser is dropped when the thread exits.
#[derive(Debug)]
pub struct MultiThreadWebBrowser {
    // Lock order: template, then browsers.
    template: RwLock<BrowserConfig>,
    browsers: PerThread<Arc<DefaultWebBrowser>>,
    cookie_jar: CookieJar,
}

impl Default for MultiThreadWebBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiThreadWebBrowser {
    pub fn new() -> Self {
        Self::with_config(BrowserConfig::default())
    }

    /// Start every per-thread browser from `config`
    pub fn with_config(config: BrowserConfig) -> Self {
        Self {
            template: RwLock::new(config.thread_safe(false)),
            browsers: PerThread::default(),
            cookie_jar: CookieJar::new(),
        }
    }

    /// Jar shared by all per-thread browsers
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Browser of the calling thread, created on first use
    pub fn current(&self) -> Arc<DefaultWebBrowser> {
        let template = self.template.read();
        self.browsers.get_or_insert_with(|| {
            debug!(thread = ?thread::current().id(), "Creating per-thread browser");
            Arc::new(
                DefaultWebBrowser::with_config(template.clone())
                    .with_cookie_jar(self.cookie_jar.clone()),
            )
        })
    }

    /// Number of threads that have a browser
    pub fn browser_count(&self) -> usize {
        self.browsers.len()
    }

    /// Apply a change to the template and all existing browsers
    fn update(&self, apply: impl Fn(&mut BrowserConfig), broadcast: impl Fn(&DefaultWebBrowser)) {
        let mut template = self.template.write();
        apply(&mut template);
        self.browsers.for_each(|browser| broadcast(browser));
    }
}

#[async_trait]
impl WebBrowser for MultiThreadWebBrowser {
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
        self.update(
            |template| {
                template
                    .default_headers
                    .retain(|n, _| !n.eq_ignore_ascii_case(name));
                template
                    .default_headers
                    .insert(name.to_string(), value.to_string());
            },
            |browser| browser.add_header(name, value),
        );
    }

    fn add_headers(&self, headers: &HashMap<String, String>) {
        for (name, value) in headers {
            self.add_header(name, value);
        }
    }

    fn set_default_headers(&self, headers: HashMap<String, String>) {
        self.update(
            |template| template.default_headers = headers.clone(),
            |browser| browser.set_default_headers(headers.clone()),
        );
    }

    fn retry_count(&self) -> u32 {
        self.current().retry_count()
    }

    fn set_retry_count(&self, retry_count: u32) {
        self.update(
            |template| template.retry_count = retry_count,
            |browser| browser.set_retry_count(retry_count),
        );
    }

    fn socket_timeout(&self) -> Duration {
        self.current().socket_timeout()
    }

    fn set_socket_timeout(&self, timeout: Duration) {
        self.update(
            |template| template.socket_timeout = timeout,
            |browser| browser.set_socket_timeout(timeout),
        );
    }

    fn connection_timeout(&self) -> Duration {
        self.current().connection_timeout()
    }

    fn set_connection_timeout(&self, timeout: Duration) {
        self.update(
            |template| template.connection_timeout = timeout,
            |browser| browser.set_connection_timeout(timeout),
        );
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.cookie_jar.all()
    }

    fn cookie_by_name(&self, name: &str) -> Option<Cookie> {
        self.cookie_jar.get(name)
    }

    fn add_cookie(&self, cookie: Cookie) {
        self.cookie_jar.add(cookie);
    }

    fn add_cookies(&self, cookies: Vec<Cookie>) {
        self.cookie_jar.add_all(cookies);
    }

    fn clear_all_cookies(&self) {
        self.cookie_jar.clear();
    }

    fn set_proxy(&self, host: &str, port: u16) -> Result<()> {
        let proxy = ProxyConfig {
            host: host.to_string(),
            port,
        };
        http_proxy(&proxy)?;

        self.update(
            |template| template.proxy = Some(proxy.clone()),
            |browser| {
                // already validated above
                let _ = browser.set_proxy(host, port);
            },
        );
        Ok(())
    }

    fn clear_proxy(&self) {
        self.update(
            |template| template.proxy = None,
            |browser| browser.clear_proxy(),
        );
    }

    /// Aborts the requests of the calling thread's browser only
    fn abort(&self) {
        self.current().abort()
    }
}
