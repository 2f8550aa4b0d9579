// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser backed by a single HTTP client

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::future::{AbortHandle, Abortable};
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Proxy, RequestBuilder, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::config::{BrowserConfig, ProxyConfig};
use super::WebBrowser;
use crate::error::{Error, Result};
use crate::http::headers::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use crate::http::{
    build_multipart, decompress_body, ConnectionManager, ConnectionManagerFactory, Cookie,
    CookieJar, DefaultConnectionManagerFactory, RequestEntity, WebRequest, WebResponse,
};

#[derive(Default)]
struct ClientSlot {
    client: Option<Client>,
    /// Set through [`DefaultWebBrowser::set_http_client`]; never rebuilt
    injected: bool,
}

/// Browser issuing requests through one `reqwest` client.
///
/// The client is built on first use and rebuilt after the connection
/// timeout or proxy changes. All settings can be changed through `&self`,
/// so a browser created with [`DefaultWebBrowser::thread_safe`] can be
/// shared behind an `Arc`.
pub struct DefaultWebBrowser {
    settings: RwLock<BrowserConfig>,
    client: RwLock<ClientSlot>,
    cookie_jar: CookieJar,
    manager: ConnectionManager,
    in_flight: DashMap<u64, AbortHandle>,
    next_request_id: AtomicU64,
}

impl std::fmt::Debug for DefaultWebBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultWebBrowser")
            .field("settings", &*self.settings.read())
            .field("manager", &self.manager)
            .field("cookies", &self.cookie_jar.len())
            .finish()
    }
}

impl Default for DefaultWebBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultWebBrowser {
    /// Browser for use from a single thread
    pub fn new() -> Self {
        Self::with_config(BrowserConfig::default())
    }

    /// Browser with a pooled connection manager, for sharing between threads
    pub fn thread_safe() -> Self {
        Self::with_config(BrowserConfig::default().thread_safe(true))
    }

    /// Create a browser with custom configuration
    pub fn with_config(config: BrowserConfig) -> Self {
        Self::with_config_and_factory(config, &DefaultConnectionManagerFactory)
    }

    /// Create a browser whose connection manager comes from `factory`
    pub fn with_config_and_factory(
        config: BrowserConfig,
        factory: &dyn ConnectionManagerFactory,
    ) -> Self {
        let manager = factory.new_manager(config.thread_safe);
        Self {
            settings: RwLock::new(config),
            client: RwLock::new(ClientSlot::default()),
            cookie_jar: CookieJar::new(),
            manager,
            in_flight: DashMap::new(),
            next_request_id: AtomicU64::new(0),
        }
    }

    /// Store cookies in `jar`, which may be shared with other browsers
    pub fn with_cookie_jar(mut self, jar: CookieJar) -> Self {
        self.cookie_jar = jar;
        self.invalidate_client();
        self
    }

    /// The cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Connection manager the client is configured with
    pub fn connection_manager(&self) -> ConnectionManager {
        self.manager
    }

    /// Snapshot of the current settings
    pub fn config(&self) -> BrowserConfig {
        self.settings.read().clone()
    }

    /// Use a caller-built client as-is.
    ///
    /// Timeout, proxy and pooling settings of this browser no longer affect
    /// connections; the socket timeout is still applied per request.
    /// Cookies are read from and written to the browser's jar around each
    /// request, so cookies set on intermediate redirects are not captured.
    pub fn set_http_client(&self, client: Client) {
        let mut slot = self.client.write();
        slot.client = Some(client);
        slot.injected = true;
    }

    /// Whether a client is currently built
    pub fn has_client(&self) -> bool {
        self.client.read().client.is_some()
    }

    fn client(&self) -> Result<(Client, bool)> {
        {
            let slot = self.client.read();
            if let Some(client) = slot.client.as_ref() {
                return Ok((client.clone(), slot.injected));
            }
        }

        let mut slot = self.client.write();
        if let Some(client) = slot.client.as_ref() {
            return Ok((client.clone(), slot.injected));
        }

        let client = self.build_client()?;
        slot.client = Some(client.clone());
        Ok((client, false))
    }

    fn build_client(&self) -> Result<Client> {
        let settings = self.settings.read();

        let mut builder = Client::builder()
            .user_agent(&settings.user_agent)
            .connect_timeout(settings.connection_timeout)
            .redirect(Policy::limited(settings.max_redirects))
            .danger_accept_invalid_certs(settings.ignore_https_errors)
            .cookie_provider(Arc::new(self.cookie_jar.clone()));
        builder = self.manager.configure(builder);

        builder = match &settings.proxy {
            Some(proxy) => builder.proxy(http_proxy(proxy)?),
            None => builder.no_proxy(),
        };

        debug!(
            manager = ?self.manager,
            connect_timeout_ms = settings.connection_timeout.as_millis() as u64,
            proxy = ?settings.proxy,
            "Building HTTP client"
        );
        Ok(builder.build()?)
    }

    /// Drop the owned client so the next request rebuilds it
    fn invalidate_client(&self) {
        let mut slot = self.client.write();
        if !slot.injected {
            slot.client = None;
        }
    }

    fn request_headers(&self, request: &WebRequest) -> Result<HeaderMap> {
        let defaults = self.settings.read().default_headers.clone();

        let mut headers = HeaderMap::with_capacity(defaults.len() + request.headers().len());
        for (name, value) in defaults.iter().chain(request.headers().iter()) {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::invalid_header(name, e))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| Error::invalid_header(name, e))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    async fn send(&self, request: &WebRequest, charset: Option<&str>) -> Result<WebResponse> {
        let url = Url::parse(request.url())?;
        let retry_count = self.retry_count();

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.execute_once(request, &url).await {
                Ok(response) => return Ok(response.with_charset(charset.map(str::to_string))),
                Err(err) if err.is_recoverable() && attempt <= retry_count => {
                    warn!(url = %url, attempt, error = %err, "Request failed, retrying");
                }
                Err(err) if err.is_recoverable() && retry_count > 0 => {
                    return Err(Error::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn execute_once(&self, request: &WebRequest, url: &Url) -> Result<WebResponse> {
        let (client, injected) = self.client()?;
        let socket_timeout = self.socket_timeout();
        let mut headers = self.request_headers(request)?;

        if injected && !headers.contains_key(COOKIE) {
            if let Some(cookie) = self.cookie_jar.get_cookie_header(url) {
                let value =
                    HeaderValue::from_str(&cookie).map_err(|e| Error::invalid_header(COOKIE, e))?;
                headers.insert(COOKIE, value);
            }
        }

        let mut builder = client
            .request(request.method().as_method(), url.clone())
            .timeout(socket_timeout);

        builder = match request.entity() {
            RequestEntity::Empty => builder.headers(headers.clone()),
            RequestEntity::Form(form) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    let value = HeaderValue::from_str(&form.content_type())
                        .map_err(|e| Error::invalid_header(CONTENT_TYPE, e))?;
                    headers.insert(CONTENT_TYPE, value);
                }
                builder.headers(headers.clone()).body(form.encode()?)
            }
            RequestEntity::Multipart(parts) => {
                // the boundary is only known to the multipart body
                headers.remove(CONTENT_TYPE);
                let form = build_multipart(parts).await?;
                builder.headers(headers.clone()).multipart(form)
            }
        };

        debug!(method = %request.method(), url = %url, "Request");
        for (name, value) in headers.iter() {
            debug!(header = %name, value = ?value, "Request header");
        }

        let start = Instant::now();
        let (handle, registration) = AbortHandle::new_pair();
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        self.in_flight.insert(id, handle);
        let _guard = InFlight {
            requests: &self.in_flight,
            id,
        };

        let (status, response_headers, final_url, body) =
            match Abortable::new(transfer(builder), registration).await {
                Ok(Ok(parts)) => parts,
                Ok(Err(e)) if e.is_timeout() => {
                    let limit = if e.is_connect() {
                        self.connection_timeout()
                    } else {
                        socket_timeout
                    };
                    return Err(Error::timeout_with_url(
                        "request",
                        limit.as_millis() as u64,
                        url.as_str(),
                    ));
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    debug!(url = %url, "Request aborted");
                    return Err(Error::aborted(url.as_str()));
                }
            };
        let response_time_ms = start.elapsed().as_millis() as u64;

        for (name, value) in response_headers.iter() {
            debug!(header = %name, value = ?value, "Response header");
        }

        if injected {
            for value in response_headers.get_all(SET_COOKIE) {
                if let Ok(header) = value.to_str() {
                    self.cookie_jar.add_from_header(header, &final_url);
                }
            }
        }

        let body = decompress_body(&response_headers, body)?;
        debug!(
            url = %final_url,
            status = %status,
            bytes = body.len(),
            time_ms = response_time_ms,
            "Response"
        );

        let redirected = &final_url != url;
        Ok(WebResponse::new(
            status,
            response_headers,
            body,
            final_url,
            redirected,
            response_time_ms,
        ))
    }
}

/// Removes an abort handle once its request settles or is dropped
struct InFlight<'a> {
    requests: &'a DashMap<u64, AbortHandle>,
    id: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.requests.remove(&self.id);
    }
}

async fn transfer(builder: RequestBuilder) -> reqwest::Result<(StatusCode, HeaderMap, Url, Bytes)> {
    let response = builder.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let url = response.url().clone();
    let body = response.bytes().await?;
    Ok((status, headers, url, body))
}

pub(super) fn http_proxy(proxy: &ProxyConfig) -> Result<Proxy> {
    let invalid = |reason: String| Error::Proxy {
        host: proxy.host.clone(),
        port: proxy.port,
        reason,
    };

    if proxy.host.trim().is_empty() {
        return Err(invalid("empty host".to_string()));
    }
    Proxy::all(format!("http://{}:{}", proxy.host, proxy.port)).map_err(|e| invalid(e.to_string()))
}

#[async_trait]
impl WebBrowser for DefaultWebBrowser {
    async fn execute(&self, request: &WebRequest) -> Result<WebResponse> {
        self.send(request, None).await
    }

    async fn execute_with_charset(
        &self,
        request: &WebRequest,
        charset: &str,
    ) -> Result<WebResponse> {
        self.send(request, Some(charset)).await
    }

    fn headers(&self) -> HashMap<String, String> {
        self.settings.read().default_headers.clone()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.settings
            .read()
            .default_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn add_header(&self, name: &str, value: &str) {
        let mut settings = self.settings.write();
        settings
            .default_headers
            .retain(|n, _| !n.eq_ignore_ascii_case(name));
        settings
            .default_headers
            .insert(name.to_string(), value.to_string());
    }

    fn add_headers(&self, headers: &HashMap<String, String>) {
        for (name, value) in headers {
            self.add_header(name, value);
        }
    }

    fn set_default_headers(&self, headers: HashMap<String, String>) {
        self.settings.write().default_headers.clear();
        self.add_headers(&headers);
    }

    fn retry_count(&self) -> u32 {
        self.settings.read().retry_count
    }

    fn set_retry_count(&self, retry_count: u32) {
        self.settings.write().retry_count = retry_count;
    }

    fn socket_timeout(&self) -> Duration {
        self.settings.read().socket_timeout
    }

    fn set_socket_timeout(&self, timeout: Duration) {
        self.settings.write().socket_timeout = timeout;
    }

    fn connection_timeout(&self) -> Duration {
        self.settings.read().connection_timeout
    }

    fn set_connection_timeout(&self, timeout: Duration) {
        {
            let mut settings = self.settings.write();
            if settings.connection_timeout == timeout {
                return;
            }
            settings.connection_timeout = timeout;
        }
        self.invalidate_client();
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

        self.settings.write().proxy = Some(proxy);
        self.invalidate_client();
        debug!(host, port, "Proxy set");
        Ok(())
    }

    fn clear_proxy(&self) {
        if self.settings.write().proxy.take().is_some() {
            self.invalidate_client();
            debug!("Proxy cleared");
        }
    }

    fn abort(&self) {
        let mut aborted = 0usize;
        for entry in self.in_flight.iter() {
            entry.value().abort();
            aborted += 1;
        }
        debug!(requests = aborted, "Abort requested");
    }
}
