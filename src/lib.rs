// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # lighthttp - Stateful HTTP facade
//!
//! A small browser-like layer over `reqwest`: default headers, a cookie
//! jar, retries, timeouts, proxy settings, gzip/deflate bodies, charset
//! aware text decoding and url-encoded or multipart request bodies.
//!
//! ## Features
//!
//! - [`DefaultWebBrowser`]: one client, built lazily and rebuilt when
//!   connection settings change
//! - [`ThreadLocalWebBrowser`]: independent browser per thread
//! - [`MultiThreadWebBrowser`]: per-thread browsers with shared settings
//!   and one cookie jar
//! - [`WebRequest`] / [`EntityEnclosingWebRequest`]: query params, form
//!   fields in any charset, file/text/bytes parts
//! - [`WebResponse`]: decompressed body, headers, decoded text
//!
//! ## Example
//!
//! ```rust,no_run
//! use lighthttp::{DefaultWebBrowser, EntityEnclosingWebRequest, WebBrowser};
//!
//! #[tokio::main]
//! async fn main() -> lighthttp::Result<()> {
//!     let browser = DefaultWebBrowser::new();
//!     browser.add_header("Accept-Language", "en-US");
//!
//!     let page = browser.get("https://example.com").await?;
//!     println!("{} {}", page.response_code(), page.text()?);
//!
//!     let mut login = EntityEnclosingWebRequest::post("https://example.com/login");
//!     login.add_form_param("user", "alice").add_form_param("password", "secret");
//!     login.set_referer_from(&page);
//!
//!     let response = browser.execute(&login).await?;
//!     for cookie in browser.cookies() {
//!         println!("{}={}", cookie.name, cookie.value);
//!     }
//!     println!("{}", response.response_code());
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod error;
pub mod http;

// Browsers
pub use browser::{
    BrowserConfig, DefaultWebBrowser, MultiThreadWebBrowser, ThreadLocalWebBrowser, WebBrowser,
};

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{
    ConnectionManager, ConnectionManagerFactory, Cookie, CookieJar,
    DefaultConnectionManagerFactory, EntityEnclosingWebRequest, Part, RequestMethod, WebRequest,
    WebResponse,
};

/// lighthttp version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
