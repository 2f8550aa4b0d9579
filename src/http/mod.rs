// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP value types for lighthttp
//!
//! Requests, responses, cookies, body decoding and the connection-manager
//! selection handed to the underlying client.

mod connection;
mod cookie;
mod decoding;
mod entity;
mod request;
mod response;

pub use connection::{ConnectionManager, ConnectionManagerFactory, DefaultConnectionManagerFactory};
pub use cookie::{Cookie, CookieJar, SameSite};
pub use decoding::{decode_text, decompress_body, ContentEncoding};
pub use entity::{FormParams, Part, PartBody, RequestEntity};
pub(crate) use entity::build_multipart;
pub use request::{EntityEnclosingWebRequest, RequestMethod, WebRequest};
pub use response::WebResponse;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("lighthttp/", env!("CARGO_PKG_VERSION"));

/// Charset used for form params when none is given
pub const DEFAULT_FORM_CHARSET: &str = "UTF-8";

/// Common MIME types
pub mod mime {
    pub const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const JSON: &str = "application/json";
}

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const ACCEPT_LANGUAGE: &str = "accept-language";
    pub const ACCEPT_ENCODING: &str = "accept-encoding";
    pub const CONTENT_ENCODING: &str = "content-encoding";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const REFERER: &str = "referer";
}
