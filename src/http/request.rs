// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request value objects

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;

use super::entity::{FormParams, Part, RequestEntity};
use super::response::WebResponse;
use super::headers::REFERER;
use super::{mime, DEFAULT_FORM_CHARSET};
use crate::error::Result;

/// Request methods the browser issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    /// Check if requests of this method carry a body
    pub fn is_entity_enclosing(&self) -> bool {
        matches!(self, RequestMethod::Post | RequestMethod::Put)
    }

    /// Method understood by the HTTP client
    pub fn as_method(&self) -> Method {
        match self {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
            RequestMethod::Put => Method::PUT,
            RequestMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

/// An outgoing request: method, URL, per-request headers and an optional
/// body.
///
/// Headers set here override the browser's default headers of the same
/// name for this request only. The URL is validated when the request is
/// sent.
#[derive(Debug, Clone)]
pub struct WebRequest {
    method: RequestMethod,
    url: String,
    headers: HashMap<String, String>,
    entity: RequestEntity,
}

impl WebRequest {
    /// Create a request with an arbitrary method
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            entity: RequestEntity::Empty,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    /// Create a DELETE request
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, url)
    }

    /// Request method
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// Request URL, including any params added so far
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the request URL
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    /// Headers sent with this request only
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Value of a request header, matched case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any header whose name differs only in case
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.headers.retain(|n, _| !n.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// Set several headers
    pub fn add_headers<K, V>(&mut self, headers: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.add_header(name, value);
        }
        self
    }

    /// Set the `Referer` header
    pub fn set_referer(&mut self, referer: impl Into<String>) -> &mut Self {
        self.add_header(REFERER, referer)
    }

    /// Use the URL of a previous response as `Referer`
    pub fn set_referer_from(&mut self, response: &WebResponse) -> &mut Self {
        self.set_referer(response.url().as_str())
    }

    /// Params encoded in the URL query string.
    ///
    /// Empty when the URL has no query.
    pub fn request_params(&self) -> HashMap<String, String> {
        let without_fragment = self.url.split('#').next().unwrap_or("");
        match without_fragment.split_once('?') {
            Some((_, query)) => form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => HashMap::new(),
        }
    }

    /// Add a request param.
    ///
    /// GET and DELETE requests carry params in the query string; POST and
    /// PUT requests carry them as url-encoded form fields in the body.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        if self.method.is_entity_enclosing() {
            self.entity.form_mut().insert(name, value);
        } else {
            self.append_query(&name, &value);
        }
        self
    }

    /// Add several request params, see [`WebRequest::add_param`]
    pub fn add_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.add_param(name, value);
        }
        self
    }

    fn append_query(&mut self, name: &str, value: &str) {
        let (base, fragment) = match self.url.split_once('#') {
            Some((base, fragment)) => (base.to_string(), Some(fragment.to_string())),
            None => (self.url.clone(), None),
        };

        let mut url = base;
        if !url.contains('?') {
            url.push('?');
        } else if !url.ends_with('?') && !url.ends_with('&') {
            url.push('&');
        }
        url.extend(form_urlencoded::byte_serialize(name.as_bytes()));
        url.push('=');
        url.extend(form_urlencoded::byte_serialize(value.as_bytes()));

        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(&fragment);
        }
        self.url = url;
    }

    /// Body of the request
    pub fn entity(&self) -> &RequestEntity {
        &self.entity
    }

    pub(crate) fn entity_mut(&mut self) -> &mut RequestEntity {
        &mut self.entity
    }

    /// Builder form of [`WebRequest::add_header`]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    /// Builder form of [`WebRequest::add_param`]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_param(name, value);
        self
    }

    /// Builder form of [`WebRequest::set_referer`]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.set_referer(referer);
        self
    }
}

/// A POST or PUT request carrying either url-encoded form params or
/// multipart parts.
///
/// The group written last wins: adding a part drops all form params and
/// adding a form param drops all parts.
#[derive(Debug, Clone)]
pub struct EntityEnclosingWebRequest {
    request: WebRequest,
}

impl EntityEnclosingWebRequest {
    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            request: WebRequest::new(RequestMethod::Post, url),
        }
    }

    /// Create a PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self {
            request: WebRequest::new(RequestMethod::Put, url),
        }
    }

    /// Form params, if the body is a form
    pub fn form_params(&self) -> Option<&FormParams> {
        match self.request.entity() {
            RequestEntity::Form(form) => Some(form),
            _ => None,
        }
    }

    /// Charset form params are encoded in
    pub fn form_params_charset(&self) -> &str {
        self.form_params()
            .map(FormParams::charset)
            .unwrap_or(DEFAULT_FORM_CHARSET)
    }

    /// Add a url-encoded form field
    pub fn add_form_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.request.entity_mut().form_mut().insert(name, value);
        self
    }

    /// Add url-encoded form fields
    pub fn add_form_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let form = self.request.entity_mut().form_mut();
        for (name, value) in params {
            form.insert(name, value);
        }
        self
    }

    /// Add url-encoded form fields and set the charset for the whole form
    pub fn add_form_params_with_charset<K, V>(
        &mut self,
        params: impl IntoIterator<Item = (K, V)>,
        charset: impl Into<String>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.add_form_params(params);
        self.request.entity_mut().form_mut().set_charset(charset);
        self
    }

    /// Add a prepared part, replacing a part of the same name
    pub fn add_part(&mut self, part: Part) -> &mut Self {
        self.request.entity_mut().put_part(part);
        self
    }

    /// Add a file part; the file is read when the request is sent.
    ///
    /// MIME type defaults to `application/octet-stream` and the reported
    /// file name to the last path component.
    pub fn add_file_part(
        &mut self,
        part_name: impl Into<String>,
        path: impl AsRef<Path>,
        mime: Option<&str>,
        charset: Option<&str>,
        file_name: Option<&str>,
    ) -> &mut Self {
        self.add_part(Part::file(part_name, path, mime, charset, file_name))
    }

    /// Add a part with the full content of `reader`
    pub fn add_reader_part(
        &mut self,
        part_name: impl Into<String>,
        mut reader: impl Read,
        mime: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<&mut Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(self.add_part(Part::bytes(part_name, data, mime, file_name)))
    }

    /// Add a `text/plain` part
    pub fn add_text_part(
        &mut self,
        part_name: impl Into<String>,
        text: impl Into<String>,
        charset: Option<&str>,
    ) -> &mut Self {
        self.add_part(Part::text(part_name, text, charset))
    }

    /// Add a binary part
    pub fn add_bytes_part(
        &mut self,
        part_name: impl Into<String>,
        data: impl Into<Bytes>,
        mime: Option<&str>,
        file_name: Option<&str>,
    ) -> &mut Self {
        self.add_part(Part::bytes(part_name, data, mime, file_name))
    }

    /// Add a part holding `value` serialized as JSON
    pub fn add_json_part<T: Serialize>(
        &mut self,
        part_name: impl Into<String>,
        value: &T,
        file_name: Option<&str>,
    ) -> Result<&mut Self> {
        let data = serde_json::to_vec(value)?;
        Ok(self.add_part(Part::bytes(part_name, data, Some(mime::JSON), file_name)))
    }

    /// Multipart parts in the order they were added
    pub fn parts(&self) -> &[Part] {
        match self.request.entity() {
            RequestEntity::Multipart(parts) => parts,
            _ => &[],
        }
    }

    /// Builder form of [`WebRequest::add_header`]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.add_header(name, value);
        self
    }

    /// Builder form of [`EntityEnclosingWebRequest::add_form_param`]
    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_form_param(name, value);
        self
    }

    /// Builder form of [`EntityEnclosingWebRequest::add_part`]
    pub fn part(mut self, part: Part) -> Self {
        self.add_part(part);
        self
    }

    /// Unwrap into the plain request
    pub fn into_inner(self) -> WebRequest {
        self.request
    }
}

impl Deref for EntityEnclosingWebRequest {
    type Target = WebRequest;

    fn deref(&self) -> &Self::Target {
        &self.request
    }
}

impl DerefMut for EntityEnclosingWebRequest {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.request
    }
}

impl From<EntityEnclosingWebRequest> for WebRequest {
    fn from(request: EntityEnclosingWebRequest) -> Self {
        request.request
    }
}
