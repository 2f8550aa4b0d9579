// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bodies of entity-enclosing requests: url-encoded forms and multipart parts

use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::multipart::{Form, Part as MultipartPart};

use super::decoding::encoding_for_label;
use super::{mime, DEFAULT_FORM_CHARSET};
use crate::error::{Error, Result};

/// Body carried by a POST or PUT request.
///
/// Form params and multipart parts are mutually exclusive: writing to one
/// group discards the other.
#[derive(Debug, Clone, Default)]
pub enum RequestEntity {
    /// No body
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` body
    Form(FormParams),
    /// `multipart/form-data` body
    Multipart(Vec<Part>),
}

impl RequestEntity {
    /// Form params, switching the entity to a form if needed
    pub fn form_mut(&mut self) -> &mut FormParams {
        if !matches!(self, RequestEntity::Form(_)) {
            *self = RequestEntity::Form(FormParams::default());
        }
        match self {
            RequestEntity::Form(form) => form,
            _ => unreachable!("entity was just set to a form"),
        }
    }

    /// Multipart parts, switching the entity to multipart if needed
    pub fn parts_mut(&mut self) -> &mut Vec<Part> {
        if !matches!(self, RequestEntity::Multipart(_)) {
            *self = RequestEntity::Multipart(Vec::new());
        }
        match self {
            RequestEntity::Multipart(parts) => parts,
            _ => unreachable!("entity was just set to multipart"),
        }
    }

    /// Add or replace a part by name
    pub fn put_part(&mut self, part: Part) {
        let parts = self.parts_mut();
        match parts.iter_mut().find(|p| p.name == part.name) {
            Some(existing) => *existing = part,
            None => parts.push(part),
        }
    }

    /// Check if there is nothing to send
    pub fn is_empty(&self) -> bool {
        match self {
            RequestEntity::Empty => true,
            RequestEntity::Form(form) => form.is_empty(),
            RequestEntity::Multipart(parts) => parts.is_empty(),
        }
    }
}

/// Url-encoded form fields with the charset used to encode them
#[derive(Debug, Clone)]
pub struct FormParams {
    params: Vec<(String, String)>,
    charset: String,
}

impl Default for FormParams {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            charset: DEFAULT_FORM_CHARSET.to_string(),
        }
    }
}

impl FormParams {
    /// Set a field, replacing an earlier value of the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.params.push((name, value)),
        }
    }

    /// Field value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Charset the fields are encoded in
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Change the charset for all fields
    pub fn set_charset(&mut self, charset: impl Into<String>) {
        self.charset = charset.into();
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if there are no fields
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Encode as an `application/x-www-form-urlencoded` body.
    ///
    /// Names and values are converted to the form charset before
    /// percent-encoding; spaces become `+`.
    pub fn encode(&self) -> Result<String> {
        let encoding = encoding_for_label(&self.charset)?;
        let mut body = String::new();
        for (name, value) in &self.params {
            if !body.is_empty() {
                body.push('&');
            }
            let (name, _, _) = encoding.encode(name);
            let (value, _, _) = encoding.encode(value);
            body.extend(form_urlencoded::byte_serialize(&name));
            body.push('=');
            body.extend(form_urlencoded::byte_serialize(&value));
        }
        Ok(body)
    }

    /// `Content-Type` header value for the encoded body
    pub fn content_type(&self) -> String {
        format!("{}; charset={}", mime::FORM_URL_ENCODED, self.charset)
    }
}

/// A named multipart part
#[derive(Debug, Clone)]
pub struct Part {
    /// Form field name
    pub name: String,
    /// Part content
    pub body: PartBody,
}

/// Content of a multipart part
#[derive(Debug, Clone)]
pub enum PartBody {
    /// File read when the request is sent
    File {
        path: PathBuf,
        mime: String,
        charset: Option<String>,
        file_name: Option<String>,
    },
    /// In-memory bytes
    Bytes {
        data: Bytes,
        mime: String,
        file_name: Option<String>,
    },
    /// Text encoded in `charset`
    Text {
        text: String,
        charset: Option<String>,
    },
}

impl Part {
    /// File part; the file name reported to the server defaults to the
    /// last path component
    pub fn file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        mime: Option<&str>,
        charset: Option<&str>,
        file_name: Option<&str>,
    ) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = file_name.map(str::to_string).or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
        });
        Self {
            name: name.into(),
            body: PartBody::File {
                path,
                mime: mime.unwrap_or(mime::OCTET_STREAM).to_string(),
                charset: charset.map(str::to_string),
                file_name,
            },
        }
    }

    /// Binary part
    pub fn bytes(
        name: impl Into<String>,
        data: impl Into<Bytes>,
        mime: Option<&str>,
        file_name: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            body: PartBody::Bytes {
                data: data.into(),
                mime: mime.unwrap_or(mime::OCTET_STREAM).to_string(),
                file_name: file_name.map(str::to_string),
            },
        }
    }

    /// `text/plain` part
    pub fn text(name: impl Into<String>, text: impl Into<String>, charset: Option<&str>) -> Self {
        Self {
            name: name.into(),
            body: PartBody::Text {
                text: text.into(),
                charset: charset.map(str::to_string),
            },
        }
    }

    async fn into_multipart(self) -> Result<(String, MultipartPart)> {
        let name = self.name;
        let part = match self.body {
            PartBody::File {
                path,
                mime,
                charset,
                file_name,
            } => {
                let data = tokio::fs::read(&path)
                    .await
                    .map_err(|e| Error::multipart(&name, format!("{}: {}", path.display(), e)))?;
                let mime = match charset {
                    Some(charset) => format!("{}; charset={}", mime, charset),
                    None => mime,
                };
                with_file_name(MultipartPart::bytes(data), file_name)
                    .mime_str(&mime)
                    .map_err(|e| Error::multipart(&name, e))?
            }
            PartBody::Bytes {
                data,
                mime,
                file_name,
            } => with_file_name(MultipartPart::bytes(data.to_vec()), file_name)
                .mime_str(&mime)
                .map_err(|e| Error::multipart(&name, e))?,
            PartBody::Text { text, charset } => {
                let charset = charset.as_deref().unwrap_or(DEFAULT_FORM_CHARSET);
                let encoding = encoding_for_label(charset)?;
                let (encoded, _, _) = encoding.encode(&text);
                MultipartPart::bytes(encoded.into_owned())
                    .mime_str(&format!("{}; charset={}", mime::TEXT_PLAIN, charset))
                    .map_err(|e| Error::multipart(&name, e))?
            }
        };
        Ok((name, part))
    }
}

fn with_file_name(part: MultipartPart, file_name: Option<String>) -> MultipartPart {
    match file_name {
        Some(file_name) => part.file_name(file_name),
        None => part,
    }
}

/// Build a multipart form from parts, reading file parts from disk
pub(crate) async fn build_multipart(parts: &[Part]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts.iter().cloned() {
        let (name, part) = part.into_multipart().await?;
        form = form.part(name, part);
    }
    Ok(form)
}
