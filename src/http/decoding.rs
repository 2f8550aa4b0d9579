// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response body decoding: content-encoding and charsets

use std::io::Read;

use bytes::Bytes;
use encoding_rs::Encoding;
use flate2::read::{GzDecoder, ZlibDecoder};
use reqwest::header::HeaderMap;

use super::headers::CONTENT_ENCODING;
use crate::error::{Error, Result};

/// Content codings the browser can undo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    /// gzip / x-gzip
    Gzip,
    /// zlib-wrapped deflate
    Deflate,
    /// No transformation
    Identity,
}

impl ContentEncoding {
    /// Pick the coding to undo from the `Content-Encoding` header.
    ///
    /// The header is a comma separated list; gzip wins when present,
    /// matching how servers that stack codings are seen in practice.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut found = ContentEncoding::Identity;
        for value in headers.get_all(CONTENT_ENCODING) {
            let Ok(value) = value.to_str() else { continue };
            for codec in value.split(',').map(str::trim) {
                if codec.eq_ignore_ascii_case("gzip") || codec.eq_ignore_ascii_case("x-gzip") {
                    return ContentEncoding::Gzip;
                }
                if codec.eq_ignore_ascii_case("deflate") {
                    found = ContentEncoding::Deflate;
                }
            }
        }
        found
    }

    fn name(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Deflate => "deflate",
            ContentEncoding::Identity => "identity",
        }
    }
}

/// Undo the content coding announced in `headers`
pub fn decompress_body(headers: &HeaderMap, body: Bytes) -> Result<Bytes> {
    let encoding = ContentEncoding::from_headers(headers);
    if body.is_empty() {
        return Ok(body);
    }

    let mut out = Vec::with_capacity(body.len() * 2);
    let read = match encoding {
        ContentEncoding::Identity => return Ok(body),
        ContentEncoding::Gzip => GzDecoder::new(body.as_ref()).read_to_end(&mut out),
        ContentEncoding::Deflate => ZlibDecoder::new(body.as_ref()).read_to_end(&mut out),
    };

    read.map_err(|e| Error::Decompression {
        encoding: encoding.name().to_string(),
        reason: e.to_string(),
    })?;

    Ok(Bytes::from(out))
}

/// Extract the `charset` parameter of a Content-Type value
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Look up an encoding by label
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnsupportedCharset(label.to_string()))
}

/// Decode `body` as text in the given charset, UTF-8 when none is given.
///
/// Malformed sequences are replaced rather than rejected.
pub fn decode_text(body: &[u8], charset: Option<&str>) -> Result<String> {
    let encoding = match charset {
        Some(label) => encoding_for_label(label)?,
        None => encoding_rs::UTF_8,
    };
    let (text, _, _) = encoding.decode(body);
    Ok(text.into_owned())
}
