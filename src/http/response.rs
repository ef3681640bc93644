//! Response handling and transformation.
//!
//! # Responsibilities
//! - Decide whether an upstream response qualifies for body rewriting
//! - Rewrite the API hostname inside (possibly gzip-compressed) CDN scripts
//! - Keep Content-Length consistent with the new body
//!
//! # Design Decisions
//! - Only 200 responses from the CDN origin are touched; everything else streams through
//! - Qualifying bodies are buffered whole and rewritten in memory
//! - Any failure fails the response; a half-rewritten body is never served

use std::borrow::Cow;
use std::io::{Read, Write};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::config::RewriteConfig;
use crate::error::TransformError;

/// Rewrites the API hostname in qualifying CDN responses.
#[derive(Debug, Clone)]
pub struct ResponseTransformer {
    needle: String,
    replacement: String,
    cdn_authority: String,
}

impl ResponseTransformer {
    pub fn new(config: &RewriteConfig, cdn_authority: impl Into<String>) -> Self {
        Self {
            needle: config.needle.clone(),
            replacement: config.host.clone(),
            cdn_authority: cdn_authority.into(),
        }
    }

    /// Rewriting is off when no replacement host is configured.
    pub fn is_enabled(&self) -> bool {
        !self.replacement.is_empty()
    }

    /// `origin` is the authority the request was forwarded to.
    pub fn qualifies(&self, origin: &str, status: StatusCode) -> bool {
        self.is_enabled() && origin == self.cdn_authority && status == StatusCode::OK
    }

    /// Rewrite the body if the response qualifies, otherwise hand it back untouched.
    pub async fn maybe_transform(
        &self,
        origin: &str,
        response: Response<Body>,
    ) -> Result<Response<Body>, TransformError> {
        if !self.qualifies(origin, response.status()) {
            return Ok(response);
        }

        let (mut parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(TransformError::Read)?;

        // HEAD responses and empty 200s carry nothing to rewrite.
        if bytes.is_empty() {
            return Ok(Response::from_parts(parts, Body::from(bytes)));
        }

        let is_compressed = is_gzip_encoded(&parts.headers)?;
        let rewritten = rewrite_body(&bytes, is_compressed, &self.needle, &self.replacement)?;

        tracing::debug!(
            origin = %origin,
            compressed = is_compressed,
            original_len = bytes.len(),
            rewritten_len = rewritten.len(),
            "Rewrote response body"
        );

        parts.headers.remove(header::TRANSFER_ENCODING);
        parts
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(rewritten.len()));

        Ok(Response::from_parts(parts, Body::from(rewritten)))
    }
}

/// Whether the body is gzip-compressed, per its Content-Encoding.
///
/// Errors on encodings this module cannot undo.
pub fn is_gzip_encoded(headers: &HeaderMap) -> Result<bool, TransformError> {
    let Some(value) = headers.get(header::CONTENT_ENCODING) else {
        return Ok(false);
    };

    let encoding = String::from_utf8_lossy(value.as_bytes())
        .trim()
        .to_ascii_lowercase();
    match encoding.as_str() {
        "" | "identity" => Ok(false),
        "gzip" | "x-gzip" => Ok(true),
        _ => Err(TransformError::UnsupportedEncoding(encoding)),
    }
}

/// Replace every `needle` in `body` with `replacement`, round-tripping gzip when
/// `is_compressed` is set.
pub fn rewrite_body(
    body: &[u8],
    is_compressed: bool,
    needle: &str,
    replacement: &str,
) -> Result<Vec<u8>, TransformError> {
    let plain: Cow<'_, [u8]> = if is_compressed {
        let mut decoded = Vec::new();
        MultiGzDecoder::new(body)
            .read_to_end(&mut decoded)
            .map_err(TransformError::Decompress)?;
        Cow::Owned(decoded)
    } else {
        Cow::Borrowed(body)
    };

    let rewritten = replace_all(&plain, needle.as_bytes(), replacement.as_bytes());
    if !is_compressed {
        return Ok(rewritten);
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&rewritten)
        .map_err(TransformError::Compress)?;
    encoder.finish().map_err(TransformError::Compress)
}

/// Global, non-overlapping, left-to-right literal replacement.
pub fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = rest.windows(needle.len()).position(|w| w == needle) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(replacement);
        rest = &rest[pos + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}
