//! # Delivery Handler
//!
//! Serves one resource per request, in this order:
//!
//! 1. Strip the mount prefix and normalize to a leading `/`.
//! 2. Look the path up; `/` falls back to `/index.html`, then `/index.htm`.
//!    Anything else unresolved is a 404.
//! 3. Set `content-type` (by extension), `cache-control: no-cache` and
//!    `etag` (the hex content digest, unquoted).
//! 4. If `If-None-Match` equals the etag exactly, answer 304 with no body.
//! 5. Negotiate the encoding from `Accept-Encoding`: `br` is preferred over
//!    `gzip`, which is preferred over identity. Only the presence of a token
//!    matters; order and quality values are not considered.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{
    ACCEPT_ENCODING, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_TYPE, ETAG, IF_NONE_MATCH,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use assetpack_bundle::{Bundle, Resource};
use percent_encoding::percent_decode_str;

use crate::error::ServeError;
use crate::mime::content_type;
use crate::state::ServeState;

/// Resources tried, in order, for the root path.
pub const INDEX_DOCUMENTS: [&str; 2] = ["/index.html", "/index.htm"];

/// Response encoding chosen by negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Brotli,
    Gzip,
    Identity,
}

impl Encoding {
    /// Pick the encoding for an `Accept-Encoding` header value.
    pub fn negotiate(accept: Option<&HeaderValue>) -> Self {
        let accept = accept
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();
        if accept.contains("br") {
            Self::Brotli
        } else if accept.contains("gzip") {
            Self::Gzip
        } else {
            Self::Identity
        }
    }

    /// `Content-Encoding` value, `None` for identity.
    pub fn content_encoding(self) -> Option<&'static str> {
        match self {
            Self::Brotli => Some("br"),
            Self::Gzip => Some("gzip"),
            Self::Identity => None,
        }
    }
}

/// Map a request path to a resource name.
///
/// The path is percent-decoded. `prefix` is removed when the path equals it
/// or continues with `/` after it.
pub fn resolve_path(prefix: &str, path: &str) -> String {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let decoded: &str = &decoded;
    let stripped = match decoded.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
        _ => decoded,
    };
    if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{stripped}")
    }
}

/// Resolve a normalized path, applying the index-document fallback.
pub fn lookup<'b>(bundle: &'b Bundle, path: &str) -> Option<&'b Arc<Resource>> {
    bundle.get(path).or_else(|| {
        if path == "/" {
            INDEX_DOCUMENTS.iter().find_map(|name| bundle.get(name))
        } else {
            None
        }
    })
}

/// Fallback handler serving the bundle.
pub async fn serve(
    State(state): State<ServeState>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServeError> {
    let path = resolve_path(state.prefix(), uri.path());
    let Some(resource) = lookup(state.bundle(), &path).cloned() else {
        tracing::debug!(path = %path, "no resource");
        return Err(ServeError::NotFound(path));
    };

    let etag = HeaderValue::from_str(resource.sha256_hex())
        .map_err(|e| ServeError::Internal(format!("{}: bad etag: {e}", resource.name())))?;
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(content_type(resource.name())),
    );
    response_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response_headers.insert(ETAG, etag.clone());

    if headers.get(IF_NONE_MATCH) == Some(&etag) {
        return Ok((StatusCode::NOT_MODIFIED, response_headers).into_response());
    }

    let encoding = Encoding::negotiate(headers.get(ACCEPT_ENCODING));
    let body = encoded_bytes(resource, encoding).await?;
    if let Some(value) = encoding.content_encoding() {
        response_headers.insert(CONTENT_ENCODING, HeaderValue::from_static(value));
    }
    tracing::trace!(path = %path, ?encoding, bytes = body.len(), "serving");

    Ok((StatusCode::OK, response_headers, Body::from(body)).into_response())
}

/// Fetch the requested form off the async runtime; a first derivation may
/// run brotli at maximum quality.
async fn encoded_bytes(resource: Arc<Resource>, encoding: Encoding) -> Result<Bytes, ServeError> {
    let bytes = tokio::task::spawn_blocking(move || match encoding {
        Encoding::Brotli => resource.brotli(),
        Encoding::Gzip => resource.gzip(),
        Encoding::Identity => resource.unpacked(),
    })
    .await
    .map_err(|e| ServeError::Internal(format!("encoding task failed: {e}")))??;
    Ok(bytes)
}
