//! Request handling and transformation.
//!
//! # Responsibilities
//! - Turn the inbound request into the request sent upstream
//! - Strip hop-by-hop headers, record the caller in X-Forwarded-For
//! - Point the URI and Host header at the chosen upstream
//!
//! # Design Decisions
//! - Body is streamed through untouched
//! - Outbound requests always speak HTTP/1.1 to the upstream

use std::net::IpAddr;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Version};

use crate::error::ProxyError;
use crate::routing::OutboundTarget;

/// Headers that describe a single connection and must not be forwarded.
pub const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in listed {
        headers.remove(name.as_str());
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

/// Append the caller's address to X-Forwarded-For.
pub fn append_forwarded_for(headers: &mut HeaderMap, client: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        client.to_string()
    } else {
        format!("{}, {}", prior.join(", "), client)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR.clone(), value);
    }
}

/// Limit Accept-Encoding to what the body rewriter can undo.
///
/// Keeps `gzip` if the caller accepts it, otherwise asks for identity.
pub fn restrict_accept_encoding(headers: &mut HeaderMap) {
    let accepts_gzip = headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(accepts_gzip_token);

    if accepts_gzip {
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    } else {
        headers.remove(header::ACCEPT_ENCODING);
    }
}

fn accepts_gzip_token(token: &str) -> bool {
    let mut params = token.split(';');
    let coding = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !matches!(coding.as_str(), "gzip" | "x-gzip" | "*") {
        return false;
    }

    // q=0 means "not acceptable".
    params
        .filter_map(|p| p.trim().strip_prefix("q="))
        .all(|q| q.trim().parse::<f32>().map(|q| q > 0.0).unwrap_or(false))
}

/// Build the request sent to `target` from the inbound request.
pub fn build_outbound_request(
    request: Request<Body>,
    target: &OutboundTarget,
    client: Option<IpAddr>,
    restrict_encoding: bool,
) -> Result<Request<Body>, ProxyError> {
    let (mut parts, body) = request.into_parts();

    strip_hop_by_hop(&mut parts.headers);
    if let Some(client) = client {
        append_forwarded_for(&mut parts.headers, client);
    }
    if restrict_encoding {
        restrict_accept_encoding(&mut parts.headers);
    }

    parts.uri = target.uri()?;
    let host = HeaderValue::from_str(target.host_header()).map_err(axum::http::Error::from)?;
    parts.headers.insert(header::HOST, host);
    parts.version = Version::HTTP_11;

    Ok(Request::from_parts(parts, body))
}
