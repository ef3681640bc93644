//! Path and query reconstruction for outbound requests.

const SHORT_SDK_PREFIX: &str = "/a.js/v1";
const CANONICAL_SDK_PREFIX: &str = "/analytics.js/v1";
const SHORT_BUNDLE_NAME: &str = "a.min.js";
const CANONICAL_BUNDLE_NAME: &str = "analytics.min.js";

/// Join a base path and a request path with exactly one slash between them.
pub fn single_joining_slash(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Expand the short SDK path forms to the ones the CDN serves.
///
/// The bundle rewrite is gated on the path ending in `a.min.js` but replaces
/// the first occurrence of that literal, wherever it is.
pub fn rewrite_path_aliases(path: &str) -> String {
    let mut path = if path.starts_with(SHORT_SDK_PREFIX) {
        path.replacen(SHORT_SDK_PREFIX, CANONICAL_SDK_PREFIX, 1)
    } else {
        path.to_string()
    };

    if path.ends_with(SHORT_BUNDLE_NAME) {
        path = path.replacen(SHORT_BUNDLE_NAME, CANONICAL_BUNDLE_NAME, 1);
    }

    path
}

/// Combine the upstream's preset query with the caller's query.
pub fn merge_query(target: &str, request: &str) -> String {
    if target.is_empty() || request.is_empty() {
        format!("{}{}", target, request)
    } else {
        format!("{}&{}", target, request)
    }
}
