//! Request construction from bound parameters.
//!
//! # Design
//! By the time `build` runs, loading has proven every path placeholder has a
//! matching required path parameter and binding has proven every required
//! value is present and typed. Construction therefore has no failure path:
//! it is pure string assembly plus JSON serialization of already-typed
//! values.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::binder::BoundParams;
use crate::http::RequestDescriptor;
use crate::manifest::Endpoint;

/// Everything outside the RFC 3986 unreserved set gets percent-encoded.
/// Conservative on purpose: valid for both path segments and query values.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, URL_ENCODE_SET).to_string()
}

/// Substitute `{name}` placeholders with encoded path values.
///
/// A placeholder with no bound value cannot occur for a validated manifest
/// (load-time correspondence check + required binding); if it ever did, the
/// placeholder is left verbatim rather than panicking mid-invocation.
fn resolve_path(template: &str, bound: &BoundParams) -> String {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        resolved.push_str(&rest[..open]);
        let name = &rest[open + 1..open + close];
        match bound.path_value(name) {
            Some(value) => resolved.push_str(&encode(&value.render())),
            None => resolved.push_str(&rest[open..open + close + 1]),
        }
        rest = &rest[open + close + 1..];
    }
    resolved.push_str(rest);
    resolved
}

/// Produce the fully resolved request descriptor for one invocation.
pub fn build(endpoint: &Endpoint, base_url: &str, bound: &BoundParams) -> RequestDescriptor {
    let path = resolve_path(&endpoint.path, bound);

    let query = bound
        .query
        .iter()
        .map(|(name, value)| format!("{}={}", encode(name), encode(&value.render())))
        .collect::<Vec<_>>()
        .join("&");

    let url = if query.is_empty() {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}{path}?{query}")
    };

    let (headers, body) = if bound.body.is_empty() {
        (Vec::new(), None)
    } else {
        let payload: serde_json::Map<String, serde_json::Value> = bound
            .body
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        (
            vec![("content-type".to_string(), "application/json".to_string())],
            Some(serde_json::Value::Object(payload).to_string()),
        )
    };

    RequestDescriptor {
        method: endpoint.method,
        url,
        headers,
        body,
    }
}
