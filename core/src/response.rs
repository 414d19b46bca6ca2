//! Response mapping: raw transport output → structured outcome.
//!
//! # Design
//! Pure classification on plain data, mirroring the builder on the other
//! side of the transport. The content-type header decides whether a 2xx
//! body is decoded as JSON or passed through as text; scalar and array
//! JSON bodies are as valid as objects.

use crate::error::InvokeError;
use crate::http::RawResponse;

/// Decoded response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(serde_json::Value),
    Text(String),
}

impl Body {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Json(_) => None,
        }
    }
}

/// A successful invocation outcome.
#[derive(Debug, Clone)]
pub struct Success {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

/// Classify a raw response into the caller-visible result.
pub fn map(raw: RawResponse) -> Result<Success, InvokeError> {
    match raw.status {
        200..=299 => {
            let is_json = raw
                .header("content-type")
                .is_some_and(|ct| ct.contains("json"));
            let body = if is_json && !raw.body.is_empty() {
                match serde_json::from_str(&raw.body) {
                    Ok(value) => Body::Json(value),
                    Err(err) => return Err(InvokeError::Decode(err.to_string())),
                }
            } else {
                // Non-JSON content, or a 204-style empty body.
                Body::Text(raw.body)
            };
            Ok(Success {
                status: raw.status,
                headers: raw.headers,
                body,
            })
        }
        400..=499 => Err(InvokeError::Client {
            status: raw.status,
            body: raw.body,
        }),
        // 1xx/3xx land here too: the taxonomy has no bucket of their own
        // and the default transport resolves redirects before the mapper
        // sees one, so anything that is neither success nor caller error
        // carries the server-error class with the status preserved.
        _ => Err(InvokeError::Server {
            status: raw.status,
            body: raw.body,
        }),
    }
}
