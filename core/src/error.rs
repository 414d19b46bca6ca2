//! Error taxonomy for the invocation engine.
//!
//! # Design
//! Three tiers, matching who is at fault:
//! - `LoadError`: the manifest is structurally invalid. Fatal; the engine
//!   never starts on a broken manifest.
//! - `BindError`: the caller supplied bad arguments. Surfaced immediately,
//!   before any network activity, and never retried.
//! - `InvokeError`: everything the caller of `invoke` can observe, including
//!   bind failures and the transport-level outcomes that remain after the
//!   dispatcher's retry policy is exhausted.
//!
//! Every variant names the endpoint/parameter concerned so callers can fix
//! their manifest or arguments without digging through logs.

use thiserror::Error;

/// Manifest failed to load or validate.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("base_url {url:?} is not an absolute http(s) URL")]
    InvalidBaseUrl { url: String },

    #[error("duplicate endpoint name {name:?}")]
    DuplicateEndpoint { name: String },

    #[error("endpoint {endpoint:?}: unknown method {method:?}")]
    UnknownMethod { endpoint: String, method: String },

    #[error("endpoint {endpoint:?}, parameter {param:?}: unknown type {ty:?}")]
    UnknownType {
        endpoint: String,
        param: String,
        ty: String,
    },

    #[error("endpoint {endpoint:?}, parameter {param:?}: unknown location {location:?}")]
    UnknownLocation {
        endpoint: String,
        param: String,
        location: String,
    },

    #[error("endpoint {endpoint:?}: duplicate parameter name {param:?}")]
    DuplicateParameter { endpoint: String, param: String },

    #[error("endpoint {endpoint:?}: path placeholder {{{placeholder}}} has no matching required path parameter")]
    UnboundPlaceholder {
        endpoint: String,
        placeholder: String,
    },

    #[error("endpoint {endpoint:?}: path parameter {param:?} must be required")]
    OptionalPathParameter { endpoint: String, param: String },

    #[error("endpoint {endpoint:?}: path parameter {param:?} does not appear in the path template")]
    UnusedPathParameter { endpoint: String, param: String },
}

/// Caller-supplied arguments failed validation against the endpoint.
#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    #[error("endpoint {endpoint:?}: required parameter {param:?} not provided")]
    MissingRequiredParameter { endpoint: String, param: String },

    #[error("endpoint {endpoint:?}: parameter {param:?} expected {expected} but got {actual}")]
    TypeMismatch {
        endpoint: String,
        param: String,
        expected: &'static str,
        actual: serde_json::Value,
    },

    #[error("endpoint {endpoint:?}: unknown parameter {param:?}")]
    UnknownParameter { endpoint: String, param: String },
}

/// The transport could not produce an HTTP response at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportFailure {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl TransportFailure {
    /// Timeouts and connection failures may succeed on a fresh attempt;
    /// a malformed response will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportFailure::Timeout | TransportFailure::Connection(_))
    }
}

/// Final outcome of one invocation, as seen by the caller.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("unknown endpoint {name:?}")]
    UnknownEndpoint { name: String },

    #[error(transparent)]
    Bind(#[from] BindError),

    /// 4xx from the service. Never retried.
    #[error("client error: HTTP {status}: {body}")]
    Client { status: u16, body: String },

    /// 5xx from the service, after retries were exhausted.
    #[error("server error: HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// Network-level failure, after retries were exhausted.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportFailure),

    /// 2xx response whose declared-JSON body could not be decoded.
    #[error("response body could not be decoded: {0}")]
    Decode(String),

    /// The caller-supplied overall deadline elapsed.
    #[error("invocation deadline exceeded")]
    Timeout,

    /// The invocation was cancelled while in flight.
    #[error("invocation cancelled")]
    Cancelled,
}
