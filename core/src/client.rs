//! The generic `invoke` entry point.
//!
//! # Design
//! `ApiClient` composes the pure pipeline (lookup → bind → build) with the
//! dispatcher and response mapper. The pure half is exposed separately as
//! `prepare`, so callers and tests can inspect exactly what would go on the
//! wire without any I/O.
//!
//! One client per manifest. The manifest is immutable behind an `Arc`, so a
//! client (and its clones, which share the concurrency ceiling) can serve
//! any number of concurrent invocations without coordination. Hot-reload
//! means building a new `ApiClient` around a new manifest, never mutating
//! the existing one.

use std::sync::Arc;

use tracing::debug;

use crate::binder::{self, Args};
use crate::builder;
use crate::dispatch::{DispatchError, DispatchOptions, DispatchPolicy, Dispatcher};
use crate::error::InvokeError;
use crate::http::RequestDescriptor;
use crate::manifest::ApiManifest;
use crate::response::{self, Success};
use crate::transport::{ReqwestTransport, Transport};

/// Manifest-driven invoker: one generic entry point keyed by endpoint name
/// instead of one generated method per endpoint.
#[derive(Debug)]
pub struct ApiClient<T: Transport> {
    manifest: Arc<ApiManifest>,
    dispatcher: Dispatcher<T>,
}

impl<T: Transport + Clone> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            manifest: Arc::clone(&self.manifest),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl ApiClient<ReqwestTransport> {
    /// Production client with the default transport and policy.
    pub fn new(manifest: ApiManifest) -> Self {
        Self::with_transport(manifest, ReqwestTransport::new(), DispatchPolicy::default())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(manifest: ApiManifest, transport: T, policy: DispatchPolicy) -> Self {
        Self {
            manifest: Arc::new(manifest),
            dispatcher: Dispatcher::new(transport, policy),
        }
    }

    pub fn manifest(&self) -> &ApiManifest {
        &self.manifest
    }

    /// The pure half of an invocation: resolve the endpoint, validate the
    /// arguments, and produce the request that would be sent. No I/O.
    pub fn prepare(&self, endpoint_name: &str, args: &Args) -> Result<RequestDescriptor, InvokeError> {
        let endpoint =
            self.manifest
                .endpoint(endpoint_name)
                .ok_or_else(|| InvokeError::UnknownEndpoint {
                    name: endpoint_name.to_string(),
                })?;
        let bound = binder::bind(endpoint, args)?;
        Ok(builder::build(endpoint, &self.manifest.base_url, &bound))
    }

    /// Invoke an endpoint by name with dynamic arguments.
    ///
    /// Validation failures surface before any network activity; transport
    /// and server failures surface after the dispatcher's retry policy is
    /// exhausted.
    pub async fn invoke(&self, endpoint_name: &str, args: &Args) -> Result<Success, InvokeError> {
        self.invoke_with(endpoint_name, args, &DispatchOptions::default())
            .await
    }

    /// `invoke` with a caller-supplied overall deadline and/or cancellation
    /// token.
    pub async fn invoke_with(
        &self,
        endpoint_name: &str,
        args: &Args,
        options: &DispatchOptions,
    ) -> Result<Success, InvokeError> {
        let request = self.prepare(endpoint_name, args)?;
        debug!(endpoint = endpoint_name, method = %request.method, url = %request.url, "invoking");

        let raw = self
            .dispatcher
            .dispatch(&request, options)
            .await
            .map_err(|err| match err {
                DispatchError::Transport(failure) => InvokeError::Transport(failure),
                DispatchError::DeadlineExceeded => InvokeError::Timeout,
                DispatchError::Cancelled => InvokeError::Cancelled,
            })?;

        response::map(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use serde_json::json;

    const MANIFEST: &str = r#"{
        "name": "Posts",
        "base_url": "https://jsonplaceholder.typicode.com",
        "endpoints": [
            {"name": "get_post", "method": "GET", "path": "/posts/{id}", "params": [
                {"name": "id", "type": "integer", "location": "path", "required": true}
            ]},
            {"name": "list_posts", "method": "GET", "path": "/posts", "params": [
                {"name": "_limit", "type": "integer", "location": "query", "required": false},
                {"name": "_page", "type": "integer", "location": "query", "required": false}
            ]}
        ]
    }"#;

    fn client() -> ApiClient<ReqwestTransport> {
        ApiClient::new(ApiManifest::from_json(MANIFEST).unwrap())
    }

    fn args(pairs: &[(&str, serde_json::Value)]) -> Args {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn prepare_resolves_path_and_query() {
        let req = client().prepare("get_post", &args(&[("id", json!(5))])).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://jsonplaceholder.typicode.com/posts/5");

        let req = client()
            .prepare("list_posts", &args(&[("_limit", json!(10))]))
            .unwrap();
        assert_eq!(req.url, "https://jsonplaceholder.typicode.com/posts?_limit=10");
    }

    #[test]
    fn prepare_without_args_omits_query_string() {
        let req = client().prepare("list_posts", &Args::new()).unwrap();
        assert_eq!(req.url, "https://jsonplaceholder.typicode.com/posts");
    }

    #[test]
    fn unknown_endpoint_is_rejected_before_binding() {
        let err = client().prepare("delete_everything", &Args::new()).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::UnknownEndpoint { name } if name == "delete_everything"
        ));
    }

    #[test]
    fn bind_errors_pass_through() {
        let err = client().prepare("get_post", &Args::new()).unwrap_err();
        assert!(matches!(err, InvokeError::Bind(_)));
    }
}
