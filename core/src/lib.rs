//! Manifest-driven REST invocation engine.
//!
//! # Overview
//! Ingests a declarative manifest describing a REST surface (base URL plus
//! named endpoints with typed, located parameters) and exposes one generic
//! entry point: `invoke(endpoint_name, args)`. Each invocation validates
//! and routes arguments by declared location, interpolates the path
//! template, dispatches the request under concurrency/timeout/retry policy,
//! and maps the response into a classified result.
//!
//! # Design
//! - The manifest is validated once at load and immutable thereafter.
//! - Binding and building are pure, synchronous functions; descriptors and
//!   responses are plain data, so everything up to the transport is
//!   deterministic and testable without a network.
//! - The dispatcher is generic over [`Transport`]; production traffic uses
//!   [`ReqwestTransport`], tests use instrumented stubs.
//! - Malformed calls (unknown endpoint, bad arguments) never consume
//!   transport resources.

pub mod binder;
pub mod builder;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod manifest;
pub mod response;
pub mod transport;
pub mod value;

pub use binder::{bind, Args, BoundParams};
pub use builder::build;
pub use client::ApiClient;
pub use dispatch::{DispatchError, DispatchOptions, DispatchPolicy, Dispatcher};
pub use error::{BindError, InvokeError, LoadError, TransportFailure};
pub use http::{HttpMethod, RawResponse, RequestDescriptor};
pub use manifest::{ApiManifest, Endpoint, Param, ParamLocation, ParamType};
pub use response::{Body, Success};
pub use transport::{ReqwestTransport, Transport};
pub use value::Value;
