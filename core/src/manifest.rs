//! Manifest model: loading, validation, endpoint lookup.
//!
//! # Design
//! Loading is two-phase. A `Raw*` serde layer accepts exactly the manifest
//! wire format (unknown fields ignored for forward compatibility, missing
//! required fields rejected by serde), then `ApiManifest::from_json`
//! validates every structural invariant and produces the typed model, or a
//! `LoadError` naming the offending endpoint/parameter. A partially valid
//! manifest is never observable.
//!
//! The validated `ApiManifest` is immutable: share it across tasks behind an
//! `Arc` and swap in a whole new instance if a reload is ever needed.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;

use crate::error::LoadError;
use crate::http::HttpMethod;

/// Declared type of a parameter. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Integer,
    String,
    Boolean,
    Number,
}

impl ParamType {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "integer" => Some(ParamType::Integer),
            "string" => Some(ParamType::String),
            "boolean" => Some(ParamType::Boolean),
            "number" => Some(ParamType::Number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
            ParamType::Number => "number",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter lands in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Body,
}

impl ParamLocation {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "body" => Some(ParamLocation::Body),
            _ => None,
        }
    }
}

/// One declared parameter of an endpoint.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: ParamType,
    pub location: ParamLocation,
    pub required: bool,
    /// Informational only, never validated.
    pub description: String,
}

/// One named, invocable operation.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub description: String,
    pub method: HttpMethod,
    /// Path template with zero or more `{param}` placeholders.
    pub path: String,
    pub params: Vec<Param>,
}

/// Validated, immutable API definition.
#[derive(Debug)]
pub struct ApiManifest {
    pub name: String,
    /// Absolute URL, trailing slash stripped at load.
    pub base_url: String,
    pub description: String,
    endpoints: Vec<Endpoint>,
    /// Name → index into `endpoints`, built once at load.
    index: HashMap<String, usize>,
}

// Wire format. Unknown fields are deliberately not denied.
#[derive(Deserialize)]
struct RawManifest {
    name: String,
    base_url: String,
    #[serde(default)]
    description: String,
    endpoints: Vec<RawEndpoint>,
}

#[derive(Deserialize)]
struct RawEndpoint {
    name: String,
    #[serde(default)]
    description: String,
    method: String,
    path: String,
    #[serde(default)]
    params: Vec<RawParam>,
}

#[derive(Deserialize)]
struct RawParam {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    location: String,
    required: bool,
    #[serde(default)]
    description: String,
    // A `default` field appears in some manifests; the engine never
    // substitutes defaults, so it is accepted and ignored.
}

/// Collect the `{name}` placeholders of a path template, in order.
fn placeholders(path: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        found.push(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
    }
    found
}

impl ApiManifest {
    /// Load and fully validate a manifest from its JSON source.
    pub fn from_json(source: &str) -> Result<ApiManifest, LoadError> {
        let raw: RawManifest = serde_json::from_str(source)?;

        let base_url = raw.base_url.trim_end_matches('/').to_string();
        match url::Url::parse(&base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(LoadError::InvalidBaseUrl { url: raw.base_url });
            }
        }

        let mut endpoints = Vec::with_capacity(raw.endpoints.len());
        let mut index = HashMap::with_capacity(raw.endpoints.len());
        for raw_ep in raw.endpoints {
            let endpoint = validate_endpoint(raw_ep)?;
            if index.contains_key(&endpoint.name) {
                return Err(LoadError::DuplicateEndpoint {
                    name: endpoint.name,
                });
            }
            index.insert(endpoint.name.clone(), endpoints.len());
            endpoints.push(endpoint);
        }

        Ok(ApiManifest {
            name: raw.name,
            base_url,
            description: raw.description,
            endpoints,
            index,
        })
    }

    /// O(1) lookup of an endpoint by its invocation name.
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.index.get(name).map(|&i| &self.endpoints[i])
    }

    /// All endpoints in declaration order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }
}

fn validate_endpoint(raw: RawEndpoint) -> Result<Endpoint, LoadError> {
    let method = HttpMethod::parse(&raw.method).ok_or_else(|| LoadError::UnknownMethod {
        endpoint: raw.name.clone(),
        method: raw.method.clone(),
    })?;

    let mut params = Vec::with_capacity(raw.params.len());
    let mut seen = HashSet::new();
    for raw_param in raw.params {
        if !seen.insert(raw_param.name.clone()) {
            return Err(LoadError::DuplicateParameter {
                endpoint: raw.name,
                param: raw_param.name,
            });
        }
        let ty = ParamType::parse(&raw_param.ty).ok_or_else(|| LoadError::UnknownType {
            endpoint: raw.name.clone(),
            param: raw_param.name.clone(),
            ty: raw_param.ty.clone(),
        })?;
        let location =
            ParamLocation::parse(&raw_param.location).ok_or_else(|| LoadError::UnknownLocation {
                endpoint: raw.name.clone(),
                param: raw_param.name.clone(),
                location: raw_param.location.clone(),
            })?;
        if location == ParamLocation::Path && !raw_param.required {
            return Err(LoadError::OptionalPathParameter {
                endpoint: raw.name,
                param: raw_param.name,
            });
        }
        params.push(Param {
            name: raw_param.name,
            ty,
            location,
            required: raw_param.required,
            description: raw_param.description,
        });
    }

    // Placeholder ↔ path-param correspondence, both directions.
    let holes = placeholders(&raw.path);
    for hole in &holes {
        let matches = params
            .iter()
            .find(|p| p.name == *hole && p.location == ParamLocation::Path);
        if matches.is_none() {
            return Err(LoadError::UnboundPlaceholder {
                endpoint: raw.name,
                placeholder: (*hole).to_string(),
            });
        }
    }
    for param in &params {
        if param.location == ParamLocation::Path && !holes.contains(&param.name.as_str()) {
            return Err(LoadError::UnusedPathParameter {
                endpoint: raw.name,
                param: param.name.clone(),
            });
        }
    }

    Ok(Endpoint {
        name: raw.name,
        description: raw.description,
        method,
        path: raw.path,
        params,
    })
}
