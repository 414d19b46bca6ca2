//! Parameter binding: validate caller arguments against an endpoint.
//!
//! # Design
//! Binding walks the endpoint's declared parameters in order, so the three
//! output groups keep declaration order and serialization downstream is
//! deterministic. The binder is strict: any argument the endpoint does not
//! declare is an error rather than silently dropped, which catches caller
//! typos before they turn into confusing remote 400s.
//!
//! Pure and synchronous. Safe to call from any number of tasks.

use serde_json::Map;

use crate::error::BindError;
use crate::manifest::{Endpoint, ParamLocation};
use crate::value::Value;

/// Caller arguments: parameter name → dynamic scalar.
pub type Args = Map<String, serde_json::Value>;

/// Validated arguments, split by declared location.
///
/// Order within each group follows the endpoint's parameter declaration
/// order, not the caller's argument order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    pub path: Vec<(String, Value)>,
    pub query: Vec<(String, Value)>,
    pub body: Vec<(String, Value)>,
}

impl BoundParams {
    pub fn path_value(&self, name: &str) -> Option<&Value> {
        self.path.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Validate and partition `args` against the endpoint's declaration.
pub fn bind(endpoint: &Endpoint, args: &Args) -> Result<BoundParams, BindError> {
    for name in args.keys() {
        if !endpoint.params.iter().any(|p| &p.name == name) {
            return Err(BindError::UnknownParameter {
                endpoint: endpoint.name.clone(),
                param: name.clone(),
            });
        }
    }

    let mut bound = BoundParams::default();
    for param in &endpoint.params {
        let raw = match args.get(&param.name) {
            Some(raw) => raw,
            None if param.required => {
                return Err(BindError::MissingRequiredParameter {
                    endpoint: endpoint.name.clone(),
                    param: param.name.clone(),
                });
            }
            // Optional and absent: omitted entirely, no default substituted.
            None => continue,
        };

        let value = Value::coerce(param.ty, raw).ok_or_else(|| BindError::TypeMismatch {
            endpoint: endpoint.name.clone(),
            param: param.name.clone(),
            expected: param.ty.as_str(),
            actual: raw.clone(),
        })?;

        let group = match param.location {
            ParamLocation::Path => &mut bound.path,
            ParamLocation::Query => &mut bound.query,
            ParamLocation::Body => &mut bound.body,
        };
        group.push((param.name.clone(), value));
    }

    Ok(bound)
}
