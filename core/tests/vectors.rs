//! Verify the pure pipeline (lookup → bind → build) against JSON vectors
//! stored in `test-vectors/`.
//!
//! Each case supplies an endpoint name and caller arguments, and expects
//! either a fully resolved request or a classified error. Request bodies are
//! compared as parsed JSON, not raw strings, so field ordering never causes
//! false negatives.

use restcall_core::{ApiClient, ApiManifest, BindError, InvokeError};

fn client() -> ApiClient<restcall_core::ReqwestTransport> {
    let manifest =
        ApiManifest::from_json(include_str!("../../test-vectors/jsonplaceholder.json")).unwrap();
    ApiClient::new(manifest)
}

fn case_args(case: &serde_json::Value) -> restcall_core::Args {
    case["args"].as_object().unwrap().clone()
}

fn error_kind(err: &InvokeError) -> &'static str {
    match err {
        InvokeError::UnknownEndpoint { .. } => "unknown_endpoint",
        InvokeError::Bind(BindError::MissingRequiredParameter { .. }) => "missing_required",
        InvokeError::Bind(BindError::TypeMismatch { .. }) => "type_mismatch",
        InvokeError::Bind(BindError::UnknownParameter { .. }) => "unknown_parameter",
        other => panic!("unexpected error from prepare: {other}"),
    }
}

#[test]
fn bind_and_build_vectors() {
    let raw = include_str!("../../test-vectors/bind.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let client = client();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = case["endpoint"].as_str().unwrap();
        let result = client.prepare(endpoint, &case_args(case));

        if let Some(expected_error) = case.get("expect_error") {
            let err = result.expect_err(name);
            assert_eq!(error_kind(&err), expected_error.as_str().unwrap(), "{name}");
            continue;
        }

        let expect = &case["expect"];
        let req = result.unwrap_or_else(|err| panic!("{name}: {err}"));
        assert_eq!(req.method.as_str(), expect["method"].as_str().unwrap(), "{name}: method");
        assert_eq!(req.url, expect["url"].as_str().unwrap(), "{name}: url");

        match (&req.body, &expect["body"]) {
            (None, serde_json::Value::Null) => {}
            (Some(body), expected) => {
                assert!(!expected.is_null(), "{name}: unexpected body {body}");
                let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(&parsed, expected, "{name}: body");
                assert!(
                    req.headers.iter().any(|(k, v)| {
                        k.eq_ignore_ascii_case("content-type") && v == "application/json"
                    }),
                    "{name}: content-type"
                );
            }
            (None, expected) => panic!("{name}: expected body {expected}, got none"),
        }
    }
}

#[test]
fn fixture_manifest_loads_and_indexes_every_endpoint() {
    let manifest =
        ApiManifest::from_json(include_str!("../../test-vectors/jsonplaceholder.json")).unwrap();
    assert_eq!(manifest.base_url, "https://jsonplaceholder.typicode.com");
    for endpoint in manifest.endpoints() {
        let found = manifest.endpoint(&endpoint.name).unwrap();
        assert_eq!(found.name, endpoint.name);
    }
    assert!(manifest.endpoint("not_declared").is_none());
}
