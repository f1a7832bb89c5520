//! Compiled request suite — the interchange format handed to the harness
//!
//! A [`RequestModel`] is everything a generic HTTP client needs to dispatch
//! one test case, plus the expected-response contracts its response will be
//! checked against. The suite is built once, then iterated; nothing in it is
//! mutated after compilation, so any number of concurrent dispatchers can
//! share it read-only.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;

/// How the request body must be encoded at dispatch time.
///
/// Tags mirror the content-type keys of the source document; `default`
/// marks an operation without a recognized body encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BodyEncoding {
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "form-data")]
    FormData,
    #[serde(rename = "multipart/form-data")]
    MultipartFormData,
    #[serde(rename = "multipart/x-www-form-urlencoded")]
    MultipartUrlencoded,
    #[default]
    #[serde(rename = "default")]
    Default,
}

impl BodyEncoding {
    /// The wire tag, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormData => "form-data",
            Self::MultipartFormData => "multipart/form-data",
            Self::MultipartUrlencoded => "multipart/x-www-form-urlencoded",
            Self::Default => "default",
        }
    }
}

/// One executable test request with its expected-response contracts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RequestModel {
    /// Operation label with the unsubstituted template, e.g. "GET /items/{id}"
    pub operation: String,
    /// Request path with every `{name}` token substituted
    pub path: String,
    /// Upper-case HTTP method
    pub method: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query_parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, serde_json::Value>,
    /// Flat body object; nested payload fields use dotted keys
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub body: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub body_encoding: BodyEncoding,
    /// Status code → contract, for every declared code with a JSON body schema
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expected_responses: BTreeMap<u16, ExpectedResponse>,
}

impl RequestModel {
    /// The contract for an observed status code, if one is documented.
    #[must_use]
    pub fn expected_response(&self, status: u16) -> Option<&ExpectedResponse> {
        self.expected_responses.get(&status)
    }
}

/// Expected response for one status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedResponse {
    /// Numeric status code
    pub code: u16,
    /// Schema exactly as declared; may still contain `$ref`
    pub schema: serde_json::Value,
    /// Transitive closure of referenced schemas, resolved
    pub components: ComponentsBag,
}

/// Resolved schemas keyed by reference name, shaped so that internal
/// `#/components/schemas/…` pointers resolve when the bag is grafted onto
/// the schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentsBag {
    #[serde(default)]
    pub schemas: BTreeMap<String, serde_json::Value>,
}

/// Complete output of one compilation pass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompiledSuite {
    /// Ordered request sequence; each entry is one independent test case
    pub requests: Vec<RequestModel>,
    /// Diagnostics recorded while compiling
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate the JSON Schema of the compiled-suite interchange format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(CompiledSuite);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_request() -> RequestModel {
        RequestModel {
            operation: "GET /items/{id}".into(),
            path: "/items/1".into(),
            method: "GET".into(),
            query_parameters: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: BTreeMap::new(),
            body_encoding: BodyEncoding::Default,
            expected_responses: BTreeMap::from([(
                200,
                ExpectedResponse {
                    code: 200,
                    schema: json!({"$ref": "#/components/schemas/Item"}),
                    components: ComponentsBag {
                        schemas: BTreeMap::from([(
                            "Item".to_string(),
                            json!({"type": "object", "properties": {"name": {"type": "string"}}}),
                        )]),
                    },
                },
            )]),
        }
    }

    #[test]
    fn body_encoding_round_trip() {
        let tags = [
            (BodyEncoding::Json, "\"application/json\""),
            (BodyEncoding::FormData, "\"form-data\""),
            (BodyEncoding::MultipartFormData, "\"multipart/form-data\""),
            (
                BodyEncoding::MultipartUrlencoded,
                "\"multipart/x-www-form-urlencoded\"",
            ),
            (BodyEncoding::Default, "\"default\""),
        ];
        for (encoding, expected) in tags {
            assert_eq!(serde_json::to_string(&encoding).unwrap(), expected);
            let back: BodyEncoding = serde_json::from_str(expected).unwrap();
            assert_eq!(back, encoding);
        }
    }

    #[test]
    fn expected_response_lookup() {
        let request = sample_request();
        assert_eq!(request.expected_response(200).unwrap().code, 200);
        assert!(request.expected_response(404).is_none());
    }

    #[test]
    fn request_serialization_round_trip() {
        let request = sample_request();
        let text = serde_json::to_string(&request).unwrap();
        let back: RequestModel = serde_json::from_str(&text).unwrap();
        assert_eq!(back.path, "/items/1");
        assert_eq!(back.expected_responses.len(), 1);
        assert!(
            back.expected_responses[&200]
                .components
                .schemas
                .contains_key("Item")
        );
    }

    #[test]
    fn empty_maps_are_omitted_from_serialization() {
        let request = RequestModel {
            operation: "GET /health".into(),
            path: "/health".into(),
            method: "GET".into(),
            query_parameters: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: BTreeMap::new(),
            body_encoding: BodyEncoding::Default,
            expected_responses: BTreeMap::new(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("query_parameters").is_none());
        assert!(value.get("expected_responses").is_none());
    }

    #[test]
    fn schema_generation_produces_valid_json() {
        let schema = generate_schema();
        let parsed: serde_json::Value = serde_json::from_str(&schema).unwrap();
        assert_eq!(
            parsed.get("title").and_then(|v| v.as_str()),
            Some("CompiledSuite")
        );
    }
}
