//! Response-body validation against compiled expected-response contracts
//!
//! The components bag is grafted onto the schema document so internal
//! `#/components/schemas/…` pointers resolve locally. Validation runs under
//! JSON Schema draft 2019-09 with format assertions enabled; JSON types must
//! already match the schema's declared types — nothing is coerced.

use std::collections::BTreeMap;

use jsonschema::error::{ValidationError, ValidationErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::json;

use apipact_core::model::ExpectedResponse;

/// One schema violation, addressable for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON pointer into the response body ("" for the root)
    pub path: String,
    /// The schema keyword that failed, e.g. "required", "type"
    pub keyword: String,
    pub message: String,
}

/// Verdict plus structured violations for one body/contract pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

/// Outcome of checking one observed response against the contract table.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractCheck {
    /// A contract exists for the status; the body was validated against it.
    Validated(ValidationReport),
    /// No documented contract for this status code — a reportable gap, not
    /// a fatal error.
    Undocumented { status: u16 },
}

/// Look up the contract for an observed status code and validate the body.
#[must_use]
pub fn check_response(
    table: &BTreeMap<u16, ExpectedResponse>,
    status: u16,
    body: &serde_json::Value,
) -> ContractCheck {
    match table.get(&status) {
        Some(expected) => ContractCheck::Validated(validate_body(expected, body)),
        None => ContractCheck::Undocumented { status },
    }
}

/// Validate a response body against `{schema, components}`.
///
/// Never panics: a schema that cannot be compiled (e.g. a reference whose
/// resolution failed at compile time) reports a missing-schema gap.
#[must_use]
pub fn validate_body(expected: &ExpectedResponse, body: &serde_json::Value) -> ValidationReport {
    let schema_document = assemble(expected);

    let validator = match jsonschema::options()
        .with_draft(jsonschema::Draft::Draft201909)
        .should_validate_formats(true)
        .build(&schema_document)
    {
        Ok(validator) => validator,
        Err(e) => {
            return ValidationReport {
                valid: false,
                violations: vec![Violation {
                    path: String::new(),
                    keyword: "schema".into(),
                    message: format!("expected-response schema cannot be compiled: {e}"),
                }],
            };
        }
    };

    let violations: Vec<Violation> = validator
        .iter_errors(body)
        .map(|error| Violation {
            path: error.instance_path().as_str().to_string(),
            keyword: keyword_of(&error).to_string(),
            message: error.to_string(),
        })
        .collect();

    ValidationReport {
        valid: violations.is_empty(),
        violations,
    }
}

/// Graft the resolved components onto the schema so its internal pointers
/// resolve within one document.
fn assemble(expected: &ExpectedResponse) -> serde_json::Value {
    let mut document = expected.schema.clone();
    if let serde_json::Value::Object(map) = &mut document {
        map.insert(
            "components".into(),
            json!({"schemas": expected.components.schemas}),
        );
    }
    document
}

fn keyword_of(error: &ValidationError<'_>) -> &'static str {
    match error.kind() {
        ValidationErrorKind::Required { .. } => "required",
        ValidationErrorKind::Type { .. } => "type",
        ValidationErrorKind::Enum { .. } => "enum",
        ValidationErrorKind::Constant { .. } => "const",
        ValidationErrorKind::Format { .. } => "format",
        ValidationErrorKind::Pattern { .. } => "pattern",
        ValidationErrorKind::MinLength { .. } => "minLength",
        ValidationErrorKind::MaxLength { .. } => "maxLength",
        ValidationErrorKind::Minimum { .. } => "minimum",
        ValidationErrorKind::Maximum { .. } => "maximum",
        ValidationErrorKind::MinItems { .. } => "minItems",
        ValidationErrorKind::MaxItems { .. } => "maxItems",
        ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
        _ => "schema",
    }
}
