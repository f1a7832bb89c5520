//! Request assembly and expected-response table construction

use std::collections::BTreeMap;

use apipact_core::config::Config;
use apipact_core::diagnostics::Diagnostics;
use apipact_core::document::{Operation, Parameter, Schema, SpecDocument};
use apipact_core::model::{ComponentsBag, ExpectedResponse, RequestModel};
use apipact_core::plan::{CompilePlan, OperationPlan, Validation, ValidationStatus, validate_config};

use crate::collector::{self, CandidateSet, SlotKind};
use crate::combination;
use crate::resolver;

/// Compile a specification document into an ordered request sequence.
///
/// One RequestModel per element of each operation's combination product.
/// Failures are isolated: a bad combination source drops only its own
/// operation, and a response-table failure leaves that operation's requests
/// in place with a partial contract table. Both are recorded in `diags`.
pub fn compile(doc: &SpecDocument, diags: &mut Diagnostics) -> Vec<RequestModel> {
    let mut requests = Vec::new();

    for (path, item) in doc.paths() {
        for (method, operation) in item.operations() {
            let label = format!("{method} {path}");
            let parameters = merged_parameters(&item.parameters, operation);

            let candidates = collector::collect(
                doc,
                &parameters,
                operation.request_body.as_ref(),
                &label,
                diags,
            );
            let combos = match combination::combinations(&candidates.slots) {
                Ok(combos) => combos,
                Err(e) => {
                    diags.error(Some(&label), e.to_string());
                    continue;
                }
            };

            // Built once per operation; every combination shares the table.
            let expected = expected_responses(doc, operation, &label, diags);

            for combo in combos {
                requests.push(build_request(
                    path,
                    method,
                    &label,
                    &candidates,
                    &combo,
                    expected.clone(),
                ));
            }
        }
    }

    requests
}

/// Path-level parameters first, operation-level after.
fn merged_parameters(path_level: &[Parameter], operation: &Operation) -> Vec<Parameter> {
    let mut parameters = path_level.to_vec();
    parameters.extend(operation.parameters.iter().cloned());
    parameters
}

/// Build the status → contract table for one operation.
///
/// Only status codes whose response declares an `application/json` body
/// schema appear. A status whose schema cannot be processed is recorded and
/// skipped; it never blocks this operation's requests, its other contracts,
/// or any other operation.
fn expected_responses(
    doc: &SpecDocument,
    operation: &Operation,
    label: &str,
    diags: &mut Diagnostics,
) -> BTreeMap<u16, ExpectedResponse> {
    let mut table = BTreeMap::new();

    for (status_key, response) in &operation.responses {
        // `default` and friends have no numeric code to match at validation time
        let Ok(code) = status_key.parse::<u16>() else {
            continue;
        };
        let Some(media) = response
            .content
            .as_ref()
            .and_then(|content| content.get("application/json"))
        else {
            continue;
        };
        let Some(raw_schema) = media.schema.as_ref() else {
            continue;
        };

        match serde_json::from_value::<Schema>(raw_schema.clone()) {
            Ok(schema) => {
                let schemas = resolver::closure(doc, &schema, label, diags);
                table.insert(
                    code,
                    ExpectedResponse {
                        code,
                        schema: raw_schema.clone(),
                        components: ComponentsBag { schemas },
                    },
                );
            }
            Err(e) => {
                diags.error(
                    Some(label),
                    format!("response processing failed for status {code}: {e}"),
                );
            }
        }
    }

    table
}

/// Assemble one RequestModel from a chosen combination.
///
/// Values are routed by slot identity: path tokens are substituted by
/// parameter name, never by position.
fn build_request(
    path: &str,
    method: &str,
    label: &str,
    candidates: &CandidateSet,
    combination: &[serde_json::Value],
    expected: BTreeMap<u16, ExpectedResponse>,
) -> RequestModel {
    let mut request = RequestModel {
        operation: label.to_string(),
        path: path.to_string(),
        method: method.to_string(),
        query_parameters: BTreeMap::new(),
        headers: BTreeMap::new(),
        body: BTreeMap::new(),
        body_encoding: candidates.body_encoding,
        expected_responses: expected,
    };

    for (slot, value) in candidates.slots.iter().zip(combination) {
        match slot.kind {
            SlotKind::Query => {
                request
                    .query_parameters
                    .insert(slot.name.clone(), value.clone());
            }
            SlotKind::Header => {
                request.headers.insert(slot.name.clone(), value.clone());
            }
            SlotKind::Path => {
                let token = format!("{{{}}}", slot.name);
                request.path = request.path.replace(&token, &path_segment(value));
            }
            SlotKind::Body => {
                let field_value = value
                    .get("value")
                    .cloned()
                    .unwrap_or(serde_json::Value::Null);
                request.body.insert(slot.name.clone(), field_value);
            }
        }
    }

    request
}

/// Path tokens substitute the bare string form, not the JSON-quoted one.
fn path_segment(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Describe what [`compile`] would emit, without assembling the suite.
#[must_use]
pub fn build_plan(doc: &SpecDocument, config: &Config) -> CompilePlan {
    let mut diags = Diagnostics::new();
    let mut operations = Vec::new();
    let mut total_requests: u64 = 0;
    let mut validations = validate_config(config);

    for (path, item) in doc.paths() {
        for (method, operation) in item.operations() {
            let label = format!("{method} {path}");
            let parameters = merged_parameters(&item.parameters, operation);
            let candidates = collector::collect(
                doc,
                &parameters,
                operation.request_body.as_ref(),
                &label,
                &mut diags,
            );

            let requests = match combination::cardinality(&candidates.slots) {
                Ok(count) => count,
                Err(e) => {
                    validations.push(Validation {
                        check: "combinations".into(),
                        status: ValidationStatus::Error,
                        message: format!("{label}: {e}"),
                    });
                    0
                }
            };
            total_requests += requests;

            let mut parameter_names = Vec::new();
            let mut body_fields = Vec::new();
            for slot in &candidates.slots {
                match slot.kind {
                    SlotKind::Body => body_fields.push(slot.name.clone()),
                    _ => parameter_names.push(slot.name.clone()),
                }
            }

            let documented_statuses: Vec<u16> = operation
                .responses
                .iter()
                .filter(|(_, response)| {
                    response
                        .content
                        .as_ref()
                        .and_then(|content| content.get("application/json"))
                        .and_then(|media| media.schema.as_ref())
                        .is_some()
                })
                .filter_map(|(status, _)| status.parse().ok())
                .collect();

            operations.push(OperationPlan {
                operation: label,
                method: method.to_string(),
                path: path.clone(),
                requests,
                parameters: parameter_names,
                body_fields,
                documented_statuses,
            });
        }
    }

    validations.push(Validation {
        check: "spec_parse".into(),
        status: if operations.is_empty() {
            ValidationStatus::Error
        } else {
            ValidationStatus::Ok
        },
        message: format!("spec parsed: {} operations found", operations.len()),
    });

    CompilePlan {
        operations,
        total_requests,
        validations,
    }
}
