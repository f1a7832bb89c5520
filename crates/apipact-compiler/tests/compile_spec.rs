//! End-to-end: compile a spec into requests, then validate bodies against
//! the emitted contracts.
//!
//! Run with: cargo test -p apipact-compiler --test compile_spec

use apipact_core::diagnostics::Diagnostics;
use apipact_core::document::SpecDocument;
use apipact_compiler::validator::{ContractCheck, check_response};
use apipact_compiler::{compile, validate_body};
use serde_json::json;

fn items_spec() -> SpecDocument {
    SpecDocument::parse(json!({
        "openapi": "3.0.0",
        "info": {"title": "Items", "version": "1.0"},
        "paths": {
            "/items/{id}": {
                "get": {
                    "parameters": [{
                        "name": "id",
                        "in": "path",
                        "schema": {"type": "integer", "enum": [1, 2]}
                    }],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": {"application/json": {"schema": {
                                "$ref": "#/components/schemas/Item"
                            }}}
                        }
                    }
                }
            }
        },
        "components": {"schemas": {
            "Item": {
                "type": "object",
                "required": ["name"],
                "properties": {"name": {"type": "string"}}
            }
        }}
    }))
    .unwrap()
}

#[test]
fn enum_path_parameter_expands_to_one_request_per_value() {
    let mut diags = Diagnostics::new();
    let requests = compile(&items_spec(), &mut diags);

    assert_eq!(requests.len(), 2);
    let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/items/1", "/items/2"]);
    assert!(requests.iter().all(|r| r.method == "GET"));
    assert!(requests.iter().all(|r| !r.path.contains('{')));
    assert!(diags.is_empty());
}

#[test]
fn every_request_carries_the_resolved_contract() {
    let mut diags = Diagnostics::new();
    let requests = compile(&items_spec(), &mut diags);

    for request in &requests {
        let expected = request.expected_response(200).expect("200 contract");
        assert_eq!(expected.code, 200);
        let item = expected
            .components
            .schemas
            .get("Item")
            .expect("Item resolved in components bag");
        assert_eq!(item["type"], "object");
    }
}

#[test]
fn compiled_contract_validates_bodies_both_ways() {
    let mut diags = Diagnostics::new();
    let requests = compile(&items_spec(), &mut diags);
    let expected = requests[0].expected_response(200).unwrap();

    let ok = validate_body(expected, &json!({"name": "x"}));
    assert!(ok.valid);

    let bad = validate_body(expected, &json!({}));
    assert!(!bad.valid);
    assert!(
        bad.violations
            .iter()
            .any(|v| v.keyword == "required" && v.message.contains("name"))
    );
}

#[test]
fn observed_status_without_contract_is_a_gap() {
    let mut diags = Diagnostics::new();
    let requests = compile(&items_spec(), &mut diags);

    let check = check_response(&requests[0].expected_responses, 503, &json!({}));
    assert_eq!(check, ContractCheck::Undocumented { status: 503 });
}

#[test]
fn broken_operation_never_blocks_its_siblings() {
    let doc = SpecDocument::parse(json!({
        "paths": {
            "/alpha": {"get": {
                "parameters": [{
                    "name": "mode", "in": "query",
                    "schema": {"type": "string", "enum": ["a", "b"]}
                }],
                "responses": {"200": {"content": {"application/json": {"schema": {
                    "type": "object", "properties": {"ok": {"type": "boolean"}}
                }}}}}
            }},
            "/broken": {"get": {"responses": {
                "200": {"content": {"application/json": {"schema": false}}}
            }}},
            "/omega": {"get": {"responses": {"200": {"description": "no schema"}}}}
        }
    }))
    .unwrap();

    let mut diags = Diagnostics::new();
    let requests = compile(&doc, &mut diags);

    // alpha (before) is complete
    let alpha: Vec<_> = requests
        .iter()
        .filter(|r| r.operation == "GET /alpha")
        .collect();
    assert_eq!(alpha.len(), 2);
    assert!(alpha.iter().all(|r| r.expected_responses.contains_key(&200)));

    // broken still emits, with an empty table, and the failure is recorded
    let broken: Vec<_> = requests
        .iter()
        .filter(|r| r.operation == "GET /broken")
        .collect();
    assert_eq!(broken.len(), 1);
    assert!(broken[0].expected_responses.is_empty());
    assert!(diags.has_errors());

    // omega (after) is present
    assert!(requests.iter().any(|r| r.operation == "GET /omega"));
}
