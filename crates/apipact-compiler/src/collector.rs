//! Candidate value extraction per parameter and request-body field

use serde_json::json;

use apipact_core::diagnostics::Diagnostics;
use apipact_core::document::{
    MediaType, Parameter, ParameterLocation, RequestBody, Schema, SpecDocument,
};
use apipact_core::model::BodyEncoding;

use crate::resolver;

/// Where a chosen value is routed when the request is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Query,
    Header,
    Path,
    Body,
}

/// One enumerable parameter or body field with its candidate source.
///
/// `source` is an array of candidate values for parameters, or a single
/// `{name, value}` pair object for body fields — a unit of size one in the
/// combination product.
#[derive(Debug, Clone)]
pub struct CandidateSlot {
    pub kind: SlotKind,
    pub name: String,
    pub source: serde_json::Value,
}

/// Candidate slots for one operation, in fixed group order
/// query → header → path → body, plus the body encoding in effect.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub slots: Vec<CandidateSlot>,
    pub body_encoding: BodyEncoding,
}

/// Extract the candidate set for one operation.
///
/// Parameters without an enumerable value source contribute no slot and are
/// absent from both combination generation and the emitted request.
pub fn collect(
    doc: &SpecDocument,
    parameters: &[Parameter],
    request_body: Option<&RequestBody>,
    operation: &str,
    diags: &mut Diagnostics,
) -> CandidateSet {
    let mut query = Vec::new();
    let mut header = Vec::new();
    let mut path = Vec::new();

    for param in parameters {
        let Some(values) = candidate_values(param) else {
            continue;
        };
        let (bucket, kind) = match param.location {
            ParameterLocation::Query => (&mut query, SlotKind::Query),
            ParameterLocation::Header => (&mut header, SlotKind::Header),
            ParameterLocation::Path => (&mut path, SlotKind::Path),
            ParameterLocation::Cookie => continue,
        };
        bucket.push(CandidateSlot {
            kind,
            name: param.name.clone(),
            source: serde_json::Value::Array(values),
        });
    }

    let (body_encoding, fields) = match request_body {
        Some(body) => collect_body_fields(doc, body, operation, diags),
        None => (BodyEncoding::Default, Vec::new()),
    };

    let mut slots = query;
    slots.append(&mut header);
    slots.append(&mut path);
    for (name, value) in fields {
        slots.push(CandidateSlot {
            kind: SlotKind::Body,
            source: json!({"name": name.clone(), "value": value}),
            name,
        });
    }

    CandidateSet {
        slots,
        body_encoding,
    }
}

/// Candidate list for one parameter: the full `enum` when present (it is
/// the exhaustive domain), otherwise a single example.
fn candidate_values(param: &Parameter) -> Option<Vec<serde_json::Value>> {
    if let Some(schema) = &param.schema {
        if let Some(values) = schema.enum_values() {
            return Some(values.to_vec());
        }
        if let Some(example) = schema.example() {
            return Some(vec![example.clone()]);
        }
    }
    param.example.as_ref().map(|example| vec![example.clone()])
}

/// Extract body fields for the one encoding in effect.
///
/// Exactly one encoding is honored per operation; precedence is
/// `application/json`, then `multipart/form-data`, then `form-data`, then
/// `multipart/x-www-form-urlencoded`.
fn collect_body_fields(
    doc: &SpecDocument,
    body: &RequestBody,
    operation: &str,
    diags: &mut Diagnostics,
) -> (BodyEncoding, Vec<(String, serde_json::Value)>) {
    if let Some(media) = body.content.get("application/json") {
        return (
            BodyEncoding::Json,
            collect_json_fields(doc, media, operation, diags),
        );
    }

    for (key, encoding) in [
        ("multipart/form-data", BodyEncoding::MultipartFormData),
        ("form-data", BodyEncoding::FormData),
        (
            "multipart/x-www-form-urlencoded",
            BodyEncoding::MultipartUrlencoded,
        ),
    ] {
        if let Some(media) = body.content.get(key) {
            return (encoding, collect_form_fields(media, operation, diags));
        }
    }

    (BodyEncoding::Default, Vec::new())
}

/// Form-style fields: properties that declare an `example`.
fn collect_form_fields(
    media: &MediaType,
    operation: &str,
    diags: &mut Diagnostics,
) -> Vec<(String, serde_json::Value)> {
    let Some(Schema::Object(object)) = typed_schema(media, operation, diags) else {
        return Vec::new();
    };
    object
        .properties
        .iter()
        .filter_map(|(name, prop)| prop.example().map(|example| (name.clone(), example.clone())))
        .collect()
}

/// JSON body fields: a top-level `$ref` is dereferenced (with `allOf`
/// flattening) before enumerating, and one nesting level under a property
/// named `payload` flattens into dotted keys.
fn collect_json_fields(
    doc: &SpecDocument,
    media: &MediaType,
    operation: &str,
    diags: &mut Diagnostics,
) -> Vec<(String, serde_json::Value)> {
    let schema = match typed_schema(media, operation, diags) {
        Some(Schema::Reference(reference)) => resolver::dereference(doc, &reference.target, diags),
        other => other,
    };
    let Some(Schema::Object(object)) = schema else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    for (name, prop) in &object.properties {
        if let Some(example) = prop.example() {
            fields.push((name.clone(), example.clone()));
        }
        if name == "payload" {
            if let Schema::Object(payload) = prop {
                for (key, nested) in &payload.properties {
                    if let Some(example) = nested.example() {
                        fields.push((format!("{name}.{key}"), example.clone()));
                    }
                }
            }
        }
    }
    fields
}

fn typed_schema(media: &MediaType, operation: &str, diags: &mut Diagnostics) -> Option<Schema> {
    let raw = media.schema.as_ref()?;
    match serde_json::from_value::<Schema>(raw.clone()) {
        Ok(schema) => Some(schema),
        Err(e) => {
            diags.warn(
                Some(operation),
                format!("request body schema is not traversable: {e}"),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn doc(value: Value) -> SpecDocument {
        SpecDocument::parse(value).unwrap()
    }

    fn empty_doc() -> SpecDocument {
        doc(json!({}))
    }

    fn param(value: Value) -> Parameter {
        serde_json::from_value(value).unwrap()
    }

    fn body(value: Value) -> RequestBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn enum_wins_over_example() {
        let p = param(json!({
            "name": "sort",
            "in": "query",
            "schema": {"type": "string", "enum": ["asc", "desc"], "example": "asc"}
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[p], None, "GET /items", &mut diags);

        assert_eq!(set.slots.len(), 1);
        assert_eq!(set.slots[0].source, json!(["asc", "desc"]));
    }

    #[test]
    fn schema_example_beats_parameter_example() {
        let p = param(json!({
            "name": "limit",
            "in": "query",
            "schema": {"type": "integer", "example": 10},
            "example": 99
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[p], None, "GET /items", &mut diags);

        assert_eq!(set.slots[0].source, json!([10]));
    }

    #[test]
    fn parameter_example_is_the_fallback() {
        let p = param(json!({
            "name": "trace",
            "in": "header",
            "schema": {"type": "string"},
            "example": "abc"
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[p], None, "GET /items", &mut diags);

        assert_eq!(set.slots[0].kind, SlotKind::Header);
        assert_eq!(set.slots[0].source, json!(["abc"]));
    }

    #[test]
    fn parameter_without_values_is_omitted() {
        let p = param(json!({
            "name": "opaque",
            "in": "query",
            "schema": {"type": "string"}
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[p], None, "GET /items", &mut diags);

        assert!(set.slots.is_empty());
    }

    #[test]
    fn cookie_parameter_never_contributes() {
        let p = param(json!({
            "name": "session",
            "in": "cookie",
            "schema": {"type": "string", "example": "s1"}
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[p], None, "GET /items", &mut diags);

        assert!(set.slots.is_empty());
    }

    #[test]
    fn slots_keep_fixed_group_order() {
        let params = vec![
            param(json!({"name": "id", "in": "path", "schema": {"type": "integer", "enum": [1]}})),
            param(json!({"name": "q", "in": "query", "schema": {"type": "string", "example": "x"}})),
            param(json!({"name": "h", "in": "header", "example": "v"})),
        ];
        let rb = body(json!({
            "content": {"application/json": {"schema": {
                "type": "object",
                "properties": {"note": {"type": "string", "example": "hi"}}
            }}}
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &params, Some(&rb), "POST /items", &mut diags);

        let kinds: Vec<SlotKind> = set.slots.iter().map(|slot| slot.kind).collect();
        assert_eq!(
            kinds,
            vec![SlotKind::Query, SlotKind::Header, SlotKind::Path, SlotKind::Body]
        );
    }

    #[test]
    fn json_encoding_takes_precedence() {
        let rb = body(json!({
            "content": {
                "multipart/x-www-form-urlencoded": {"schema": {
                    "type": "object",
                    "properties": {"legacy": {"type": "string", "example": "old"}}
                }},
                "application/json": {"schema": {
                    "type": "object",
                    "properties": {"name": {"type": "string", "example": "new"}}
                }}
            }
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[], Some(&rb), "POST /items", &mut diags);

        assert_eq!(set.body_encoding, BodyEncoding::Json);
        assert_eq!(set.slots.len(), 1);
        assert_eq!(set.slots[0].name, "name");
    }

    #[test]
    fn form_data_fields_need_examples() {
        let rb = body(json!({
            "content": {"form-data": {"schema": {
                "type": "object",
                "properties": {
                    "file": {"type": "string", "example": "a.txt"},
                    "silent": {"type": "string"}
                }
            }}}
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[], Some(&rb), "POST /upload", &mut diags);

        assert_eq!(set.body_encoding, BodyEncoding::FormData);
        assert_eq!(set.slots.len(), 1);
        assert_eq!(set.slots[0].source, json!({"name": "file", "value": "a.txt"}));
    }

    #[test]
    fn json_body_dereferences_top_level_ref() {
        let d = doc(json!({
            "components": {"schemas": {
                "NewItem": {"type": "object", "properties": {
                    "name": {"type": "string", "example": "widget"}
                }}
            }}
        }));
        let rb = body(json!({
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/NewItem"}}}
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&d, &[], Some(&rb), "POST /items", &mut diags);

        assert_eq!(set.slots.len(), 1);
        assert_eq!(set.slots[0].name, "name");
    }

    #[test]
    fn payload_properties_flatten_to_dotted_keys() {
        let rb = body(json!({
            "content": {"application/json": {"schema": {
                "type": "object",
                "properties": {
                    "kind": {"type": "string", "example": "event"},
                    "payload": {"type": "object", "properties": {
                        "amount": {"type": "integer", "example": 5},
                        "silent": {"type": "integer"}
                    }}
                }
            }}}
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[], Some(&rb), "POST /events", &mut diags);

        let names: Vec<&str> = set.slots.iter().map(|slot| slot.name.as_str()).collect();
        assert_eq!(names, vec!["kind", "payload.amount"]);
    }

    #[test]
    fn declared_encoding_survives_empty_fields() {
        let rb = body(json!({
            "content": {"application/json": {"schema": {
                "type": "object",
                "properties": {"name": {"type": "string"}}
            }}}
        }));
        let mut diags = Diagnostics::new();
        let set = collect(&empty_doc(), &[], Some(&rb), "POST /items", &mut diags);

        assert_eq!(set.body_encoding, BodyEncoding::Json);
        assert!(set.slots.is_empty());
    }
}
