//! `$ref` resolution — pointer walking, transitive closure, `allOf` flattening

use std::collections::{BTreeMap, BTreeSet};

use apipact_core::diagnostics::Diagnostics;
use apipact_core::document::{ObjectSchema, Schema, SpecDocument};

/// Guard against circular `$ref` chains during dereferencing.
const MAX_DEPTH: u32 = 20;

/// A reference whose pointer walk left the document.
#[derive(Debug, thiserror::Error)]
#[error("unresolved reference {reference}: missing segment `{segment}`")]
pub struct UnresolvedReference {
    pub reference: String,
    pub segment: String,
}

/// Collect every `$ref` reachable from a schema node, deduplicated in
/// discovery order.
#[must_use]
pub fn collect_refs(schema: &Schema) -> Vec<String> {
    let mut refs = Vec::new();
    let mut seen = BTreeSet::new();
    collect_into(schema, &mut refs, &mut seen);
    refs
}

fn collect_into(schema: &Schema, refs: &mut Vec<String>, seen: &mut BTreeSet<String>) {
    match schema {
        Schema::Reference(reference) => {
            if seen.insert(reference.target.clone()) {
                refs.push(reference.target.clone());
            }
        }
        Schema::Composite(composite) => {
            for branch in &composite.branches {
                collect_into(branch, refs, seen);
            }
        }
        Schema::Object(object) => {
            for property in object.properties.values() {
                collect_into(property, refs, seen);
            }
        }
        Schema::Array(array) => collect_into(&array.items, refs, seen),
        Schema::Primitive(_) => {}
    }
}

/// Resolve a `#/…` pointer against the raw document, segment by segment.
///
/// # Errors
///
/// Returns [`UnresolvedReference`] naming the first missing segment. The
/// caller records a diagnostic and moves on; one bad reference never aborts
/// the pass.
pub fn resolve_pointer<'a>(
    doc: &'a SpecDocument,
    reference: &str,
) -> Result<&'a serde_json::Value, UnresolvedReference> {
    let mut node = doc.raw();
    for segment in reference
        .trim_start_matches('#')
        .split('/')
        .filter(|segment| !segment.is_empty())
    {
        node = node.get(segment).ok_or_else(|| UnresolvedReference {
            reference: reference.to_string(),
            segment: segment.to_string(),
        })?;
    }
    Ok(node)
}

/// Transitive closure of every schema reachable from `schema`, resolved and
/// keyed by terminal reference name.
///
/// References inside resolved targets are chased until the worklist drains.
/// A reference that fails to resolve is reported and left out of the bag;
/// validation against it later reports a gap instead of crashing.
pub fn closure(
    doc: &SpecDocument,
    schema: &Schema,
    operation: &str,
    diags: &mut Diagnostics,
) -> BTreeMap<String, serde_json::Value> {
    let mut bag = BTreeMap::new();
    let mut pending = collect_refs(schema);
    let mut visited: BTreeSet<String> = pending.iter().cloned().collect();

    while let Some(reference) = pending.pop() {
        match resolve_pointer(doc, &reference) {
            Ok(target) => {
                bag.insert(terminal_name(&reference).to_string(), target.clone());
                if let Ok(nested) = serde_json::from_value::<Schema>(target.clone()) {
                    for next in collect_refs(&nested) {
                        if visited.insert(next.clone()) {
                            pending.push(next);
                        }
                    }
                }
            }
            Err(e) => diags.warn(Some(operation), e.to_string()),
        }
    }

    bag
}

/// Resolve one schema reference and flatten `allOf` composition into a
/// single object schema.
///
/// Each branch (itself possibly a reference, resolved recursively)
/// contributes its properties; branches without properties contribute
/// nothing; later branches overwrite earlier ones on key collision.
pub fn dereference(doc: &SpecDocument, reference: &str, diags: &mut Diagnostics) -> Option<Schema> {
    dereference_inner(doc, reference, diags, 0)
}

fn dereference_inner(
    doc: &SpecDocument,
    reference: &str,
    diags: &mut Diagnostics,
    depth: u32,
) -> Option<Schema> {
    if depth > MAX_DEPTH {
        return None;
    }

    let name = reference
        .strip_prefix("#/components/schemas/")
        .unwrap_or(reference);
    let Some(schema) = doc.schemas().get(name) else {
        diags.warn(None, format!("schema not found for reference: {reference}"));
        return None;
    };

    match schema {
        Schema::Composite(composite) => {
            Some(flatten_all_of(doc, &composite.branches, diags, depth))
        }
        other => Some(other.clone()),
    }
}

fn flatten_all_of(
    doc: &SpecDocument,
    branches: &[Schema],
    diags: &mut Diagnostics,
    depth: u32,
) -> Schema {
    let mut properties = BTreeMap::new();

    for branch in branches {
        let resolved = match branch {
            Schema::Reference(reference) => {
                dereference_inner(doc, &reference.target, diags, depth + 1)
            }
            other => Some(other.clone()),
        };
        match resolved {
            Some(Schema::Object(object)) => {
                // Later branch wins on collision
                properties.extend(object.properties);
            }
            Some(Schema::Composite(inner)) => {
                if let Schema::Object(object) = flatten_all_of(doc, &inner.branches, diags, depth + 1)
                {
                    properties.extend(object.properties);
                }
            }
            // Branches without properties contribute nothing
            _ => {}
        }
    }

    Schema::Object(ObjectSchema {
        properties,
        required: None,
        example: None,
    })
}

fn terminal_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
