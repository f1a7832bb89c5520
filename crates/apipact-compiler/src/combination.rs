//! Cartesian combination of candidate values

use crate::collector::CandidateSlot;

/// A candidate source that is neither an array nor an object. This signals
/// a precondition violation in upstream data, not a recoverable per-request
/// condition, so the enclosing operation fails immediately.
#[derive(Debug, thiserror::Error)]
#[error("candidate source for `{name}` must be an array or object, got {found}")]
pub struct CombinationError {
    pub name: String,
    pub found: &'static str,
}

/// Cartesian product over the slots' candidate sources.
///
/// An array source contributes one branch per element; an object source is a
/// unit of size one. With no slots the product is a single empty
/// combination, so an operation without enumerable values still yields
/// exactly one request.
///
/// Output size is the product of all array lengths; bounding explosive
/// operations is the caller's job.
///
/// # Errors
///
/// Returns [`CombinationError`] on the first slot whose source is neither
/// an array nor an object.
pub fn combinations(
    slots: &[CandidateSlot],
) -> Result<Vec<Vec<serde_json::Value>>, CombinationError> {
    let mut acc: Vec<Vec<serde_json::Value>> = vec![Vec::new()];

    for slot in slots {
        acc = match &slot.source {
            serde_json::Value::Array(values) => acc
                .into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |value| {
                        let mut next = prefix.clone();
                        next.push(value.clone());
                        next
                    })
                })
                .collect(),
            serde_json::Value::Object(_) => acc
                .into_iter()
                .map(|mut prefix| {
                    prefix.push(slot.source.clone());
                    prefix
                })
                .collect(),
            other => {
                return Err(CombinationError {
                    name: slot.name.clone(),
                    found: json_type_name(other),
                });
            }
        };
    }

    Ok(acc)
}

/// The product's size without materializing it. Used by the compile plan.
///
/// # Errors
///
/// Same contract as [`combinations`].
pub fn cardinality(slots: &[CandidateSlot]) -> Result<u64, CombinationError> {
    let mut count: u64 = 1;
    for slot in slots {
        match &slot.source {
            serde_json::Value::Array(values) => {
                count = count.saturating_mul(values.len() as u64);
            }
            serde_json::Value::Object(_) => {}
            other => {
                return Err(CombinationError {
                    name: slot.name.clone(),
                    found: json_type_name(other),
                });
            }
        }
    }
    Ok(count)
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
