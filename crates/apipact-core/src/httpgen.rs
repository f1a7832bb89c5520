//! HTTP file generator - renders a compiled suite in .http format

use crate::model::{BodyEncoding, RequestModel};

/// Generate .http file content from a compiled request sequence.
#[must_use]
pub fn to_http_file(requests: &[RequestModel], base_url_var: &str) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "# Auto-generated contract test requests ({} cases)",
        requests.len()
    ));
    lines.push(format!("# Base URL variable: {{{{{base_url_var}}}}}"));
    lines.push(String::new());

    for (idx, request) in requests.iter().enumerate() {
        lines.push(format!("### [{idx}] {}", request.operation));

        lines.push(format!(
            "{} {{{{{base_url_var}}}}}{}{}",
            request.method,
            request.path,
            query_string(request)
        ));

        for (key, value) in &request.headers {
            lines.push(format!("{key}: {}", plain(value)));
        }

        if !request.body.is_empty() {
            match request.body_encoding {
                BodyEncoding::Json => {
                    lines.push("Content-Type: application/json".to_string());
                    lines.push(String::new());
                    let body: serde_json::Map<String, serde_json::Value> = request
                        .body
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    lines.push(
                        serde_json::to_string_pretty(&serde_json::Value::Object(body))
                            .unwrap_or_default(),
                    );
                }
                _ => {
                    lines.push(format!("Content-Type: {}", request.body_encoding.as_str()));
                    lines.push(String::new());
                    let pairs: Vec<String> = request
                        .body
                        .iter()
                        .map(|(k, v)| format!("{k}={}", plain(v)))
                        .collect();
                    lines.push(pairs.join("&"));
                }
            }
        }

        lines.push(String::new());
        lines.push("###".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

fn query_string(request: &RequestModel) -> String {
    if request.query_parameters.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = request
        .query_parameters
        .iter()
        .map(|(k, v)| format!("{k}={}", plain(v)))
        .collect();
    format!("?{}", pairs.join("&"))
}

/// Bare string form for URL and header positions, not the JSON-quoted one.
fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
