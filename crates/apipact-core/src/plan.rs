//! Compile plan types and config validation
//!
//! Describes what the compiler *would* emit without assembling a suite.
//! Used for pre-flight validation and CI previews.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Config;

// ── Plan types ──

/// Complete compile plan: operations, request counts, and config warnings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompilePlan {
    /// Per-operation plan
    pub operations: Vec<OperationPlan>,
    /// Total request models the suite would contain
    pub total_requests: u64,
    /// Config/spec validation results
    pub validations: Vec<Validation>,
}

/// Plan for a single operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OperationPlan {
    /// Operation label, e.g. "GET /items/{id}"
    pub operation: String,
    /// HTTP method
    pub method: String,
    /// Path template
    pub path: String,
    /// Request models this operation expands into (the combination count)
    pub requests: u64,
    /// Enumerable parameter names, in slot order
    pub parameters: Vec<String>,
    /// Body field names contributing to the request body
    pub body_fields: Vec<String>,
    /// Declared status codes whose responses carry a JSON body schema
    pub documented_statuses: Vec<u16>,
}

/// A validation check result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

// ── Config validation ──

/// Patterns that suggest a placeholder value rather than a real credential.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-token",
    "your_token",
    "YOUR_TOKEN",
    "your-api-key",
    "YOUR_API_KEY",
    "TODO",
    "CHANGEME",
    "changeme",
    "placeholder",
    "replace-me",
    "REPLACE_ME",
];

/// Validate config and produce validation results.
#[must_use]
pub fn validate_config(config: &Config) -> Vec<Validation> {
    let mut checks = Vec::new();

    // Spec file exists
    if config.spec.exists() {
        checks.push(Validation {
            check: "spec".into(),
            status: ValidationStatus::Ok,
            message: format!("spec: {} (exists)", config.spec.display()),
        });
    } else {
        checks.push(Validation {
            check: "spec".into(),
            status: ValidationStatus::Error,
            message: format!("spec: {} (not found)", config.spec.display()),
        });
    }

    // Base URL
    if config.base_url.starts_with("http://") || config.base_url.starts_with("https://") {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Ok,
            message: format!("base_url: {}", config.base_url),
        });
    } else {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Warning,
            message: format!(
                "base_url: {} (missing http:// or https:// prefix)",
                config.base_url
            ),
        });
    }

    // Headers — check for placeholders
    if config.headers.is_empty() {
        checks.push(Validation {
            check: "headers".into(),
            status: ValidationStatus::Ok,
            message: "headers: none configured".into(),
        });
    } else {
        let mut header_issues = Vec::new();
        for (key, value) in &config.headers {
            // Angle-bracket placeholders: <token>, <your-key>
            if value.contains('<') && value.contains('>') {
                header_issues.push(format!("{key}: contains '<...>' placeholder"));
            }
            for pattern in PLACEHOLDER_PATTERNS {
                if value.contains(pattern) {
                    header_issues.push(format!("{key}: contains '{pattern}' — may be placeholder"));
                    break;
                }
            }
        }

        if header_issues.is_empty() {
            checks.push(Validation {
                check: "headers".into(),
                status: ValidationStatus::Ok,
                message: format!("headers: {} configured", config.headers.len()),
            });
        } else {
            for issue in header_issues {
                checks.push(Validation {
                    check: "headers".into(),
                    status: ValidationStatus::Warning,
                    message: issue,
                });
            }
        }
    }

    checks
}

// ── Display helpers ──

impl CompilePlan {
    /// Format as human-readable terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Plan: {} operations, {} requests\n",
            self.operations.len(),
            self.total_requests,
        ));

        for op in &self.operations {
            lines.push(format!("{} ({} requests):", op.operation, op.requests));

            if !op.parameters.is_empty() {
                lines.push(format!("  Parameters: {}", op.parameters.join(", ")));
            }
            if !op.body_fields.is_empty() {
                lines.push(format!("  Body fields: {}", op.body_fields.join(", ")));
            }
            if !op.documented_statuses.is_empty() {
                let statuses: Vec<String> = op
                    .documented_statuses
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                lines.push(format!("  Contracts: {}", statuses.join(", ")));
            }
            lines.push(String::new());
        }

        lines.push("Config validation:".into());
        for v in &self.validations {
            lines.push(format!("  [{}] {}", v.status, v.message));
        }

        lines.join("\n")
    }

    /// Returns true if any validation has Error status.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Error)
    }

    /// Returns true if any validation has Warning status.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Warning)
    }
}
