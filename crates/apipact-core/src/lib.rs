//! apipact-core: Document model and interchange types for contract testing
//!
//! This crate provides the typed OpenAPI document view, the compiled
//! request-suite interchange format, and the diagnostics, config, and plan
//! types shared by the compiler and the CLI.

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod httpgen;
pub mod model;
pub mod plan;

pub use config::{Config, ConfigError};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use document::{
    ArraySchema, CompositeSchema, DocumentError, MediaType, ObjectSchema, Operation, Parameter,
    ParameterLocation, PathItem, PrimitiveSchema, ReferenceSchema, RequestBody, Response, Schema,
    SpecDocument,
};
pub use httpgen::to_http_file;
pub use model::{
    BodyEncoding, CompiledSuite, ComponentsBag, ExpectedResponse, RequestModel, generate_schema,
};
pub use plan::{CompilePlan, OperationPlan, Validation, ValidationStatus};
