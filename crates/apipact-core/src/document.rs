//! Typed view of an OpenAPI 3.x document
//!
//! The raw `serde_json::Value` stays alongside the typed view: JSON-pointer
//! resolution and expected-response assembly work on raw nodes, while
//! candidate extraction and `allOf` merging work on the tagged [`Schema`]
//! union. The document is assumed structurally valid; this crate does not
//! defend against malformed specifications.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A parsed specification document. Read-only for one compilation pass.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    document: serde_json::Value,
    paths: BTreeMap<String, PathItem>,
    schemas: BTreeMap<String, Schema>,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("specification document has unexpected shape: {0}")]
    Shape(String),
}

impl SpecDocument {
    /// Build the typed view from a raw document value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Shape`] if `paths` or `components.schemas`
    /// cannot be interpreted.
    pub fn parse(document: serde_json::Value) -> Result<Self, DocumentError> {
        #[derive(Deserialize)]
        struct Root {
            #[serde(default)]
            paths: BTreeMap<String, PathItem>,
            #[serde(default)]
            components: Components,
        }

        #[derive(Default, Deserialize)]
        struct Components {
            #[serde(default)]
            schemas: BTreeMap<String, Schema>,
        }

        let root: Root = serde_json::from_value(document.clone())
            .map_err(|e| DocumentError::Shape(e.to_string()))?;

        Ok(Self {
            document,
            paths: root.paths,
            schemas: root.components.schemas,
        })
    }

    /// The raw document, target of `$ref` pointer resolution.
    #[must_use]
    pub fn raw(&self) -> &serde_json::Value {
        &self.document
    }

    /// Path template → path item, in template order.
    #[must_use]
    pub fn paths(&self) -> &BTreeMap<String, PathItem> {
        &self.paths
    }

    /// `components.schemas`, typed and keyed by schema name.
    #[must_use]
    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }
}

/// One path template with its method slots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    get: Option<Operation>,
    #[serde(default)]
    post: Option<Operation>,
    #[serde(default)]
    put: Option<Operation>,
    #[serde(default)]
    delete: Option<Operation>,
    #[serde(default)]
    patch: Option<Operation>,
    /// Path-level parameters, shared by every operation under this path.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Declared operations in fixed method order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("GET", self.get.as_ref()),
            ("POST", self.post.as_ref()),
            ("PUT", self.put.as_ref()),
            ("DELETE", self.delete.as_ref()),
            ("PATCH", self.patch.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

/// One operation: parameters, optional request body, declared responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Status-code key → response. Keys may be non-numeric (`default`).
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

/// A declared parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub example: Option<serde_json::Value>,
}

/// Where a parameter is carried. Only query, header, and path values are
/// enumerable; cookie parameters parse but never contribute candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Content-type key → media object.
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// A media object. The schema is kept raw: validation needs the node exactly
/// as declared, and traversal parses it into [`Schema`] on demand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// One schema node.
///
/// `serde(untagged)` tries variants in declaration order, so the shapes with
/// distinguishing keys must precede the [`PrimitiveSchema`] catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schema {
    Reference(ReferenceSchema),
    Composite(CompositeSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    Primitive(PrimitiveSchema),
}

impl Schema {
    /// The declared `enum` domain, when this node carries one.
    #[must_use]
    pub fn enum_values(&self) -> Option<&[serde_json::Value]> {
        match self {
            Self::Primitive(primitive) => primitive.enum_values.as_deref(),
            _ => None,
        }
    }

    /// The declared `example`, when this node carries one.
    #[must_use]
    pub fn example(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Object(object) => object.example.as_ref(),
            Self::Primitive(primitive) => primitive.example.as_ref(),
            _ => None,
        }
    }
}

/// `{"$ref": "#/components/schemas/Name"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSchema {
    #[serde(rename = "$ref")]
    pub target: String,
}

/// `allOf` composition; branches are merged in order during dereferencing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSchema {
    #[serde(rename = "allOf")]
    pub branches: Vec<Schema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySchema {
    pub items: Box<Schema>,
}

/// Scalar schemas and any node without a structural key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSchema {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}
