use std::collections::BTreeMap;

use apimark_diagnostics::Diagnostic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root of one parsed API description.
///
/// `endpoints` and `components` are always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document-level metadata, if the source supplied any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Frontmatter>,
    /// Operations in source order.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Reusable named definitions in source order.
    #[serde(default)]
    pub components: Vec<Component>,
    /// When the model was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Diagnostics accumulated while producing and validating the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            frontmatter: None,
            endpoints: Vec::new(),
            components: Vec::new(),
            created_at: Utc::now(),
            diagnostics: Vec::new(),
        }
    }

    /// Looks up an endpoint by its `(method, path)` identity.
    pub fn endpoint(&self, method: &str, path: &str) -> Option<&Endpoint> {
        self.endpoints
            .iter()
            .find(|e| e.method == method && e.path == path)
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Document-level metadata block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Free-form keys not covered by the named fields.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// One HTTP operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// The HTTP method (uppercase).
    pub method: String,
    /// The path template (e.g. "/users/{id}").
    pub path: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: Vec<Response>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Source line the endpoint was declared on.
    #[serde(default)]
    pub line: usize,
}

impl Endpoint {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Identity used for duplicate detection.
    pub fn key(&self) -> (&str, &str) {
        (&self.method, &self.path)
    }
}

/// An operation parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    /// Where the parameter lives: `query`, `path`, `header` or `cookie`.
    #[serde(rename = "in")]
    pub location: String,
    /// The declared type (e.g. "string", "integer").
    #[serde(default, rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Schemas keyed by media type (e.g. "application/json").
    #[serde(default)]
    pub content: BTreeMap<String, Schema>,
    #[serde(default)]
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Status code as written (e.g. "200", "4XX", "default").
    pub status_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Header>,
    #[serde(default)]
    pub content: BTreeMap<String, Schema>,
    #[serde(default)]
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// A recursive schema node.
///
/// An empty `schema_type` or `reference` means the field is unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default, rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub format: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default)]
    pub description: String,
    /// A `$ref`-style pointer to another definition.
    #[serde(default, rename = "$ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(default)]
    pub line: usize,
}

impl Schema {
    /// A schema of the given type and nothing else.
    pub fn of_type(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
            ..Self::default()
        }
    }

    /// A schema that only points elsewhere.
    pub fn reference_to(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    pub fn is_reference(&self) -> bool {
        !self.reference.is_empty()
    }

    /// Nesting depth: `0` for a leaf, otherwise one more than the deepest
    /// property or items schema. Composition branches do not count.
    pub fn depth(&self) -> usize {
        let children = self
            .properties
            .values()
            .chain(self.items.as_deref())
            .map(Schema::depth)
            .max();
        match children {
            Some(deepest) => deepest + 1,
            None => 0,
        }
    }
}

/// A reusable named definition, referenced elsewhere by `$ref`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    /// The kind of definition (e.g. "schema").
    #[serde(default = "default_component_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub line: usize,
}

fn default_component_kind() -> String {
    "schema".to_string()
}
