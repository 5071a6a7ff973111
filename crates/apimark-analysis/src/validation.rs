//! Structural validation of a document.

use std::collections::HashMap;

use apimark_ast::{Document, Endpoint, NodePath, Parameter, Schema, VisitResult, Visitor};
use apimark_diagnostics::{Category, Diagnostic, DiagnosticBuilder};

/// The HTTP methods an endpoint may declare.
pub const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Valid values of a parameter's location.
pub const PARAMETER_LOCATIONS: &[&str] = &["query", "path", "header", "cookie"];

/// Source tag carried by every validation diagnostic.
pub const VALIDATION_SOURCE: &str = "validator";

/// Which optional rules a validation pass applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Report endpoints without a description.
    pub strict: bool,
    /// Report parameters without an example.
    pub require_examples: bool,
    /// Report schemas nested deeper than this.
    pub max_schema_depth: Option<usize>,
    /// Restrict endpoints to a subset of [`HTTP_METHODS`].
    pub allowed_methods: Option<Vec<String>>,
}

impl ValidationOptions {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            ..Self::default()
        }
    }

    pub fn with_require_examples(mut self, require: bool) -> Self {
        self.require_examples = require;
        self
    }

    pub fn with_max_schema_depth(mut self, depth: usize) -> Self {
        self.max_schema_depth = Some(depth);
        self
    }

    pub fn with_allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }
}

/// Visitor that checks the document's structural rules.
///
/// Each violation becomes one diagnostic whose context is the path of the
/// offending node. Visiting never fails.
#[derive(Debug, Default)]
pub struct ValidationVisitor {
    options: ValidationOptions,
    /// First declaration line per `(method, path)`.
    seen: HashMap<(String, String), usize>,
    /// Schema path under which a depth warning was already raised.
    too_deep: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationVisitor {
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn report(&mut self, builder: DiagnosticBuilder, path: &NodePath) {
        self.diagnostics
            .push(builder.in_source(VALIDATION_SOURCE).with_context(path.as_str()).build());
    }

    fn check_method(&mut self, endpoint: &Endpoint, path: &NodePath) {
        if !HTTP_METHODS.contains(&endpoint.method.as_str()) {
            self.report(
                Diagnostic::error(
                    Category::Endpoint,
                    format!("invalid HTTP method '{}'", endpoint.method),
                )
                .with_code("E2003")
                .at_line(endpoint.line)
                .with_suggestion(format!("use one of {}", HTTP_METHODS.join(", "))),
                path,
            );
            return;
        }

        let rejected = self
            .options
            .allowed_methods
            .as_ref()
            .is_some_and(|allowed| !allowed.iter().any(|m| m == &endpoint.method));
        if rejected {
            self.report(
                Diagnostic::error(
                    Category::Config,
                    format!("HTTP method '{}' is not allowed by configuration", endpoint.method),
                )
                .with_code("E2008")
                .at_line(endpoint.line),
                path,
            );
        }
    }
}

impl Visitor for ValidationVisitor {
    fn visit_document(&mut self, document: &Document, path: &NodePath) -> VisitResult {
        if document.endpoints.is_empty() {
            let line = document.frontmatter.as_ref().map_or(0, |f| f.line);
            self.report(
                Diagnostic::error(
                    Category::Validation,
                    "document must contain at least one endpoint",
                )
                .with_code("E2001")
                .at_line(line),
                path,
            );
        }
        Ok(())
    }

    fn visit_endpoint(&mut self, endpoint: &Endpoint, path: &NodePath) -> VisitResult {
        let key = (endpoint.method.clone(), endpoint.path.clone());
        if let Some(&first_line) = self.seen.get(&key) {
            self.report(
                Diagnostic::error(
                    Category::Endpoint,
                    format!("duplicate endpoint {} {}", endpoint.method, endpoint.path),
                )
                .with_code("E2002")
                .at_line(endpoint.line)
                .with_suggestion(format!("first declared on line {}", first_line)),
                path,
            );
        } else {
            self.seen.insert(key, endpoint.line);
        }

        self.check_method(endpoint, path);

        if !endpoint.path.starts_with('/') {
            self.report(
                Diagnostic::error(
                    Category::Endpoint,
                    format!("endpoint path '{}' must start with '/'", endpoint.path),
                )
                .with_code("E2004")
                .at_line(endpoint.line),
                path,
            );
        }

        if self.options.strict && endpoint.description.is_empty() {
            self.report(
                Diagnostic::warning(
                    Category::Endpoint,
                    format!("endpoint {} {} has no description", endpoint.method, endpoint.path),
                )
                .with_code("W2005")
                .at_line(endpoint.line)
                .with_suggestion("add a description paragraph below the endpoint heading"),
                path,
            );
        }
        Ok(())
    }

    fn visit_parameter(&mut self, parameter: &Parameter, path: &NodePath) -> VisitResult {
        if !PARAMETER_LOCATIONS.contains(&parameter.location.as_str()) {
            self.report(
                Diagnostic::error(
                    Category::Validation,
                    format!(
                        "invalid location '{}' for parameter '{}'",
                        parameter.location, parameter.name
                    ),
                )
                .with_code("E2006")
                .at_line(parameter.line)
                .with_suggestion(format!("use one of {}", PARAMETER_LOCATIONS.join(", "))),
                path,
            );
        }

        if parameter.location == "path" && !parameter.required {
            self.report(
                Diagnostic::error(
                    Category::Validation,
                    format!("path parameter '{}' must be required", parameter.name),
                )
                .with_code("E2007")
                .at_line(parameter.line),
                path,
            );
        }

        if self.options.require_examples && parameter.example.is_none() {
            self.report(
                Diagnostic::warning(
                    Category::Validation,
                    format!("parameter '{}' has no example", parameter.name),
                )
                .with_code("W2102")
                .at_line(parameter.line),
                path,
            );
        }
        Ok(())
    }

    fn visit_schema(&mut self, schema: &Schema, path: &NodePath) -> VisitResult {
        if !schema.reference.is_empty() && !schema.schema_type.is_empty() {
            self.report(
                Diagnostic::error(Category::Schema, "schema cannot have both $ref and type")
                    .with_code("E2101")
                    .at_line(schema.line)
                    .with_suggestion("remove the type or the reference"),
                path,
            );
        }

        // Textual heuristic: the reference names the position it sits at.
        if !schema.reference.is_empty() && schema.reference.contains(path.as_str()) {
            self.report(
                Diagnostic::warning(
                    Category::Reference,
                    format!("potential circular reference '{}'", schema.reference),
                )
                .with_code("W2104")
                .at_line(schema.line),
                path,
            );
        }

        if let Some(max) = self.options.max_schema_depth {
            let inside_reported = self
                .too_deep
                .as_deref()
                .and_then(|outer| path.as_str().strip_prefix(outer))
                .is_some_and(|rest| rest.starts_with('/'));
            if !inside_reported {
                let depth = schema.depth();
                if depth > max {
                    self.too_deep = Some(path.to_string());
                    self.report(
                        Diagnostic::warning(
                            Category::Schema,
                            format!("schema nesting depth {} exceeds limit of {}", depth, max),
                        )
                        .with_code("W2103")
                        .at_line(schema.line),
                        path,
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimark_ast::{Component, RequestBody};
    use apimark_diagnostics::Severity;

    fn validate(document: &Document, options: ValidationOptions) -> Vec<Diagnostic> {
        let mut visitor = ValidationVisitor::new(options);
        document.accept(&mut visitor).unwrap();
        visitor.into_diagnostics()
    }

    fn with_endpoint(endpoint: Endpoint) -> Document {
        let mut doc = Document::new();
        doc.endpoints.push(endpoint);
        doc
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().filter_map(Diagnostic::code).collect()
    }

    #[test]
    fn empty_document_is_an_error() {
        let diagnostics = validate(&Document::new(), ValidationOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_error());
        assert!(diagnostics[0].message().contains("at least one endpoint"));
        assert_eq!(diagnostics[0].context(), Some("#"));
        assert_eq!(diagnostics[0].source_component(), Some("validator"));
    }

    #[test]
    fn duplicate_endpoint_reported_once_on_second_occurrence() {
        let mut doc = Document::new();
        for line in [3, 9] {
            let mut endpoint = Endpoint::new("GET", "/users");
            endpoint.line = line;
            doc.endpoints.push(endpoint);
        }

        let diagnostics = validate(&doc, ValidationOptions::default());
        let duplicates: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.message().contains("duplicate endpoint"))
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].line(), 9);
        assert_eq!(duplicates[0].suggestion(), Some("first declared on line 3"));
    }

    #[test]
    fn third_duplicate_also_reported() {
        let mut doc = Document::new();
        for _ in 0..3 {
            doc.endpoints.push(Endpoint::new("DELETE", "/items/{id}"));
        }
        let diagnostics = validate(&doc, ValidationOptions::default());
        assert_eq!(codes(&diagnostics), vec!["E2002", "E2002"]);
    }

    #[test]
    fn duplicates_are_case_sensitive() {
        let mut doc = Document::new();
        doc.endpoints.push(Endpoint::new("GET", "/users"));
        doc.endpoints.push(Endpoint::new("GET", "/Users"));
        let diagnostics = validate(&doc, ValidationOptions::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn invalid_method() {
        for method in ["FETCH", "get", "TRACE", ""] {
            let diagnostics = validate(
                &with_endpoint(Endpoint::new(method, "/users")),
                ValidationOptions::default(),
            );
            assert_eq!(codes(&diagnostics), vec!["E2003"], "method {method:?}");
            assert!(diagnostics[0].message().contains("invalid HTTP method"));
        }
    }

    #[test]
    fn standard_methods_pass() {
        for method in HTTP_METHODS {
            let diagnostics = validate(
                &with_endpoint(Endpoint::new(*method, "/users")),
                ValidationOptions::default(),
            );
            assert!(diagnostics.is_empty(), "method {method}");
        }
    }

    #[test]
    fn path_must_start_with_slash() {
        let diagnostics = validate(
            &with_endpoint(Endpoint::new("GET", "users")),
            ValidationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), vec!["E2004"]);
        assert_eq!(diagnostics[0].context(), Some("endpoint[GET users]"));
    }

    #[test]
    fn strict_mode_warns_on_missing_description() {
        let doc = with_endpoint(Endpoint::new("GET", "/users"));
        assert!(validate(&doc, ValidationOptions::new(false)).is_empty());

        let diagnostics = validate(&doc, ValidationOptions::new(true));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity(), Severity::Warning);

        let mut described = Endpoint::new("GET", "/users");
        described.description = "Lists users.".into();
        assert!(validate(&with_endpoint(described), ValidationOptions::new(true)).is_empty());
    }

    #[test]
    fn allowed_methods_restrict_standard_verbs() {
        let options = ValidationOptions::default().with_allowed_methods(["GET", "POST"]);
        let diagnostics = validate(&with_endpoint(Endpoint::new("DELETE", "/users")), options.clone());
        assert_eq!(codes(&diagnostics), vec!["E2008"]);
        assert_eq!(diagnostics[0].category(), Category::Config);

        assert!(validate(&with_endpoint(Endpoint::new("GET", "/users")), options).is_empty());
    }

    fn endpoint_with_parameter(parameter: Parameter) -> Document {
        let mut endpoint = Endpoint::new("GET", "/users/{id}");
        endpoint.parameters.push(parameter);
        with_endpoint(endpoint)
    }

    #[test]
    fn path_parameter_must_be_required() {
        let mut parameter = Parameter {
            name: "id".into(),
            location: "path".into(),
            required: false,
            ..Parameter::default()
        };
        let diagnostics = validate(
            &endpoint_with_parameter(parameter.clone()),
            ValidationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), vec!["E2007"]);
        assert_eq!(
            diagnostics[0].context(),
            Some("endpoint[GET /users/{id}].parameters[id]")
        );

        parameter.required = true;
        assert!(validate(&endpoint_with_parameter(parameter), ValidationOptions::default())
            .is_empty());
    }

    #[test]
    fn invalid_parameter_location() {
        let parameter = Parameter {
            name: "payload".into(),
            location: "body".into(),
            ..Parameter::default()
        };
        let diagnostics = validate(
            &endpoint_with_parameter(parameter),
            ValidationOptions::default(),
        );
        assert_eq!(codes(&diagnostics), vec!["E2006"]);
    }

    #[test]
    fn require_examples() {
        let parameter = Parameter {
            name: "page".into(),
            location: "query".into(),
            ..Parameter::default()
        };
        let options = ValidationOptions::default().with_require_examples(true);
        let diagnostics = validate(&endpoint_with_parameter(parameter.clone()), options.clone());
        assert_eq!(codes(&diagnostics), vec!["W2102"]);

        let with_example = Parameter {
            example: Some(serde_json::json!(2)),
            ..parameter
        };
        assert!(validate(&endpoint_with_parameter(with_example), options).is_empty());
    }

    #[test]
    fn reference_and_type_are_exclusive() {
        let mut schema = Schema::reference_to("#/components/schemas/User");
        schema.schema_type = "object".into();
        let mut body = RequestBody::default();
        body.content.insert("application/json".into(), schema);
        let mut endpoint = Endpoint::new("POST", "/users");
        endpoint.request_body = Some(body);

        let diagnostics = validate(&with_endpoint(endpoint), ValidationOptions::default());
        let exclusive: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.message().contains("cannot have both"))
            .collect();
        assert_eq!(exclusive.len(), 1);
        assert_eq!(exclusive[0].category(), Category::Schema);
    }

    fn component(name: &str, schema: Schema) -> Component {
        Component {
            name: name.into(),
            kind: "schema".into(),
            schema: Some(schema),
            line: 1,
        }
    }

    #[test]
    fn self_reference_is_flagged() {
        let mut doc = with_endpoint(Endpoint::new("GET", "/nodes"));
        doc.components
            .push(component("Node", Schema::reference_to("#/components/schemas/Node")));

        let diagnostics = validate(&doc, ValidationOptions::default());
        assert_eq!(codes(&diagnostics), vec!["W2104"]);
        assert_eq!(diagnostics[0].category(), Category::Reference);
    }

    #[test]
    fn circular_heuristic_is_textual() {
        let mut doc = with_endpoint(Endpoint::new("GET", "/nodes"));

        // A nested self-reference sits at a longer path and goes unnoticed.
        let mut node = Schema::of_type("object");
        node.properties
            .insert("parent".into(), Schema::reference_to("#/components/schemas/Node"));
        doc.components.push(component("Node", node));

        // A reference to a different component whose name extends this one matches.
        doc.components
            .push(component("User", Schema::reference_to("#/components/schemas/UserList")));

        let diagnostics = validate(&doc, ValidationOptions::default());
        assert_eq!(codes(&diagnostics), vec!["W2104"]);
        assert_eq!(diagnostics[0].context(), Some("#/components/schemas/User"));
    }

    #[test]
    fn depth_warning_reported_once_per_subtree() {
        let mut leaf = Schema::of_type("string");
        for _ in 0..4 {
            let mut parent = Schema::of_type("object");
            parent.properties.insert("child".into(), leaf);
            leaf = parent;
        }
        let mut doc = with_endpoint(Endpoint::new("GET", "/deep"));
        doc.components.push(component("Deep", leaf));

        let options = ValidationOptions::default().with_max_schema_depth(2);
        let diagnostics = validate(&doc, options);
        assert_eq!(codes(&diagnostics), vec!["W2103"]);
        assert!(diagnostics[0].message().contains("depth 4 exceeds limit of 2"));
    }
}
