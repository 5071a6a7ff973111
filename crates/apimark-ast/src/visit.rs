//! Traversal protocol over the document model.
//!
//! [`walk`] visits a node and then its children, depth-first and pre-order:
//!
//! - Document: frontmatter, endpoints, components
//! - Endpoint: parameters, request body, responses
//! - Parameter, Component: nested schema
//! - RequestBody, Response: content schemas (media type order)
//! - Schema: properties, items, `allOf`, `anyOf`, `oneOf`
//!
//! Every call receives the [`NodePath`] of the node being visited; visitors
//! never track position themselves. A visit method returning `Err` stops the
//! walk of the remaining tree and the error is returned to the caller.

use std::fmt;

use crate::error::VisitError;
use crate::model::{
    Component, Document, Endpoint, Frontmatter, Parameter, RequestBody, Response, Schema,
};

pub type VisitResult = Result<(), VisitError>;

/// The kind of a node, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Frontmatter,
    Endpoint,
    Parameter,
    RequestBody,
    Response,
    Schema,
    Component,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Document => "document",
            NodeKind::Frontmatter => "frontmatter",
            NodeKind::Endpoint => "endpoint",
            NodeKind::Parameter => "parameter",
            NodeKind::RequestBody => "request body",
            NodeKind::Response => "response",
            NodeKind::Schema => "schema",
            NodeKind::Component => "component",
        };
        f.write_str(name)
    }
}

/// A borrowed node of any kind.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Document(&'a Document),
    Frontmatter(&'a Frontmatter),
    Endpoint(&'a Endpoint),
    Parameter(&'a Parameter),
    RequestBody(&'a RequestBody),
    Response(&'a Response),
    Schema(&'a Schema),
    Component(&'a Component),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Document(_) => NodeKind::Document,
            Node::Frontmatter(_) => NodeKind::Frontmatter,
            Node::Endpoint(_) => NodeKind::Endpoint,
            Node::Parameter(_) => NodeKind::Parameter,
            Node::RequestBody(_) => NodeKind::RequestBody,
            Node::Response(_) => NodeKind::Response,
            Node::Schema(_) => NodeKind::Schema,
            Node::Component(_) => NodeKind::Component,
        }
    }

    /// The path a node has when it is the root of a walk.
    pub fn root_path(&self) -> NodePath {
        match self {
            Node::Document(_) => NodePath::document(),
            Node::Frontmatter(_) => NodePath::frontmatter(),
            Node::Endpoint(e) => NodePath::endpoint(&e.method, &e.path),
            Node::Parameter(p) => NodePath::from(format!("parameters[{}]", p.name)),
            Node::RequestBody(_) => NodePath::from("requestBody"),
            Node::Response(r) => NodePath::from(format!("responses[{}]", r.status_code)),
            Node::Schema(_) => NodePath::from("schema"),
            Node::Component(c) => NodePath::component(&c.kind, &c.name),
        }
    }

    /// Calls the visitor method for this node kind, without recursing.
    pub fn dispatch<V: Visitor + ?Sized>(self, visitor: &mut V, path: &NodePath) -> VisitResult {
        match self {
            Node::Document(n) => visitor.visit_document(n, path),
            Node::Frontmatter(n) => visitor.visit_frontmatter(n, path),
            Node::Endpoint(n) => visitor.visit_endpoint(n, path),
            Node::Parameter(n) => visitor.visit_parameter(n, path),
            Node::RequestBody(n) => visitor.visit_request_body(n, path),
            Node::Response(n) => visitor.visit_response(n, path),
            Node::Schema(n) => visitor.visit_schema(n, path),
            Node::Component(n) => visitor.visit_component(n, path),
        }
    }

    /// Walks this node and its subtree from its root path.
    pub fn accept<V: Visitor + ?Sized>(self, visitor: &mut V) -> VisitResult {
        let path = self.root_path();
        walk(self, &path, visitor)
    }
}

/// A mutably borrowed node of any kind.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Document(&'a mut Document),
    Frontmatter(&'a mut Frontmatter),
    Endpoint(&'a mut Endpoint),
    Parameter(&'a mut Parameter),
    RequestBody(&'a mut RequestBody),
    Response(&'a mut Response),
    Schema(&'a mut Schema),
    Component(&'a mut Component),
}

/// An owned node of any kind, passed through transformation functions.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum NodeValue {
    Document(Document),
    Frontmatter(Frontmatter),
    Endpoint(Endpoint),
    Parameter(Parameter),
    RequestBody(RequestBody),
    Response(Response),
    Schema(Schema),
    Component(Component),
}

impl NodeValue {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeValue::Document(_) => NodeKind::Document,
            NodeValue::Frontmatter(_) => NodeKind::Frontmatter,
            NodeValue::Endpoint(_) => NodeKind::Endpoint,
            NodeValue::Parameter(_) => NodeKind::Parameter,
            NodeValue::RequestBody(_) => NodeKind::RequestBody,
            NodeValue::Response(_) => NodeKind::Response,
            NodeValue::Schema(_) => NodeKind::Schema,
            NodeValue::Component(_) => NodeKind::Component,
        }
    }
}

/// Printable position of a node in the tree.
///
/// Endpoints render as `endpoint[GET /users]`, components as
/// `#/components/schemas/User`; children extend their parent's path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(String);

impl NodePath {
    pub fn document() -> Self {
        Self("#".to_string())
    }

    pub fn frontmatter() -> Self {
        Self("#/info".to_string())
    }

    pub fn endpoint(method: &str, path: &str) -> Self {
        Self(format!("endpoint[{} {}]", method, path))
    }

    pub fn component(kind: &str, name: &str) -> Self {
        Self(format!("#/components/{}s/{}", kind, name))
    }

    pub fn parameter(&self, name: &str) -> Self {
        Self(format!("{}.parameters[{}]", self.0, name))
    }

    pub fn request_body(&self) -> Self {
        Self(format!("{}.requestBody", self.0))
    }

    pub fn response(&self, status_code: &str) -> Self {
        Self(format!("{}.responses[{}]", self.0, status_code))
    }

    pub fn content(&self, media_type: &str) -> Self {
        Self(format!("{}.content[{}]", self.0, media_type))
    }

    pub fn property(&self, name: &str) -> Self {
        Self(format!("{}/properties/{}", self.0, name))
    }

    pub fn items(&self) -> Self {
        Self(format!("{}/items", self.0))
    }

    /// A composition branch, e.g. `/allOf/0`.
    pub fn branch(&self, keyword: &str, index: usize) -> Self {
        Self(format!("{}/{}/{}", self.0, keyword, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodePath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for NodePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only visitor. Every method defaults to a no-op, so implementors
/// override only the node kinds they care about.
pub trait Visitor {
    fn visit_document(&mut self, _document: &Document, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_frontmatter(&mut self, _frontmatter: &Frontmatter, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_endpoint(&mut self, _endpoint: &Endpoint, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_parameter(&mut self, _parameter: &Parameter, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_request_body(&mut self, _body: &RequestBody, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_response(&mut self, _response: &Response, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_schema(&mut self, _schema: &Schema, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_component(&mut self, _component: &Component, _path: &NodePath) -> VisitResult {
        Ok(())
    }
}

/// Visitor that may rewrite nodes in place. Children are walked after the
/// visit method returns, so a rewritten node's new children are visited.
pub trait VisitorMut {
    fn visit_document_mut(&mut self, _document: &mut Document, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_frontmatter_mut(
        &mut self,
        _frontmatter: &mut Frontmatter,
        _path: &NodePath,
    ) -> VisitResult {
        Ok(())
    }

    fn visit_endpoint_mut(&mut self, _endpoint: &mut Endpoint, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_parameter_mut(
        &mut self,
        _parameter: &mut Parameter,
        _path: &NodePath,
    ) -> VisitResult {
        Ok(())
    }

    fn visit_request_body_mut(
        &mut self,
        _body: &mut RequestBody,
        _path: &NodePath,
    ) -> VisitResult {
        Ok(())
    }

    fn visit_response_mut(&mut self, _response: &mut Response, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_schema_mut(&mut self, _schema: &mut Schema, _path: &NodePath) -> VisitResult {
        Ok(())
    }

    fn visit_component_mut(
        &mut self,
        _component: &mut Component,
        _path: &NodePath,
    ) -> VisitResult {
        Ok(())
    }
}

/// Visitor with every method left at its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseVisitor;

impl Visitor for BaseVisitor {}

impl VisitorMut for BaseVisitor {}

impl Document {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult {
        walk(Node::Document(self), &NodePath::document(), visitor)
    }

    pub fn accept_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) -> VisitResult {
        walk_mut(NodeMut::Document(self), &NodePath::document(), visitor)
    }
}

impl Endpoint {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult {
        Node::Endpoint(self).accept(visitor)
    }

    pub fn accept_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) -> VisitResult {
        let path = NodePath::endpoint(&self.method, &self.path);
        walk_mut(NodeMut::Endpoint(self), &path, visitor)
    }
}

impl Schema {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult {
        Node::Schema(self).accept(visitor)
    }
}

impl Component {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> VisitResult {
        Node::Component(self).accept(visitor)
    }
}

/// Visits `node` at `path`, then its children in traversal order.
pub fn walk<V: Visitor + ?Sized>(node: Node<'_>, path: &NodePath, visitor: &mut V) -> VisitResult {
    node.dispatch(visitor, path)?;

    match node {
        Node::Document(document) => {
            if let Some(frontmatter) = &document.frontmatter {
                walk(
                    Node::Frontmatter(frontmatter),
                    &NodePath::frontmatter(),
                    visitor,
                )?;
            }
            for endpoint in &document.endpoints {
                let endpoint_path = NodePath::endpoint(&endpoint.method, &endpoint.path);
                walk(Node::Endpoint(endpoint), &endpoint_path, visitor)?;
            }
            for component in &document.components {
                let component_path = NodePath::component(&component.kind, &component.name);
                walk(Node::Component(component), &component_path, visitor)?;
            }
        }
        Node::Frontmatter(_) => {}
        Node::Endpoint(endpoint) => {
            for parameter in &endpoint.parameters {
                walk(
                    Node::Parameter(parameter),
                    &path.parameter(&parameter.name),
                    visitor,
                )?;
            }
            if let Some(body) = &endpoint.request_body {
                walk(Node::RequestBody(body), &path.request_body(), visitor)?;
            }
            for response in &endpoint.responses {
                walk(
                    Node::Response(response),
                    &path.response(&response.status_code),
                    visitor,
                )?;
            }
        }
        Node::Parameter(parameter) => {
            if let Some(schema) = &parameter.schema {
                walk(Node::Schema(schema), path, visitor)?;
            }
        }
        Node::RequestBody(body) => {
            for (media_type, schema) in &body.content {
                walk(Node::Schema(schema), &path.content(media_type), visitor)?;
            }
        }
        Node::Response(response) => {
            for (media_type, schema) in &response.content {
                walk(Node::Schema(schema), &path.content(media_type), visitor)?;
            }
        }
        Node::Schema(schema) => {
            for (name, property) in &schema.properties {
                walk(Node::Schema(property), &path.property(name), visitor)?;
            }
            if let Some(items) = &schema.items {
                walk(Node::Schema(items), &path.items(), visitor)?;
            }
            for (index, branch) in schema.all_of.iter().enumerate() {
                walk(Node::Schema(branch), &path.branch("allOf", index), visitor)?;
            }
            for (index, branch) in schema.any_of.iter().enumerate() {
                walk(Node::Schema(branch), &path.branch("anyOf", index), visitor)?;
            }
            for (index, branch) in schema.one_of.iter().enumerate() {
                walk(Node::Schema(branch), &path.branch("oneOf", index), visitor)?;
            }
        }
        Node::Component(component) => {
            if let Some(schema) = &component.schema {
                walk(Node::Schema(schema), path, visitor)?;
            }
        }
    }

    Ok(())
}

/// Mutable counterpart of [`walk`], with the same order.
pub fn walk_mut<V: VisitorMut + ?Sized>(
    node: NodeMut<'_>,
    path: &NodePath,
    visitor: &mut V,
) -> VisitResult {
    match node {
        NodeMut::Document(document) => walk_document_mut(document, path, visitor),
        NodeMut::Frontmatter(frontmatter) => visitor.visit_frontmatter_mut(frontmatter, path),
        NodeMut::Endpoint(endpoint) => walk_endpoint_mut(endpoint, path, visitor),
        NodeMut::Parameter(parameter) => walk_parameter_mut(parameter, path, visitor),
        NodeMut::RequestBody(body) => {
            visitor.visit_request_body_mut(body, path)?;
            for (media_type, schema) in body.content.iter_mut() {
                walk_schema_mut(schema, &path.content(media_type), visitor)?;
            }
            Ok(())
        }
        NodeMut::Response(response) => {
            visitor.visit_response_mut(response, path)?;
            for (media_type, schema) in response.content.iter_mut() {
                walk_schema_mut(schema, &path.content(media_type), visitor)?;
            }
            Ok(())
        }
        NodeMut::Schema(schema) => walk_schema_mut(schema, path, visitor),
        NodeMut::Component(component) => {
            visitor.visit_component_mut(component, path)?;
            if let Some(schema) = component.schema.as_mut() {
                walk_schema_mut(schema, path, visitor)?;
            }
            Ok(())
        }
    }
}

fn walk_document_mut<V: VisitorMut + ?Sized>(
    document: &mut Document,
    path: &NodePath,
    visitor: &mut V,
) -> VisitResult {
    visitor.visit_document_mut(document, path)?;

    if let Some(frontmatter) = document.frontmatter.as_mut() {
        visitor.visit_frontmatter_mut(frontmatter, &NodePath::frontmatter())?;
    }
    for endpoint in document.endpoints.iter_mut() {
        let endpoint_path = NodePath::endpoint(&endpoint.method, &endpoint.path);
        walk_endpoint_mut(endpoint, &endpoint_path, visitor)?;
    }
    for component in document.components.iter_mut() {
        let component_path = NodePath::component(&component.kind, &component.name);
        walk_mut(NodeMut::Component(component), &component_path, visitor)?;
    }
    Ok(())
}

fn walk_endpoint_mut<V: VisitorMut + ?Sized>(
    endpoint: &mut Endpoint,
    path: &NodePath,
    visitor: &mut V,
) -> VisitResult {
    visitor.visit_endpoint_mut(endpoint, path)?;
    // Children see the endpoint as the visit left it.
    let path = &NodePath::endpoint(&endpoint.method, &endpoint.path);

    for parameter in endpoint.parameters.iter_mut() {
        let parameter_path = path.parameter(&parameter.name);
        walk_parameter_mut(parameter, &parameter_path, visitor)?;
    }
    if let Some(body) = endpoint.request_body.as_mut() {
        walk_mut(NodeMut::RequestBody(body), &path.request_body(), visitor)?;
    }
    for response in endpoint.responses.iter_mut() {
        let response_path = path.response(&response.status_code);
        walk_mut(NodeMut::Response(response), &response_path, visitor)?;
    }
    Ok(())
}

fn walk_parameter_mut<V: VisitorMut + ?Sized>(
    parameter: &mut Parameter,
    path: &NodePath,
    visitor: &mut V,
) -> VisitResult {
    visitor.visit_parameter_mut(parameter, path)?;
    if let Some(schema) = parameter.schema.as_mut() {
        walk_schema_mut(schema, path, visitor)?;
    }
    Ok(())
}

fn walk_schema_mut<V: VisitorMut + ?Sized>(
    schema: &mut Schema,
    path: &NodePath,
    visitor: &mut V,
) -> VisitResult {
    visitor.visit_schema_mut(schema, path)?;

    for (name, property) in schema.properties.iter_mut() {
        walk_schema_mut(property, &path.property(name), visitor)?;
    }
    if let Some(items) = schema.items.as_deref_mut() {
        walk_schema_mut(items, &path.items(), visitor)?;
    }
    for (index, branch) in schema.all_of.iter_mut().enumerate() {
        walk_schema_mut(branch, &path.branch("allOf", index), visitor)?;
    }
    for (index, branch) in schema.any_of.iter_mut().enumerate() {
        walk_schema_mut(branch, &path.branch("anyOf", index), visitor)?;
    }
    for (index, branch) in schema.one_of.iter_mut().enumerate() {
        walk_schema_mut(branch, &path.branch("oneOf", index), visitor)?;
    }
    Ok(())
}
