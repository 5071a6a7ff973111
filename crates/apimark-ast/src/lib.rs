//! Document model for structured API documentation.
//!
//! A [`Document`] is the in-memory tree one Markdown API description is
//! extracted into. It is walked in a fixed order through the [`Visitor`]
//! and [`VisitorMut`] traits; see [`visit`] for the traversal contract.

pub mod error;
pub mod model;
pub mod visit;

pub use error::VisitError;
pub use model::{
    Component, Document, Endpoint, Frontmatter, Header, Parameter, RequestBody, Response, Schema,
    Server,
};
pub use visit::{
    walk, walk_mut, BaseVisitor, Node, NodeKind, NodeMut, NodePath, NodeValue, VisitResult,
    Visitor, VisitorMut,
};
