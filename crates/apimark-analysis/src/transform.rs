//! In-place endpoint rewriting.

use std::fmt;

use apimark_ast::{Endpoint, NodePath, NodeValue, VisitResult, VisitorMut};
use apimark_telemetry::events;

/// A rewrite applied to each endpoint. Results of another node kind are
/// ignored.
pub type Transformation = Box<dyn Fn(NodeValue) -> NodeValue>;

/// Visitor that normalizes endpoint paths and applies [`Transformation`]s
/// in registration order.
#[derive(Default)]
pub struct TransformVisitor {
    transformations: Vec<Transformation>,
}

impl TransformVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transformation, builder style.
    pub fn with<F>(mut self, transformation: F) -> Self
    where
        F: Fn(NodeValue) -> NodeValue + 'static,
    {
        self.transformations.push(Box::new(transformation));
        self
    }

    pub fn push(&mut self, transformation: Transformation) {
        self.transformations.push(transformation);
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    /// Lowercases the endpoint path, then runs every transformation on it.
    pub fn transform_endpoint(&self, endpoint: &mut Endpoint) {
        endpoint.path = endpoint.path.to_lowercase();

        for transformation in &self.transformations {
            match transformation(NodeValue::Endpoint(endpoint.clone())) {
                NodeValue::Endpoint(rewritten) => *endpoint = rewritten,
                other => {
                    tracing::debug!(
                        event = events::TRANSFORM_IGNORED,
                        kind = %other.kind(),
                        path = %endpoint.path,
                        "transformation returned a non-endpoint node, ignoring"
                    );
                }
            }
        }
    }
}

impl fmt::Debug for TransformVisitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformVisitor")
            .field("transformations", &self.transformations.len())
            .finish()
    }
}

impl VisitorMut for TransformVisitor {
    fn visit_endpoint_mut(&mut self, endpoint: &mut Endpoint, _path: &NodePath) -> VisitResult {
        self.transform_endpoint(endpoint);
        Ok(())
    }
}
