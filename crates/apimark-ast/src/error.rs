use thiserror::Error;

use crate::visit::NodeKind;

/// Infrastructure failures raised during traversal.
///
/// Data problems are reported as diagnostics, never through this type.
#[derive(Debug, Error)]
pub enum VisitError {
    /// A visitor refused to continue at the given node.
    #[error("traversal aborted at {node} {path}: {reason}")]
    Aborted {
        node: NodeKind,
        path: String,
        reason: String,
    },

    /// A transformation pass failed.
    #[error("transformation failed: {0}")]
    Transform(String),
}
