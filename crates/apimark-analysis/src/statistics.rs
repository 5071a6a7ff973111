//! Counters over a document's endpoints, parameters and schemas.

use std::collections::BTreeMap;

use apimark_ast::{
    Component, Document, Endpoint, NodePath, Parameter, Response, Schema, VisitResult, Visitor,
};
use serde::Serialize;

/// Totals produced by a [`StatisticsVisitor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_endpoints: usize,
    /// Endpoint count keyed by method.
    pub endpoints_by_method: BTreeMap<String, usize>,
    pub total_parameters: usize,
    /// Parameter count keyed by declared type.
    pub parameters_by_type: BTreeMap<String, usize>,
    pub total_schemas: usize,
    /// Schema count keyed by schema type; untyped schemas count under "".
    pub schemas_by_type: BTreeMap<String, usize>,
    /// Deepest [`Schema::depth`] seen anywhere in the document.
    pub max_schema_depth: usize,
    pub has_frontmatter: bool,
    /// Mean endpoint path length in characters, `0.0` without endpoints.
    pub average_path_length: f64,
    pub total_responses: usize,
    pub total_components: usize,
}

#[derive(Debug, Default)]
pub struct StatisticsVisitor {
    stats: Statistics,
    total_path_length: usize,
}

impl StatisticsVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the totals with the average path length filled in.
    pub fn finish(mut self) -> Statistics {
        if self.stats.total_endpoints > 0 {
            self.stats.average_path_length =
                self.total_path_length as f64 / self.stats.total_endpoints as f64;
        }
        self.stats
    }
}

impl Visitor for StatisticsVisitor {
    fn visit_document(&mut self, document: &Document, _path: &NodePath) -> VisitResult {
        self.stats.has_frontmatter = document.frontmatter.is_some();
        Ok(())
    }

    fn visit_endpoint(&mut self, endpoint: &Endpoint, _path: &NodePath) -> VisitResult {
        self.stats.total_endpoints += 1;
        *self
            .stats
            .endpoints_by_method
            .entry(endpoint.method.clone())
            .or_default() += 1;
        self.total_path_length += endpoint.path.chars().count();
        Ok(())
    }

    fn visit_parameter(&mut self, parameter: &Parameter, _path: &NodePath) -> VisitResult {
        self.stats.total_parameters += 1;
        *self
            .stats
            .parameters_by_type
            .entry(parameter.param_type.clone())
            .or_default() += 1;
        Ok(())
    }

    fn visit_response(&mut self, _response: &Response, _path: &NodePath) -> VisitResult {
        self.stats.total_responses += 1;
        Ok(())
    }

    fn visit_schema(&mut self, schema: &Schema, _path: &NodePath) -> VisitResult {
        self.stats.total_schemas += 1;
        *self
            .stats
            .schemas_by_type
            .entry(schema.schema_type.clone())
            .or_default() += 1;
        self.stats.max_schema_depth = self.stats.max_schema_depth.max(schema.depth());
        Ok(())
    }

    fn visit_component(&mut self, _component: &Component, _path: &NodePath) -> VisitResult {
        self.stats.total_components += 1;
        Ok(())
    }
}
