// Plan Builder
//
// Lowers a parsed query into an operator pipeline for one row type. Column
// identifiers are resolved against the row's schema and literals are
// specialized here; optimization happens afterwards.

use std::any::type_name;

use log::debug;

use super::operator::OperatorNode;
use super::predicate::Predicate;
use super::projection::Projection;
use crate::catalog::{Row, SchemaRegistry};
use crate::query::executor::result::{QueryResult, Shape};
use crate::query::parser::ast::ParsedQuery;

/// Unoptimized pipeline together with its result shapes
pub struct BuiltPlan<R> {
    pub root: OperatorNode<R>,
    pub runtime_shape: Shape,
    pub public_shape: Shape,
}

/// Builds pipelines from parsed queries
pub struct PlanBuilder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        PlanBuilder { registry }
    }

    /// Build the pipeline for `query` over rows of type `R`
    pub fn build<R: Row>(&self, query: &ParsedQuery) -> QueryResult<BuiltPlan<R>> {
        // Fail early for unregistered row types, even for SELECT *
        self.registry.schema::<R>()?;

        let (mut root, runtime_shape, public_shape) = if query.selection.select_all {
            let shape = Shape::Row(type_name::<R>());
            (OperatorNode::Terminal, shape.clone(), shape)
        } else {
            let columns = query
                .selection
                .column_identifiers
                .iter()
                .map(|identifier| self.registry.resolve_column::<R>(identifier))
                .collect::<Result<Vec<_>, _>>()?;
            let projection = Projection::from_columns(columns)?;
            let runtime_shape = projection.runtime_shape();
            let public_shape = projection.public_shape();
            debug!("Projection {} with runtime shape {}", projection, runtime_shape);
            (OperatorNode::project(projection, OperatorNode::Terminal), runtime_shape, public_shape)
        };

        if let Some(expression) = &query.where_clause {
            let predicate = Predicate::lower(expression, self.registry)?;
            root = OperatorNode::filter(predicate, root);
        }

        debug!("Built pipeline {:?}", root.node_names());
        Ok(BuiltPlan {
            root,
            runtime_shape,
            public_shape,
        })
    }
}
