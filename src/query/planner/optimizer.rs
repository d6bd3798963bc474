// Query Optimizer Implementation
//
// Peephole rewrite over the operator chain: an adjacent Filter and Project,
// in either order, become a single FilterProject node. The rewrite only
// changes node structure; the rows a pipeline produces are unchanged.

use log::debug;

use crate::query::planner::operator::OperatorNode;

/// Applies fusion rules to compiled pipelines
pub struct Optimizer {}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer {
    /// Create a new optimizer instance
    pub fn new() -> Self {
        Optimizer {}
    }

    /// Optimize a pipeline. Running it on its own output changes nothing.
    pub fn optimize<R>(&self, plan: OperatorNode<R>) -> OperatorNode<R> {
        self.fuse(plan)
    }

    fn fuse<R>(&self, node: OperatorNode<R>) -> OperatorNode<R> {
        match node {
            OperatorNode::Filter { predicate, next } => match *next {
                OperatorNode::Project { projection, next } => {
                    debug!("Fusing Filter -> Project");
                    OperatorNode::filter_project(predicate, projection, self.fuse(*next))
                }
                other => OperatorNode::filter(predicate, self.fuse(other)),
            },
            OperatorNode::Project { projection, next } => match *next {
                OperatorNode::Filter { predicate, next } => {
                    debug!("Fusing Project -> Filter");
                    OperatorNode::filter_project(predicate, projection, self.fuse(*next))
                }
                other => OperatorNode::project(projection, self.fuse(other)),
            },
            OperatorNode::FilterProject { predicate, projection, next } => {
                OperatorNode::filter_project(predicate, projection, self.fuse(*next))
            }
            OperatorNode::Terminal => OperatorNode::Terminal,
        }
    }
}
