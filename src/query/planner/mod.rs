// Query Planner Module
//
// This module is responsible for translating parsed queries into executable
// operator pipelines: literal specialization, predicate lowering, projection
// planning, and the fusion optimizer.

// Re-export public components
pub mod literal;
pub mod predicate;
pub mod projection;
pub mod operator;
pub mod builder;
pub mod optimizer;

// Export key types
pub use self::builder::{BuiltPlan, PlanBuilder};
pub use self::literal::Constant;
pub use self::operator::OperatorNode;
pub use self::optimizer::Optimizer;
pub use self::predicate::{ComparisonUnit, Predicate};
pub use self::projection::{Projection, TupleProjection};
