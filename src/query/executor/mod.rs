// Query Executor Module
//
// This module is responsible for running compiled pipelines and producing
// results: the per-execution runtime buffers, the result types and their
// conversion, and the engine that compiles and executes queries.

// Re-export public components
pub mod engine;
pub mod result;
pub mod runtime;

// Export key types
pub use self::engine::{compile, CompiledQuery, EngineConfig, QueryEngine, QueryPlan};
pub use self::result::{
    Conversion, ErrorKind, Field, NullableText, QueryError, QueryOutput, QueryResult, Shape, TupleOutput,
};
pub use self::runtime::{ColumnBuffer, QueryRuntime, ResultBuffer, TupleBuffer};
