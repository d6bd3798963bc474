// TypedSQL Query Engine
//
// Compiles a small SQL dialect into specialized pipelines over in-memory rows
// and returns typed results.

pub mod catalog;
pub mod demo;
pub mod query;

// Re-export key items for convenient access
pub use catalog::{ColumnMetadata, DataType, Row, SchemaError, SchemaRegistry, TableSchema};
pub use query::executor::engine::{compile, CompiledQuery, EngineConfig, QueryEngine, QueryPlan};
pub use query::executor::result::{ErrorKind, NullableText, QueryError, QueryOutput, QueryResult, Shape};
pub use query::parser::Parser;
