// Query Processing Module
//
// This module contains components for query parsing, planning and execution.

// Re-export key components
pub mod parser;
pub mod planner;
pub mod executor;

// Export key public interfaces
pub use parser::{parse, ParsedQuery, Parser};
pub use executor::engine::{compile, CompiledQuery, EngineConfig, QueryEngine, QueryPlan};
pub use executor::result::{ErrorKind, QueryError, QueryResult, Shape};
