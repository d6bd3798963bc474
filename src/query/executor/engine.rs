// Query Execution Engine Implementation
//
// This module ties the pipeline stages together: compile a query once into a
// plan and a typed CompiledQuery, then execute it over any number of row
// slices.

use std::fmt;
use std::marker::PhantomData;

use log::{debug, trace};

use crate::catalog::{Row, SchemaRegistry};
use crate::query::executor::result::{Conversion, QueryError, QueryOutput, QueryResult, Shape};
use crate::query::executor::runtime::{QueryRuntime, ResultBuffer};
use crate::query::parser::Parser;
use crate::query::planner::{Optimizer, OperatorNode, PlanBuilder};

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Run the fusion optimizer after building the pipeline
    pub optimize: bool,
    /// Hand whole slices to the runtime when no predicate is involved
    pub batch_shortcut: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            optimize: true,
            batch_shortcut: true,
        }
    }
}

/// A compiled pipeline over rows of type `R`, independent of the result type
pub struct QueryPlan<R> {
    sql: String,
    root: OperatorNode<R>,
    runtime_shape: Shape,
    public_shape: Shape,
    config: EngineConfig,
}

impl<R: Row> QueryPlan<R> {
    /// Parse, build and optimize `sql`
    pub fn compile(registry: &SchemaRegistry, sql: &str, config: EngineConfig) -> QueryResult<Self> {
        let query = Parser::new(sql)?.parse_query()?;
        debug!("Parsed query: {:?}", query);

        let built = PlanBuilder::new(registry).build::<R>(&query)?;
        let root = if config.optimize {
            Optimizer::new().optimize(built.root)
        } else {
            built.root
        };
        debug!("Compiled pipeline {:?} for `{}`", root.node_names(), sql);

        Ok(QueryPlan {
            sql: sql.to_string(),
            root,
            runtime_shape: built.runtime_shape,
            public_shape: built.public_shape,
            config,
        })
    }

    /// Execute over `rows`, returning the runtime buffer
    pub fn run(&self, rows: &[R]) -> ResultBuffer<R> {
        let mut runtime = QueryRuntime::new(self.root.terminal_projection(), rows.len());
        self.root.run(rows, &mut runtime, self.config.batch_shortcut);
        let buffer = runtime.into_buffer();
        trace!("Query produced {} of {} rows", buffer.len(), rows.len());
        buffer
    }
}

impl<R> QueryPlan<R> {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn root(&self) -> &OperatorNode<R> {
        &self.root
    }

    pub fn runtime_shape(&self) -> &Shape {
        &self.runtime_shape
    }

    pub fn public_shape(&self) -> &Shape {
        &self.public_shape
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }
}

impl<R> fmt::Display for QueryPlan<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Query: {}", self.sql)?;
        writeln!(f, "Result: {} (runtime {})", self.public_shape, self.runtime_shape)?;
        write!(f, "{}", self.root)
    }
}

/// A query compiled for rows of type `R` and results of type `T`.
///
/// Immutable once built; `execute` may be called concurrently from any number
/// of threads.
pub struct CompiledQuery<R, T> {
    plan: QueryPlan<R>,
    conversion: Conversion,
    _result: PhantomData<fn() -> T>,
}

impl<R: Row, T: QueryOutput<R>> CompiledQuery<R, T> {
    /// Check the plan's public shape against `T` and plan the conversion from
    /// the runtime shape
    pub fn new(plan: QueryPlan<R>) -> QueryResult<Self> {
        let requested = T::shape();
        let mismatch = || QueryError::ShapeMismatch {
            actual: plan.public_shape().clone(),
            requested: requested.clone(),
        };
        if plan.public_shape() != &requested {
            return Err(mismatch());
        }
        let conversion = Conversion::plan(plan.runtime_shape(), &requested).ok_or_else(mismatch)?;
        debug!("Conversion from {} to {}: {:?}", plan.runtime_shape(), requested, conversion);

        Ok(CompiledQuery {
            plan,
            conversion,
            _result: PhantomData,
        })
    }

    /// Run the query over `rows`. The result keeps input order and is never
    /// longer than `rows`.
    pub fn execute(&self, rows: &[R]) -> QueryResult<Vec<T>> {
        let buffer = self.plan.run(rows);
        let actual = buffer.shape();
        T::materialize(buffer, &self.conversion).ok_or_else(|| QueryError::ShapeMismatch {
            actual,
            requested: T::shape(),
        })
    }
}

impl<R, T> CompiledQuery<R, T> {
    pub fn sql(&self) -> &str {
        self.plan.sql()
    }

    pub fn runtime_shape(&self) -> &Shape {
        self.plan.runtime_shape()
    }

    pub fn public_shape(&self) -> &Shape {
        self.plan.public_shape()
    }

    pub fn plan(&self) -> &QueryPlan<R> {
        &self.plan
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }
}

impl<R, T> fmt::Display for CompiledQuery<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plan)
    }
}

/// Compile `sql` with the default configuration
pub fn compile<R: Row, T: QueryOutput<R>>(registry: &SchemaRegistry, sql: &str) -> QueryResult<CompiledQuery<R, T>> {
    CompiledQuery::new(QueryPlan::compile(registry, sql, EngineConfig::default())?)
}

/// Owns a schema registry and compiles queries against it
#[derive(Default)]
pub struct QueryEngine {
    registry: SchemaRegistry,
    config: EngineConfig,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        QueryEngine {
            registry: SchemaRegistry::new(),
            config,
        }
    }

    /// Build an engine around an already populated registry
    pub fn with_registry(registry: SchemaRegistry, config: EngineConfig) -> Self {
        QueryEngine { registry, config }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Mutable registry access; register every row type before compiling
    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Compile a query without fixing its result type
    pub fn plan<R: Row>(&self, sql: &str) -> QueryResult<QueryPlan<R>> {
        QueryPlan::compile(&self.registry, sql, self.config)
    }

    /// Compile a query for result type `T`
    pub fn compile<R: Row, T: QueryOutput<R>>(&self, sql: &str) -> QueryResult<CompiledQuery<R, T>> {
        CompiledQuery::new(self.plan(sql)?)
    }

    /// Compile and run a query once
    pub fn execute<R: Row, T: QueryOutput<R>>(&self, sql: &str, rows: &[R]) -> QueryResult<Vec<T>> {
        self.compile::<R, T>(sql)?.execute(rows)
    }
}
