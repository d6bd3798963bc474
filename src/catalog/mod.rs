//! Catalog Management Module
//!
//! This module holds the schema registry: for every row type it maps column
//! names to typed accessors and declared value types.
//!
//! The registry is an explicit object handed to the compiler rather than
//! process-wide state. It follows a single-writer-before-any-reader contract:
//! register every row type first (through `&mut self`), then share the registry
//! read-only with any number of compiling threads. Registration is not guarded
//! internally.

pub mod column;
pub mod schema;

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use log::debug;
use thiserror::Error;

// Re-export key types
pub use self::column::{Accessor, ColumnMetadata};
pub use self::schema::{DataType, TableSchema};

/// Marker for types that can be queried as rows.
///
/// Implementing it also lets callers request the whole row as the result of
/// `SELECT *`.
pub trait Row: Clone + Send + Sync + 'static {}

/// Errors raised by schema lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema for row type '{0}' has not been registered")]
    NotRegistered(&'static str),
    #[error("Column '{column}' is not registered for row type '{row_type}'")]
    UnknownColumn {
        column: String,
        row_type: &'static str,
    },
}

/// Result type for schema lookups
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Registry of row schemas keyed by row type
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        SchemaRegistry {
            schemas: HashMap::new(),
        }
    }

    /// Register the schema for row type `R`, replacing any earlier registration
    pub fn register<R: 'static>(&mut self, schema: TableSchema<R>) {
        debug!(
            "Registering {} columns for row type {}",
            schema.len(),
            type_name::<R>()
        );
        self.schemas.insert(TypeId::of::<R>(), Box::new(schema));
    }

    /// Check if row type `R` has a schema
    pub fn is_registered<R: 'static>(&self) -> bool {
        self.schemas.contains_key(&TypeId::of::<R>())
    }

    /// Get the schema registered for row type `R`
    pub fn schema<R: 'static>(&self) -> SchemaResult<&TableSchema<R>> {
        self.schemas
            .get(&TypeId::of::<R>())
            .and_then(|schema| schema.downcast_ref::<TableSchema<R>>())
            .ok_or(SchemaError::NotRegistered(type_name::<R>()))
    }

    /// Resolve a column identifier of row type `R`, ignoring case
    pub fn resolve_column<R: 'static>(&self, identifier: &str) -> SchemaResult<ColumnMetadata<R>> {
        let schema = self.schema::<R>()?;
        schema
            .get_column(identifier)
            .copied()
            .ok_or_else(|| SchemaError::UnknownColumn {
                column: identifier.to_string(),
                row_type: type_name::<R>(),
            })
    }
}
