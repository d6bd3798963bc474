// Schema Management Module
//
// This module defines the declared value types of columns and the TableSchema
// that maps a row type's column names to their typed accessors.

use std::fmt;

use linked_hash_map::LinkedHashMap;

use super::column::ColumnMetadata;

/// Value types a column can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
        };
        f.write_str(name)
    }
}

/// The registered columns of one row type.
///
/// Columns keep their declaration order and are looked up case-insensitively.
pub struct TableSchema<R> {
    columns: LinkedHashMap<String, ColumnMetadata<R>>,
}

impl<R> Default for TableSchema<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> TableSchema<R> {
    /// Create an empty schema
    pub fn new() -> Self {
        TableSchema {
            columns: LinkedHashMap::new(),
        }
    }

    /// Add a column, replacing any earlier column with the same (case-insensitive) name
    pub fn column(mut self, column: ColumnMetadata<R>) -> Self {
        self.add_column(column);
        self
    }

    /// Add a column in place
    pub fn add_column(&mut self, column: ColumnMetadata<R>) {
        self.columns.insert(column.name().to_lowercase(), column);
    }

    /// Look up a column by name, ignoring case
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata<R>> {
        self.columns.get(&name.to_lowercase())
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &ColumnMetadata<R>> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<R> fmt::Debug for TableSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.columns.values()).finish()
    }
}
