// Column Metadata Module
//
// This module defines the ColumnMetadata type: a column's name together with
// the typed accessor that reads the column's value out of a row.

use std::fmt;

use super::schema::DataType;

/// Typed accessor reading one column out of a row.
///
/// Accessors are plain function pointers so that compiled pipelines can share
/// them freely across threads.
pub enum Accessor<R> {
    Integer(fn(&R) -> i32),
    Float(fn(&R) -> f32),
    Boolean(fn(&R) -> bool),
    /// Text that is never NULL
    Text(fn(&R) -> &str),
    /// Text that may be NULL
    NullableText(fn(&R) -> Option<&str>),
}

impl<R> Accessor<R> {
    /// The declared value type of the column
    pub fn data_type(&self) -> DataType {
        match self {
            Accessor::Integer(_) => DataType::Integer,
            Accessor::Float(_) => DataType::Float,
            Accessor::Boolean(_) => DataType::Boolean,
            Accessor::Text(_) | Accessor::NullableText(_) => DataType::Text,
        }
    }

    /// Read a text column as nullable text; `None` for non-text accessors
    #[inline]
    pub fn read_text<'a>(&self, row: &'a R) -> Option<Option<&'a str>> {
        match self {
            Accessor::Text(get) => Some(Some(get(row))),
            Accessor::NullableText(get) => Some(get(row)),
            _ => None,
        }
    }
}

impl<R> Clone for Accessor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Accessor<R> {}

/// A named column of a row type
pub struct ColumnMetadata<R> {
    name: &'static str,
    accessor: Accessor<R>,
}

impl<R> ColumnMetadata<R> {
    /// Create a new column
    pub fn new(name: &'static str, accessor: Accessor<R>) -> Self {
        ColumnMetadata { name, accessor }
    }

    pub fn integer(name: &'static str, get: fn(&R) -> i32) -> Self {
        Self::new(name, Accessor::Integer(get))
    }

    pub fn float(name: &'static str, get: fn(&R) -> f32) -> Self {
        Self::new(name, Accessor::Float(get))
    }

    pub fn boolean(name: &'static str, get: fn(&R) -> bool) -> Self {
        Self::new(name, Accessor::Boolean(get))
    }

    pub fn text(name: &'static str, get: fn(&R) -> &str) -> Self {
        Self::new(name, Accessor::Text(get))
    }

    pub fn nullable_text(name: &'static str, get: fn(&R) -> Option<&str>) -> Self {
        Self::new(name, Accessor::NullableText(get))
    }

    /// Get the column name as registered
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the column accessor
    pub fn accessor(&self) -> Accessor<R> {
        self.accessor
    }

    /// Get the declared value type
    pub fn data_type(&self) -> DataType {
        self.accessor.data_type()
    }
}

impl<R> Clone for ColumnMetadata<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ColumnMetadata<R> {}

impl<R> fmt::Debug for ColumnMetadata<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type())
    }
}
