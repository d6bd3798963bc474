// Projection Planning
//
// A projection reshapes a row into the selected columns: a single column, or
// a tuple. Tuples hold at most seven columns directly; wider selections nest
// the remaining columns in a `rest` tuple so any width composes.

use std::fmt;

use crate::catalog::{Accessor, ColumnMetadata};
use crate::query::executor::result::{QueryError, QueryResult, Shape};

/// Columns a tuple holds before nesting the rest
pub const MAX_TUPLE_FIELDS: usize = 7;

/// Selected columns of a multi-column query
pub struct TupleProjection<R> {
    fields: Vec<ColumnMetadata<R>>,
    rest: Option<Box<TupleProjection<R>>>,
}

impl<R> TupleProjection<R> {
    /// Build a projection over `columns`, nesting beyond seven
    pub fn new(mut columns: Vec<ColumnMetadata<R>>) -> QueryResult<Self> {
        if columns.is_empty() {
            return Err(QueryError::Arity("a tuple projection needs at least one column".to_string()));
        }

        let rest = if columns.len() > MAX_TUPLE_FIELDS {
            let remaining = columns.split_off(MAX_TUPLE_FIELDS);
            Some(Box::new(TupleProjection::new(remaining)?))
        } else {
            None
        };

        Ok(TupleProjection { fields: columns, rest })
    }

    /// Directly held columns
    pub fn fields(&self) -> &[ColumnMetadata<R>] {
        &self.fields
    }

    /// Nested continuation for columns beyond the seventh
    pub fn rest(&self) -> Option<&TupleProjection<R>> {
        self.rest.as_deref()
    }

    /// Total number of columns, nested ones included
    pub fn arity(&self) -> usize {
        self.fields.len() + self.rest.as_ref().map_or(0, |rest| rest.arity())
    }

    pub fn runtime_shape(&self) -> Shape {
        self.shape(runtime_column_shape)
    }

    pub fn public_shape(&self) -> Shape {
        self.shape(public_column_shape)
    }

    fn shape(&self, column_shape: fn(&ColumnMetadata<R>) -> Shape) -> Shape {
        let mut shapes: Vec<Shape> = self.fields.iter().map(column_shape).collect();
        if let Some(rest) = &self.rest {
            shapes.push(rest.shape(column_shape));
        }
        Shape::Tuple(shapes)
    }

    fn write_columns(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", column)?;
        }
        if let Some(rest) = &self.rest {
            write!(f, ", (")?;
            rest.write_columns(f)?;
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Reshaping applied before a row is written to the result
pub enum Projection<R> {
    Column(ColumnMetadata<R>),
    Tuple(TupleProjection<R>),
}

impl<R> Projection<R> {
    /// One column projects to a scalar, several to a tuple
    pub fn from_columns(mut columns: Vec<ColumnMetadata<R>>) -> QueryResult<Self> {
        match columns.len() {
            0 => Err(QueryError::Arity("selection list is empty".to_string())),
            1 => Ok(Projection::Column(columns.remove(0))),
            _ => Ok(Projection::Tuple(TupleProjection::new(columns)?)),
        }
    }

    /// Shape of the values the runtime writes
    pub fn runtime_shape(&self) -> Shape {
        match self {
            Projection::Column(column) => runtime_column_shape(column),
            Projection::Tuple(tuple) => tuple.runtime_shape(),
        }
    }

    /// Shape the query deduces for its public result
    pub fn public_shape(&self) -> Shape {
        match self {
            Projection::Column(column) => public_column_shape(column),
            Projection::Tuple(tuple) => tuple.public_shape(),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Projection::Column(_) => 1,
            Projection::Tuple(tuple) => tuple.arity(),
        }
    }
}

impl<R> fmt::Display for Projection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Column(column) => write!(f, "{:?}", column),
            Projection::Tuple(tuple) => {
                write!(f, "(")?;
                tuple.write_columns(f)?;
                write!(f, ")")
            }
        }
    }
}

// Text always travels as nullable text at runtime
fn runtime_column_shape<R>(column: &ColumnMetadata<R>) -> Shape {
    match column.accessor() {
        Accessor::Integer(_) => Shape::Integer,
        Accessor::Float(_) => Shape::Float,
        Accessor::Boolean(_) => Shape::Boolean,
        Accessor::Text(_) | Accessor::NullableText(_) => Shape::NullableText,
    }
}

fn public_column_shape<R>(column: &ColumnMetadata<R>) -> Shape {
    match column.accessor() {
        Accessor::Integer(_) => Shape::Integer,
        Accessor::Float(_) => Shape::Float,
        Accessor::Boolean(_) => Shape::Boolean,
        Accessor::Text(_) => Shape::Text,
        Accessor::NullableText(_) => Shape::NullableText,
    }
}
