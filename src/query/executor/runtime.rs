// Query Runtime Implementation
//
// This module defines the columnar result buffers that the pipeline's
// terminal node writes into. Every buffer is allocated with the input row
// count as its capacity; a pipeline never emits more rows than it reads, so
// the buffers never reallocate.

use std::any::type_name;
use std::fmt;

use crate::catalog::{Accessor, DataType};
use crate::query::executor::result::{NullableText, Shape};
use crate::query::planner::projection::{Projection, TupleProjection};

/// Values of one projected column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnBuffer {
    Integer(Vec<i32>),
    Float(Vec<f32>),
    Boolean(Vec<bool>),
    Text(Vec<NullableText>),
}

impl ColumnBuffer {
    /// Create an empty buffer for values of `data_type`
    pub fn with_capacity(data_type: DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Integer => ColumnBuffer::Integer(Vec::with_capacity(capacity)),
            DataType::Float => ColumnBuffer::Float(Vec::with_capacity(capacity)),
            DataType::Boolean => ColumnBuffer::Boolean(Vec::with_capacity(capacity)),
            DataType::Text => ColumnBuffer::Text(Vec::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnBuffer::Integer(v) => v.len(),
            ColumnBuffer::Float(v) => v.len(),
            ColumnBuffer::Boolean(v) => v.len(),
            ColumnBuffer::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match self {
            ColumnBuffer::Integer(v) => v.capacity(),
            ColumnBuffer::Float(v) => v.capacity(),
            ColumnBuffer::Boolean(v) => v.capacity(),
            ColumnBuffer::Text(v) => v.capacity(),
        }
    }

    /// Runtime shape of the values
    pub fn shape(&self) -> Shape {
        match self {
            ColumnBuffer::Integer(_) => Shape::Integer,
            ColumnBuffer::Float(_) => Shape::Float,
            ColumnBuffer::Boolean(_) => Shape::Boolean,
            ColumnBuffer::Text(_) => Shape::NullableText,
        }
    }

    /// Read one column value of `row` into the buffer
    #[inline]
    fn push<R>(&mut self, accessor: Accessor<R>, row: &R) {
        match (self, accessor) {
            (ColumnBuffer::Integer(v), Accessor::Integer(get)) => v.push(get(row)),
            (ColumnBuffer::Float(v), Accessor::Float(get)) => v.push(get(row)),
            (ColumnBuffer::Boolean(v), Accessor::Boolean(get)) => v.push(get(row)),
            (ColumnBuffer::Text(v), Accessor::Text(get)) => v.push(NullableText::from(get(row))),
            (ColumnBuffer::Text(v), Accessor::NullableText(get)) => {
                v.push(NullableText::from(get(row)))
            }
            _ => unreachable!("column buffer does not match its projection"),
        }
    }

    /// Read one column of every row into the buffer
    fn extend<R>(&mut self, accessor: Accessor<R>, rows: &[R]) {
        match (self, accessor) {
            (ColumnBuffer::Integer(v), Accessor::Integer(get)) => v.extend(rows.iter().map(get)),
            (ColumnBuffer::Float(v), Accessor::Float(get)) => v.extend(rows.iter().map(get)),
            (ColumnBuffer::Boolean(v), Accessor::Boolean(get)) => v.extend(rows.iter().map(get)),
            (ColumnBuffer::Text(v), Accessor::Text(get)) => {
                v.extend(rows.iter().map(|row| NullableText::from(get(row))))
            }
            (ColumnBuffer::Text(v), Accessor::NullableText(get)) => {
                v.extend(rows.iter().map(|row| NullableText::from(get(row))))
            }
            _ => unreachable!("column buffer does not match its projection"),
        }
    }

    fn format_value(&self, index: usize) -> Option<String> {
        match self {
            ColumnBuffer::Integer(v) => v.get(index).map(|x| x.to_string()),
            ColumnBuffer::Float(v) => v.get(index).map(|x| x.to_string()),
            ColumnBuffer::Boolean(v) => v.get(index).map(|x| x.to_string()),
            ColumnBuffer::Text(v) => v.get(index).map(|x| x.to_string()),
        }
    }
}

/// Column buffers of a tuple projection, mirroring its head/rest nesting
#[derive(Debug, Clone, PartialEq)]
pub struct TupleBuffer {
    pub fields: Vec<ColumnBuffer>,
    pub rest: Option<Box<TupleBuffer>>,
}

impl TupleBuffer {
    fn for_projection<R>(projection: &TupleProjection<R>, capacity: usize) -> Self {
        TupleBuffer {
            fields: projection
                .fields()
                .iter()
                .map(|column| ColumnBuffer::with_capacity(column.data_type(), capacity))
                .collect(),
            rest: projection
                .rest()
                .map(|rest| Box::new(TupleBuffer::for_projection(rest, capacity))),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.first().map_or(0, ColumnBuffer::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> Shape {
        let mut fields: Vec<Shape> = self.fields.iter().map(ColumnBuffer::shape).collect();
        if let Some(rest) = &self.rest {
            fields.push(rest.shape());
        }
        Shape::Tuple(fields)
    }

    fn push<R>(&mut self, projection: &TupleProjection<R>, row: &R) {
        for (buffer, column) in self.fields.iter_mut().zip(projection.fields()) {
            buffer.push(column.accessor(), row);
        }
        match (&mut self.rest, projection.rest()) {
            (Some(buffer), Some(rest)) => buffer.push(rest, row),
            (None, None) => {}
            _ => unreachable!("tuple buffer does not match its projection"),
        }
    }

    fn extend<R>(&mut self, projection: &TupleProjection<R>, rows: &[R]) {
        for (buffer, column) in self.fields.iter_mut().zip(projection.fields()) {
            buffer.extend(column.accessor(), rows);
        }
        match (&mut self.rest, projection.rest()) {
            (Some(buffer), Some(rest)) => buffer.extend(rest, rows),
            (None, None) => {}
            _ => unreachable!("tuple buffer does not match its projection"),
        }
    }

    fn format_values(&self, index: usize, out: &mut Vec<String>) {
        out.extend(self.fields.iter().filter_map(|f| f.format_value(index)));
        if let Some(rest) = &self.rest {
            rest.format_values(index, out);
        }
    }
}

/// Result of running a pipeline, before conversion to the requested type
#[derive(Debug, Clone, PartialEq)]
pub enum ResultBuffer<R> {
    /// Whole rows, for `SELECT *`
    Rows(Vec<R>),
    Column(ColumnBuffer),
    Tuple(TupleBuffer),
}

impl<R> ResultBuffer<R> {
    /// Allocate the buffer the given terminal projection writes into
    pub fn for_projection(projection: Option<&Projection<R>>, capacity: usize) -> Self {
        match projection {
            None => ResultBuffer::Rows(Vec::with_capacity(capacity)),
            Some(Projection::Column(column)) => {
                ResultBuffer::Column(ColumnBuffer::with_capacity(column.data_type(), capacity))
            }
            Some(Projection::Tuple(tuple)) => {
                ResultBuffer::Tuple(TupleBuffer::for_projection(tuple, capacity))
            }
        }
    }

    /// Number of result rows
    pub fn len(&self) -> usize {
        match self {
            ResultBuffer::Rows(rows) => rows.len(),
            ResultBuffer::Column(column) => column.len(),
            ResultBuffer::Tuple(tuple) => tuple.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runtime shape of the buffered values
    pub fn shape(&self) -> Shape {
        match self {
            ResultBuffer::Rows(_) => Shape::Row(type_name::<R>()),
            ResultBuffer::Column(column) => column.shape(),
            ResultBuffer::Tuple(tuple) => tuple.shape(),
        }
    }
}

impl<R: fmt::Debug> ResultBuffer<R> {
    /// Render one result row as text
    pub fn format_row(&self, index: usize) -> Option<String> {
        match self {
            ResultBuffer::Rows(rows) => rows.get(index).map(|row| format!("{:?}", row)),
            ResultBuffer::Column(column) => column.format_value(index),
            ResultBuffer::Tuple(tuple) => {
                if index >= tuple.len() {
                    return None;
                }
                let mut values = Vec::new();
                tuple.format_values(index, &mut values);
                Some(format!("({})", values.join(", ")))
            }
        }
    }
}

/// Per-execution state: the buffer being filled.
///
/// One runtime is created for every execution, so concurrent executions of a
/// compiled query share nothing mutable.
pub struct QueryRuntime<R> {
    buffer: ResultBuffer<R>,
}

impl<R: Clone> QueryRuntime<R> {
    /// Create a runtime whose buffer fits `projection` and `capacity` rows
    pub fn new(projection: Option<&Projection<R>>, capacity: usize) -> Self {
        QueryRuntime {
            buffer: ResultBuffer::for_projection(projection, capacity),
        }
    }

    /// Append one row, projected by `projection` or whole when `None`
    #[inline]
    pub fn emit(&mut self, row: &R, projection: Option<&Projection<R>>) {
        match (&mut self.buffer, projection) {
            (ResultBuffer::Rows(rows), None) => rows.push(row.clone()),
            (ResultBuffer::Column(buffer), Some(Projection::Column(column))) => {
                buffer.push(column.accessor(), row)
            }
            (ResultBuffer::Tuple(buffer), Some(Projection::Tuple(tuple))) => buffer.push(tuple, row),
            _ => unreachable!("result buffer does not match the terminal projection"),
        }
    }

    /// Append every row of a slice
    pub fn emit_all(&mut self, rows: &[R], projection: Option<&Projection<R>>) {
        match (&mut self.buffer, projection) {
            (ResultBuffer::Rows(buffer), None) => buffer.extend_from_slice(rows),
            (ResultBuffer::Column(buffer), Some(Projection::Column(column))) => {
                buffer.extend(column.accessor(), rows)
            }
            (ResultBuffer::Tuple(buffer), Some(Projection::Tuple(tuple))) => {
                buffer.extend(tuple, rows)
            }
            _ => unreachable!("result buffer does not match the terminal projection"),
        }
    }

    pub fn buffer(&self) -> &ResultBuffer<R> {
        &self.buffer
    }

    pub fn into_buffer(self) -> ResultBuffer<R> {
        self.buffer
    }
}
