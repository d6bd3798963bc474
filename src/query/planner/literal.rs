// Literal Specialization
//
// This module checks a parsed literal against the declared type of the column
// it is compared with and turns it into a typed constant. Constants are
// captured by value in the comparison units built by the predicate module.

use std::cmp::Ordering;
use std::fmt;

use crate::catalog::{ColumnMetadata, DataType};
use crate::query::executor::result::{NullableText, QueryError, QueryResult};
use crate::query::parser::ast::LiteralValue;

/// A literal resolved to the value type of its column
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Integer(i32),
    Float(f32),
    Boolean(bool),
    Text(NullableText),
}

impl Constant {
    pub fn data_type(&self) -> DataType {
        match self {
            Constant::Integer(_) => DataType::Integer,
            Constant::Float(_) => DataType::Float,
            Constant::Boolean(_) => DataType::Boolean,
            Constant::Text(_) => DataType::Text,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Integer(i) => write!(f, "{}", i),
            Constant::Float(fl) => write!(f, "{:?}", fl),
            Constant::Boolean(b) => write!(f, "{}", b),
            Constant::Text(NullableText(Some(s))) => write!(f, "'{}'", s.replace('\'', "''")),
            Constant::Text(NullableText(None)) => write!(f, "null"),
        }
    }
}

/// Specialize `literal` for comparison against `column`.
///
/// Integer literals widen to float columns; no other conversion is made.
/// `null` is only accepted by text columns.
pub fn specialize<R>(column: &ColumnMetadata<R>, literal: &LiteralValue) -> QueryResult<Constant> {
    let constant = match (column.data_type(), literal) {
        (DataType::Integer, LiteralValue::Integer(i)) => Constant::Integer(*i),
        (DataType::Float, LiteralValue::Integer(i)) => Constant::Float(*i as f32),
        (DataType::Float, LiteralValue::Float(f)) => Constant::Float(*f),
        (DataType::Boolean, LiteralValue::Boolean(b)) => Constant::Boolean(*b),
        (DataType::Text, LiteralValue::String(s)) => Constant::Text(NullableText(s.clone())),
        (data_type, literal) => {
            return Err(QueryError::TypeMismatch(format!(
                "cannot compare {} column '{}' with {} literal {}",
                data_type,
                column.name(),
                literal.kind(),
                literal
            )));
        }
    };

    Ok(constant)
}

/// Total order on floats: NaN equals NaN and sorts below every number
#[inline]
pub fn compare_floats(left: f32, right: f32) -> Ordering {
    match (left.is_nan(), right.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
    }
}

/// Ordinal order on nullable text: NULL sorts before every string
#[inline]
pub fn compare_text(left: Option<&str>, right: Option<&str>) -> Ordering {
    left.cmp(&right)
}
