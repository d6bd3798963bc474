// Query Result Implementation
//
// This module defines the error types of the query pipeline, the describable
// result shapes, and the conversion from the runtime buffer into the result
// type requested by the caller.

use std::any::type_name;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::{Row, SchemaError};
use crate::query::executor::runtime::{ColumnBuffer, ResultBuffer, TupleBuffer};
use crate::query::parser::ParseError;

/// Broad category of a query failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed token stream
    Syntax,
    /// Wrong source table or malformed selection list
    Semantic,
    /// Literal text that is not a supported value
    Literal,
    /// Row type has no registered schema
    Schema,
    UnknownColumn,
    TypeMismatch,
    ShapeMismatch,
    Arity,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Semantic => "SemanticError",
            ErrorKind::Literal => "LiteralError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::UnknownColumn => "UnknownColumnError",
            ErrorKind::TypeMismatch => "TypeMismatchError",
            ErrorKind::ShapeMismatch => "ShapeMismatchError",
            ErrorKind::Arity => "ArityError",
        };
        f.write_str(name)
    }
}

/// Error type for compiling and executing queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Query produces {actual} but {requested} was requested")]
    ShapeMismatch { actual: Shape, requested: Shape },

    #[error("Arity error: {0}")]
    Arity(String),
}

impl QueryError {
    /// Error category of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Parse(e) => e.kind(),
            QueryError::Schema(SchemaError::NotRegistered(_)) => ErrorKind::Schema,
            QueryError::Schema(SchemaError::UnknownColumn { .. }) => ErrorKind::UnknownColumn,
            QueryError::TypeMismatch(_) => ErrorKind::TypeMismatch,
            QueryError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            QueryError::Arity(_) => ErrorKind::Arity,
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Describable shape of a query result element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Shape {
    /// The whole row, by row type name
    Row(&'static str),
    Integer,
    Float,
    Boolean,
    /// Text from a column that never holds NULL
    Text,
    /// Text from a nullable column
    NullableText,
    /// Up to 7 fields; an 8th field is always the nested rest of a wider tuple
    Tuple(Vec<Shape>),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Row(name) => f.write_str(name),
            Shape::Integer => f.write_str("i32"),
            Shape::Float => f.write_str("f32"),
            Shape::Boolean => f.write_str("bool"),
            Shape::Text => f.write_str("String"),
            Shape::NullableText => f.write_str("Option<String>"),
            Shape::Tuple(fields) => {
                write!(f, "(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                if fields.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Text value carried through the pipeline; `None` is SQL NULL.
///
/// Ordering is ordinal on the UTF-8 bytes with NULL before every string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NullableText(pub Option<String>);

impl NullableText {
    pub fn null() -> Self {
        NullableText(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Public text value; NULL becomes an empty string
    pub fn into_string(self) -> String {
        self.0.unwrap_or_default()
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl From<&str> for NullableText {
    fn from(value: &str) -> Self {
        NullableText(Some(value.to_string()))
    }
}

impl From<Option<&str>> for NullableText {
    fn from(value: Option<&str>) -> Self {
        NullableText(value.map(str::to_string))
    }
}

impl fmt::Display for NullableText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "NULL"),
        }
    }
}

/// Conversion from the runtime shape to the requested shape, planned once per
/// compiled query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Shapes agree; the buffer is handed over as is
    Identity,
    /// Nullable text to plain text
    UnwrapText,
    /// Field by field, the 8th entry converting the nested rest
    Tuple(Vec<Conversion>),
}

impl Conversion {
    /// Plan the conversion, or `None` if the shapes are incompatible
    pub fn plan(runtime: &Shape, requested: &Shape) -> Option<Conversion> {
        match (runtime, requested) {
            (Shape::Tuple(actual), Shape::Tuple(wanted)) if actual.len() == wanted.len() => actual
                .iter()
                .zip(wanted)
                .map(|(a, w)| Conversion::plan(a, w))
                .collect::<Option<Vec<_>>>()
                .map(Conversion::Tuple),
            (Shape::Tuple(_), _) | (_, Shape::Tuple(_)) => None,
            (actual, wanted) if actual == wanted => Some(Conversion::Identity),
            (Shape::NullableText, Shape::Text) => Some(Conversion::UnwrapText),
            _ => None,
        }
    }
}

/// A type that compiled queries over rows of type `R` can return.
///
/// Implemented for the scalar column types, tuples of them, and the row type
/// itself.
pub trait QueryOutput<R>: Sized + Send + 'static {
    /// Shape this type requests
    fn shape() -> Shape;

    /// Convert a runtime buffer; `None` if the buffer layout does not fit
    fn materialize(buffer: ResultBuffer<R>, conversion: &Conversion) -> Option<Vec<Self>>;
}

/// A scalar that can be read out of a single column buffer
pub trait Field: Sized + Send + 'static {
    fn shape() -> Shape;

    fn take_column(column: ColumnBuffer, conversion: &Conversion) -> Option<Vec<Self>>;
}

impl Field for i32 {
    fn shape() -> Shape {
        Shape::Integer
    }

    fn take_column(column: ColumnBuffer, conversion: &Conversion) -> Option<Vec<Self>> {
        match (column, conversion) {
            (ColumnBuffer::Integer(values), Conversion::Identity) => Some(values),
            _ => None,
        }
    }
}

impl Field for f32 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn take_column(column: ColumnBuffer, conversion: &Conversion) -> Option<Vec<Self>> {
        match (column, conversion) {
            (ColumnBuffer::Float(values), Conversion::Identity) => Some(values),
            _ => None,
        }
    }
}

impl Field for bool {
    fn shape() -> Shape {
        Shape::Boolean
    }

    fn take_column(column: ColumnBuffer, conversion: &Conversion) -> Option<Vec<Self>> {
        match (column, conversion) {
            (ColumnBuffer::Boolean(values), Conversion::Identity) => Some(values),
            _ => None,
        }
    }
}

impl Field for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn take_column(column: ColumnBuffer, conversion: &Conversion) -> Option<Vec<Self>> {
        match (column, conversion) {
            (ColumnBuffer::Text(values), Conversion::UnwrapText) => {
                Some(values.into_iter().map(NullableText::into_string).collect())
            }
            _ => None,
        }
    }
}

impl Field for Option<String> {
    fn shape() -> Shape {
        Shape::NullableText
    }

    fn take_column(column: ColumnBuffer, conversion: &Conversion) -> Option<Vec<Self>> {
        match (column, conversion) {
            (ColumnBuffer::Text(values), Conversion::Identity) => {
                Some(values.into_iter().map(NullableText::into_inner).collect())
            }
            _ => None,
        }
    }
}

macro_rules! scalar_output {
    ($($t:ty),+) => {
        $(
            impl<R> QueryOutput<R> for $t {
                fn shape() -> Shape {
                    <$t as Field>::shape()
                }

                fn materialize(buffer: ResultBuffer<R>, conversion: &Conversion) -> Option<Vec<Self>> {
                    match buffer {
                        ResultBuffer::Column(column) => <$t as Field>::take_column(column, conversion),
                        _ => None,
                    }
                }
            }
        )+
    };
}

scalar_output!(i32, f32, bool, String, Option<String>);

/// A tuple that can be assembled from a tuple buffer
pub trait TupleOutput: Sized + Send + 'static {
    fn shape() -> Shape;

    fn take_tuple(buffer: TupleBuffer, conversions: &[Conversion]) -> Option<Vec<Self>>;
}

macro_rules! tuple_output {
    ($($name:ident $var:ident),+) => {
        impl<$($name: Field),+> TupleOutput for ($($name,)+) {
            fn shape() -> Shape {
                Shape::Tuple(vec![$(<$name as Field>::shape()),+])
            }

            fn take_tuple(buffer: TupleBuffer, conversions: &[Conversion]) -> Option<Vec<Self>> {
                let TupleBuffer { fields, rest } = buffer;
                if rest.is_some() {
                    return None;
                }

                let len = fields.first().map_or(0, ColumnBuffer::len);
                let mut fields = fields.into_iter();
                let mut conversions = conversions.iter();
                $(
                    let mut $var = $name::take_column(fields.next()?, conversions.next()?)?.into_iter();
                )+
                if fields.next().is_some() {
                    return None;
                }

                (0..len).map(|_| Some(($($var.next()?,)+))).collect()
            }
        }

        impl<R, $($name: Field),+> QueryOutput<R> for ($($name,)+) {
            fn shape() -> Shape {
                <Self as TupleOutput>::shape()
            }

            fn materialize(buffer: ResultBuffer<R>, conversion: &Conversion) -> Option<Vec<Self>> {
                match (buffer, conversion) {
                    (ResultBuffer::Tuple(tuple), Conversion::Tuple(conversions)) => {
                        <Self as TupleOutput>::take_tuple(tuple, conversions)
                    }
                    _ => None,
                }
            }
        }
    };
}

tuple_output!(A a);
tuple_output!(A a, B b);
tuple_output!(A a, B b, C c);
tuple_output!(A a, B b, C c, D d);
tuple_output!(A a, B b, C c, D d, E e);
tuple_output!(A a, B b, C c, D d, E e, F f);
tuple_output!(A a, B b, C c, D d, E e, F f, G g);

// Eight fields: seven columns followed by the nested rest of a wider tuple
impl<A, B, C, D, E, F, G, Rest> TupleOutput for (A, B, C, D, E, F, G, Rest)
where
    A: Field,
    B: Field,
    C: Field,
    D: Field,
    E: Field,
    F: Field,
    G: Field,
    Rest: TupleOutput,
{
    fn shape() -> Shape {
        Shape::Tuple(vec![
            A::shape(),
            B::shape(),
            C::shape(),
            D::shape(),
            E::shape(),
            F::shape(),
            G::shape(),
            Rest::shape(),
        ])
    }

    fn take_tuple(buffer: TupleBuffer, conversions: &[Conversion]) -> Option<Vec<Self>> {
        let TupleBuffer { fields, rest } = buffer;
        let rest = rest?;
        if fields.len() != 7 || conversions.len() != 8 {
            return None;
        }

        let len = fields.first().map_or(0, ColumnBuffer::len);
        let mut fields = fields.into_iter();
        let mut conv = conversions.iter();
        let mut a = A::take_column(fields.next()?, conv.next()?)?.into_iter();
        let mut b = B::take_column(fields.next()?, conv.next()?)?.into_iter();
        let mut c = C::take_column(fields.next()?, conv.next()?)?.into_iter();
        let mut d = D::take_column(fields.next()?, conv.next()?)?.into_iter();
        let mut e = E::take_column(fields.next()?, conv.next()?)?.into_iter();
        let mut f = F::take_column(fields.next()?, conv.next()?)?.into_iter();
        let mut g = G::take_column(fields.next()?, conv.next()?)?.into_iter();
        let mut rest = match conv.next()? {
            Conversion::Tuple(inner) => Rest::take_tuple(*rest, inner)?.into_iter(),
            _ => return None,
        };

        (0..len)
            .map(|_| {
                Some((
                    a.next()?,
                    b.next()?,
                    c.next()?,
                    d.next()?,
                    e.next()?,
                    f.next()?,
                    g.next()?,
                    rest.next()?,
                ))
            })
            .collect()
    }
}

impl<R, A, B, C, D, E, F, G, Rest> QueryOutput<R> for (A, B, C, D, E, F, G, Rest)
where
    A: Field,
    B: Field,
    C: Field,
    D: Field,
    E: Field,
    F: Field,
    G: Field,
    Rest: TupleOutput,
{
    fn shape() -> Shape {
        <Self as TupleOutput>::shape()
    }

    fn materialize(buffer: ResultBuffer<R>, conversion: &Conversion) -> Option<Vec<Self>> {
        match (buffer, conversion) {
            (ResultBuffer::Tuple(tuple), Conversion::Tuple(conversions)) => {
                <Self as TupleOutput>::take_tuple(tuple, conversions)
            }
            _ => None,
        }
    }
}

/// The whole row, returned by `SELECT *`
impl<R: Row> QueryOutput<R> for R {
    fn shape() -> Shape {
        Shape::Row(type_name::<R>())
    }

    fn materialize(buffer: ResultBuffer<R>, conversion: &Conversion) -> Option<Vec<Self>> {
        match (buffer, conversion) {
            (ResultBuffer::Rows(rows), Conversion::Identity) => Some(rows),
            _ => None,
        }
    }
}
