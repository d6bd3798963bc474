// Predicate Lowering
//
// This module lowers a WHERE expression into a tree of specialized
// comparison units. Each unit is a closure built for one column accessor, one
// operator and one constant, so evaluation never inspects the literal or the
// operator again.

use std::cmp::Ordering;
use std::fmt;

use log::debug;

use super::literal::{Constant, compare_floats, compare_text, specialize};
use crate::catalog::{Accessor, ColumnMetadata, SchemaRegistry};
use crate::query::executor::result::{QueryError, QueryResult};
use crate::query::parser::ast::{ComparisonOperator, LiteralValue, WhereExpression};

/// Compiled test of one row
pub type RowTest<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

/// A comparison operator known at compile time
pub trait CompareOp: Send + Sync + 'static {
    const OPERATOR: ComparisonOperator;

    fn test(ordering: Ordering) -> bool;
}

/// Zero-sized operator markers
pub mod op {
    use super::*;

    macro_rules! compare_op {
        ($name:ident, $variant:ident, $pattern:pat) => {
            pub struct $name;

            impl CompareOp for $name {
                const OPERATOR: ComparisonOperator = ComparisonOperator::$variant;

                #[inline(always)]
                fn test(ordering: Ordering) -> bool {
                    matches!(ordering, $pattern)
                }
            }
        };
    }

    compare_op!(Equals, Equals, Ordering::Equal);
    compare_op!(GreaterThan, GreaterThan, Ordering::Greater);
    compare_op!(LessThan, LessThan, Ordering::Less);
    compare_op!(GreaterOrEqual, GreaterOrEqual, Ordering::Greater | Ordering::Equal);
    compare_op!(LessOrEqual, LessOrEqual, Ordering::Less | Ordering::Equal);
    compare_op!(NotEqual, NotEqual, Ordering::Less | Ordering::Greater);
}

/// Build the test for `accessor <O> constant`
fn specialize_test<R: 'static, O: CompareOp>(accessor: Accessor<R>, constant: &Constant) -> Option<RowTest<R>> {
    let test: RowTest<R> = match (accessor, constant.clone()) {
        (Accessor::Integer(get), Constant::Integer(c)) => Box::new(move |row: &R| O::test(get(row).cmp(&c))),
        (Accessor::Float(get), Constant::Float(c)) => {
            Box::new(move |row: &R| O::test(compare_floats(get(row), c)))
        }
        (Accessor::Boolean(get), Constant::Boolean(c)) => Box::new(move |row: &R| O::test(get(row).cmp(&c))),
        (Accessor::Text(get), Constant::Text(c)) => {
            Box::new(move |row: &R| O::test(compare_text(Some(get(row)), c.as_deref())))
        }
        (Accessor::NullableText(get), Constant::Text(c)) => {
            Box::new(move |row: &R| O::test(compare_text(get(row), c.as_deref())))
        }
        _ => return None,
    };

    Some(test)
}

fn comparison_test<R: 'static>(
    operator: ComparisonOperator,
    accessor: Accessor<R>,
    constant: &Constant,
) -> Option<RowTest<R>> {
    match operator {
        ComparisonOperator::Equals => specialize_test::<R, op::Equals>(accessor, constant),
        ComparisonOperator::GreaterThan => specialize_test::<R, op::GreaterThan>(accessor, constant),
        ComparisonOperator::LessThan => specialize_test::<R, op::LessThan>(accessor, constant),
        ComparisonOperator::GreaterOrEqual => specialize_test::<R, op::GreaterOrEqual>(accessor, constant),
        ComparisonOperator::LessOrEqual => specialize_test::<R, op::LessOrEqual>(accessor, constant),
        ComparisonOperator::NotEqual => specialize_test::<R, op::NotEqual>(accessor, constant),
    }
}

/// One specialized `column operator literal` test
pub struct ComparisonUnit<R> {
    /// Column identifier as written in the query
    identifier: String,
    column: ColumnMetadata<R>,
    operator: ComparisonOperator,
    literal: LiteralValue,
    constant: Constant,
    test: RowTest<R>,
}

impl<R: 'static> ComparisonUnit<R> {
    /// Specialize a comparison of `column` with `literal`
    pub fn new(
        identifier: &str,
        column: ColumnMetadata<R>,
        operator: ComparisonOperator,
        literal: &LiteralValue,
    ) -> QueryResult<Self> {
        let constant = specialize(&column, literal)?;
        let test = comparison_test(operator, column.accessor(), &constant).ok_or_else(|| {
            QueryError::TypeMismatch(format!(
                "operator {} is not supported for {} column '{}'",
                operator,
                column.data_type(),
                column.name()
            ))
        })?;

        Ok(ComparisonUnit {
            identifier: identifier.to_string(),
            column,
            operator,
            literal: literal.clone(),
            constant,
            test,
        })
    }
}

impl<R> ComparisonUnit<R> {
    #[inline]
    pub fn evaluate(&self, row: &R) -> bool {
        (self.test)(row)
    }

    pub fn column(&self) -> &ColumnMetadata<R> {
        &self.column
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn constant(&self) -> &Constant {
        &self.constant
    }
}

impl<R> fmt::Display for ComparisonUnit<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.identifier, self.operator, self.literal)
    }
}

/// Lowered WHERE clause
pub enum Predicate<R> {
    Comparison(ComparisonUnit<R>),
    And(Box<Predicate<R>>, Box<Predicate<R>>),
    Or(Box<Predicate<R>>, Box<Predicate<R>>),
    Not(Box<Predicate<R>>),
}

impl<R: 'static> Predicate<R> {
    /// Lower an expression, resolving every column against the schema of `R`
    pub fn lower(expression: &WhereExpression, registry: &SchemaRegistry) -> QueryResult<Self> {
        let predicate = match expression {
            WhereExpression::Comparison { column, operator, literal } => {
                let metadata = registry.resolve_column::<R>(column)?;
                let unit = ComparisonUnit::new(column, metadata, *operator, literal)?;
                debug!("Specialized comparison {} as {} {}", unit, metadata.data_type(), unit.constant());
                Predicate::Comparison(unit)
            }
            WhereExpression::And(left, right) => Predicate::And(
                Box::new(Self::lower(left, registry)?),
                Box::new(Self::lower(right, registry)?),
            ),
            WhereExpression::Or(left, right) => Predicate::Or(
                Box::new(Self::lower(left, registry)?),
                Box::new(Self::lower(right, registry)?),
            ),
            WhereExpression::Not(inner) => Predicate::Not(Box::new(Self::lower(inner, registry)?)),
        };

        Ok(predicate)
    }
}

impl<R> Predicate<R> {
    /// Evaluate with short-circuit AND / OR
    #[inline]
    pub fn evaluate(&self, row: &R) -> bool {
        match self {
            Predicate::Comparison(unit) => unit.evaluate(row),
            Predicate::And(left, right) => left.evaluate(row) && right.evaluate(row),
            Predicate::Or(left, right) => left.evaluate(row) || right.evaluate(row),
            Predicate::Not(inner) => !inner.evaluate(row),
        }
    }

    /// Comparison units in left-to-right order
    pub fn units(&self) -> Vec<&ComparisonUnit<R>> {
        let mut units = Vec::new();
        self.collect_units(&mut units);
        units
    }

    fn collect_units<'a>(&'a self, units: &mut Vec<&'a ComparisonUnit<R>>) {
        match self {
            Predicate::Comparison(unit) => units.push(unit),
            Predicate::And(left, right) | Predicate::Or(left, right) => {
                left.collect_units(units);
                right.collect_units(units);
            }
            Predicate::Not(inner) => inner.collect_units(units),
        }
    }

    /// Rebuild the expression this predicate was lowered from
    pub fn to_expression(&self) -> WhereExpression {
        match self {
            Predicate::Comparison(unit) => {
                WhereExpression::comparison(&unit.identifier, unit.operator, unit.literal.clone())
            }
            Predicate::And(left, right) => WhereExpression::and(left.to_expression(), right.to_expression()),
            Predicate::Or(left, right) => WhereExpression::or(left.to_expression(), right.to_expression()),
            Predicate::Not(inner) => WhereExpression::not(inner.to_expression()),
        }
    }
}

/// Query text of the predicate; parsing it yields the original tree
impl<R> fmt::Display for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison(unit) => write!(f, "{}", unit),
            Predicate::And(left, right) => write!(f, "({} AND {})", left, right),
            Predicate::Or(left, right) => write!(f, "({} OR {})", left, right),
            Predicate::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}
