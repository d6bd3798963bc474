// SQL Abstract Syntax Tree (AST) Implementation
//
// This module defines the AST nodes for a parsed query: the selection clause
// and an optional predicate tree. Column identifiers are kept as written; they
// are only resolved against a schema by the planner.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// A parsed `SELECT ... FROM $ [WHERE ...]` query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub selection: SelectionClause,
    pub where_clause: Option<WhereExpression>,
}

/// Columns in the SELECT clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionClause {
    /// `SELECT *`
    pub select_all: bool,
    /// Column identifiers in selection order; never empty unless `select_all`
    pub column_identifiers: Vec<String>,
}

impl SelectionClause {
    pub fn all() -> Self {
        SelectionClause {
            select_all: true,
            column_identifiers: Vec::new(),
        }
    }

    pub fn columns(column_identifiers: Vec<String>) -> Self {
        SelectionClause {
            select_all: false,
            column_identifiers,
        }
    }
}

/// Predicate tree of the WHERE clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WhereExpression {
    /// `column operator literal`
    Comparison {
        column: String,
        operator: ComparisonOperator,
        literal: LiteralValue,
    },
    And(Box<WhereExpression>, Box<WhereExpression>),
    Or(Box<WhereExpression>, Box<WhereExpression>),
    Not(Box<WhereExpression>),
}

impl WhereExpression {
    pub fn comparison(column: &str, operator: ComparisonOperator, literal: LiteralValue) -> Self {
        WhereExpression::Comparison {
            column: column.to_string(),
            operator,
            literal,
        }
    }

    pub fn and(left: WhereExpression, right: WhereExpression) -> Self {
        WhereExpression::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: WhereExpression, right: WhereExpression) -> Self {
        WhereExpression::Or(Box::new(left), Box::new(right))
    }

    pub fn not(inner: WhereExpression) -> Self {
        WhereExpression::Not(Box::new(inner))
    }
}

/// Renders the predicate as query text that parses back into the same tree
impl fmt::Display for WhereExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhereExpression::Comparison { column, operator, literal } => {
                write!(f, "{} {} {}", column, operator, literal)
            }
            WhereExpression::And(left, right) => write!(f, "({} AND {})", left, right),
            WhereExpression::Or(left, right) => write!(f, "({} OR {})", left, right),
            WhereExpression::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComparisonOperator {
    Equals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    NotEqual,
}

impl ComparisonOperator {
    /// Parse an operator symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(ComparisonOperator::Equals),
            ">" => Some(ComparisonOperator::GreaterThan),
            "<" => Some(ComparisonOperator::LessThan),
            ">=" => Some(ComparisonOperator::GreaterOrEqual),
            "<=" => Some(ComparisonOperator::LessOrEqual),
            "!=" => Some(ComparisonOperator::NotEqual),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Equals => "=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::NotEqual => "!=",
        }
    }

    /// Whether a three-way comparison result satisfies this operator
    #[inline]
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonOperator::Equals => ordering == Ordering::Equal,
            ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
            ComparisonOperator::LessThan => ordering == Ordering::Less,
            ComparisonOperator::GreaterOrEqual => ordering != Ordering::Less,
            ComparisonOperator::LessOrEqual => ordering != Ordering::Greater,
            ComparisonOperator::NotEqual => ordering != Ordering::Equal,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Integer(i32),
    Float(f32),
    /// `String(None)` is SQL `NULL`
    String(Option<String>),
    Boolean(bool),
}

impl LiteralValue {
    /// Short name of the literal kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            LiteralValue::Integer(_) => "integer",
            LiteralValue::Float(_) => "float",
            LiteralValue::String(Some(_)) => "string",
            LiteralValue::String(None) => "null",
            LiteralValue::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Integer(i) => write!(f, "{}", i),
            // Debug keeps the fractional part so the text re-parses as a float
            LiteralValue::Float(fl) => write!(f, "{:?}", fl),
            LiteralValue::String(Some(s)) => write!(f, "'{}'", s.replace('\'', "''")),
            LiteralValue::String(None) => write!(f, "null"),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}
