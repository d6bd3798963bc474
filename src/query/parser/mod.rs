// SQL Parser Module
//
// This module is responsible for parsing query text and converting it
// into an abstract syntax tree (AST) representation.

// Re-export public components
pub mod lexer;
pub mod ast;
pub mod parser;

// Export key types
pub use self::parser::{parse, ParseError, ParseResult, Parser, MAX_NESTING_DEPTH};
pub use self::lexer::{tokenize, Lexer, Token, TokenType};
pub use self::ast::{ComparisonOperator, LiteralValue, ParsedQuery, SelectionClause, WhereExpression};
