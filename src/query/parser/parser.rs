// SQL Parser Implementation
//
// This module implements a recursive descent parser that turns the token
// stream into a ParsedQuery. Precedence from low to high: OR, AND, NOT,
// parenthesised groups and comparisons. The parser does no schema lookups.

use thiserror::Error;

use super::ast::*;
use super::lexer::{Token, TokenType, tokenize};
use crate::query::executor::result::ErrorKind;

/// SQL Parsing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token {0}")]
    UnexpectedToken(Token),
    #[error("Expected keyword '{expected}', found {}", describe(.found))]
    ExpectedKeyword {
        expected: &'static str,
        found: Option<Token>,
    },
    #[error("Unexpected end of input: expected {0}")]
    EndOfInput(&'static str),
    #[error("Unterminated string literal starting at position {0}")]
    UnterminatedString(usize),
    #[error("Unclosed parenthesis opened at position {0}")]
    UnclosedParenthesis(usize),
    #[error("Malformed comparison starting at {}", describe(.0))]
    MalformedComparison(Option<Token>),
    #[error("Unsupported comparison operator {0}")]
    UnknownOperator(Token),
    #[error("Literal {0} is not a supported type")]
    InvalidLiteral(Token),
    #[error("Queries must select FROM $ to reference the provided rows, found {0}")]
    InvalidSource(Token),
    #[error("Malformed selection list at {0}")]
    InvalidSelection(Token),
    #[error("Expected at least one column in SELECT clause")]
    EmptySelection,
    #[error("Predicate nesting exceeds {} levels at {0}", MAX_NESTING_DEPTH)]
    NestingTooDeep(Token),
}

/// Deepest predicate accepted by the parser. Counts NOT, parentheses and
/// every AND/OR level; lowering and evaluation recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

fn describe(token: &Option<Token>) -> String {
    match token {
        Some(token) => token.to_string(),
        None => "end of input".to_string(),
    }
}

impl ParseError {
    /// Error category of this parse error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::InvalidLiteral(_) => ErrorKind::Literal,
            ParseError::InvalidSource(_) | ParseError::InvalidSelection(_) => ErrorKind::Semantic,
            ParseError::EmptySelection => ErrorKind::Arity,
            _ => ErrorKind::Syntax,
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

// A predicate subtree with its height
type Nested = (WhereExpression, usize);

fn check_height(height: usize, token: &Token) -> ParseResult<usize> {
    if height > MAX_NESTING_DEPTH {
        return Err(ParseError::NestingTooDeep(token.clone()));
    }
    Ok(height)
}

/// SQL Parser for constructing an AST from SQL tokens
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    // Open NOT and parenthesis levels
    depth: usize,
}

impl Parser {
    /// Create a new parser from a SQL query string
    pub fn new(input: &str) -> ParseResult<Self> {
        Ok(Self::from_tokens(tokenize(input)?))
    }

    /// Create a parser from a vector of tokens
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// The token under the cursor
    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Advance to the next token, returning the one consumed
    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    /// Check if the current token is the given keyword
    fn current_token_is(&self, keyword: &str) -> bool {
        self.current_token().is_some_and(|t| t.is_keyword(keyword))
    }

    /// Consume the given keyword or fail
    fn expect_keyword(&mut self, keyword: &'static str) -> ParseResult<()> {
        if self.current_token_is(keyword) {
            self.position += 1;
            return Ok(());
        }

        Err(ParseError::ExpectedKeyword {
            expected: keyword,
            found: self.current_token().cloned(),
        })
    }

    /// Parse a complete query; every token must be consumed
    pub fn parse_query(&mut self) -> ParseResult<ParsedQuery> {
        self.expect_keyword("SELECT")?;
        let selection = self.parse_selection()?;

        self.expect_keyword("FROM")?;
        self.parse_source()?;

        let where_clause = if self.current_token_is("WHERE") {
            self.position += 1;
            if self.current_token().is_none() {
                return Err(ParseError::EndOfInput("predicate after WHERE"));
            }
            Some(self.parse_or_expression()?.0)
        } else {
            None
        };

        if let Some(token) = self.next_token() {
            return Err(ParseError::UnexpectedToken(token));
        }

        Ok(ParsedQuery {
            selection,
            where_clause,
        })
    }

    /// Parse `*` or a column list up to FROM
    fn parse_selection(&mut self) -> ParseResult<SelectionClause> {
        match self.current_token() {
            None => return Err(ParseError::EndOfInput("selection list after SELECT")),
            Some(token) if token.token_type == TokenType::Word && token.literal == "*" => {
                self.position += 1;
                // `*` stands alone in the selection list
                return match self.current_token() {
                    Some(next) if next.token_type == TokenType::Word && !next.is_keyword("FROM") && !next.is_keyword("WHERE") => {
                        Err(ParseError::InvalidSelection(next.clone()))
                    }
                    _ => Ok(SelectionClause::all()),
                };
            }
            Some(_) => {}
        }

        let mut columns = Vec::new();
        while let Some(token) = self.current_token() {
            if token.is_keyword("FROM") {
                break;
            }
            if token.token_type != TokenType::Word || token.literal == "*" {
                return Err(ParseError::InvalidSelection(token.clone()));
            }
            columns.push(token.literal.clone());
            self.position += 1;
        }

        if columns.is_empty() {
            return Err(ParseError::EmptySelection);
        }

        Ok(SelectionClause::columns(columns))
    }

    /// The only source table is `$`, the rows handed to the query
    fn parse_source(&mut self) -> ParseResult<()> {
        match self.next_token() {
            None => Err(ParseError::EndOfInput("source table after FROM")),
            Some(token) if token.token_type == TokenType::Word && token.literal == "$" => Ok(()),
            Some(token) => Err(ParseError::InvalidSource(token)),
        }
    }

    fn parse_or_expression(&mut self) -> ParseResult<Nested> {
        let (mut left, mut height) = self.parse_and_expression()?;
        while let Some(token) = self.current_token().filter(|t| t.is_keyword("OR")).cloned() {
            self.position += 1;
            let (right, right_height) = self.parse_and_expression()?;
            height = check_height(height.max(right_height) + 1, &token)?;
            left = WhereExpression::or(left, right);
        }
        Ok((left, height))
    }

    fn parse_and_expression(&mut self) -> ParseResult<Nested> {
        let (mut left, mut height) = self.parse_unary_expression()?;
        while let Some(token) = self.current_token().filter(|t| t.is_keyword("AND")).cloned() {
            self.position += 1;
            let (right, right_height) = self.parse_unary_expression()?;
            height = check_height(height.max(right_height) + 1, &token)?;
            left = WhereExpression::and(left, right);
        }
        Ok((left, height))
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Nested> {
        let token = match self.current_token() {
            Some(token) => token.clone(),
            None => return Err(ParseError::EndOfInput("predicate in WHERE clause")),
        };

        if token.is_keyword("NOT") {
            self.position += 1;
            let (inner, height) = self.nested(&token, Self::parse_unary_expression)?;
            return Ok((WhereExpression::not(inner), check_height(height + 1, &token)?));
        }

        if token.token_type == TokenType::LeftParen {
            self.position += 1;
            let nested = self.nested(&token, Self::parse_or_expression)?;
            return match self.current_token() {
                Some(t) if t.token_type == TokenType::RightParen => {
                    self.position += 1;
                    Ok(nested)
                }
                _ => Err(ParseError::UnclosedParenthesis(token.position)),
            };
        }

        Ok((self.parse_comparison()?, 1))
    }

    /// Run `parse` one NOT or parenthesis level deeper
    fn nested(&mut self, token: &Token, parse: fn(&mut Self) -> ParseResult<Nested>) -> ParseResult<Nested> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep(token.clone()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse `column operator literal`
    fn parse_comparison(&mut self) -> ParseResult<WhereExpression> {
        if self.remaining() < 3 {
            return Err(ParseError::MalformedComparison(self.current_token().cloned()));
        }

        let column = self.next_token().ok_or(ParseError::EndOfInput("column name"))?;
        let op_token = self.next_token().ok_or(ParseError::EndOfInput("comparison operator"))?;
        let literal_token = self.next_token().ok_or(ParseError::EndOfInput("literal"))?;

        if column.token_type != TokenType::Word {
            return Err(ParseError::UnexpectedToken(column));
        }

        let operator = match op_token.token_type {
            TokenType::Symbol => ComparisonOperator::from_symbol(&op_token.literal),
            _ => None,
        }
        .ok_or_else(|| ParseError::UnknownOperator(op_token.clone()))?;

        let literal = parse_literal(&literal_token)?;

        Ok(WhereExpression::Comparison {
            column: column.literal,
            operator,
            literal,
        })
    }
}

/// Parse a literal token: booleans, null, strings, then integers, then floats
pub fn parse_literal(token: &Token) -> ParseResult<LiteralValue> {
    match &token.token_type {
        TokenType::String(value) => Ok(LiteralValue::String(Some(value.clone()))),
        TokenType::Word => {
            let text = token.literal.as_str();
            if text.eq_ignore_ascii_case("true") {
                Ok(LiteralValue::Boolean(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(LiteralValue::Boolean(false))
            } else if text.eq_ignore_ascii_case("null") {
                Ok(LiteralValue::String(None))
            } else if let Ok(i) = text.parse::<i32>() {
                Ok(LiteralValue::Integer(i))
            } else if let Ok(f) = text.parse::<f32>() {
                Ok(LiteralValue::Float(f))
            } else {
                Err(ParseError::InvalidLiteral(token.clone()))
            }
        }
        _ => Err(ParseError::InvalidLiteral(token.clone())),
    }
}

/// Parse a query string
pub fn parse(sql: &str) -> ParseResult<ParsedQuery> {
    Parser::new(sql)?.parse_query()
}
