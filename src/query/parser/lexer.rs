// SQL Lexer Implementation
//
// This module implements the lexer that breaks a query string into tokens.
// Whitespace, commas and semicolons only separate tokens and are dropped.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::parser::{ParseError, ParseResult};

/// SQL Token types
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    /// Identifiers, keywords, numbers, `*` and `$`
    Word,
    /// Quoted string with `''` escapes already decoded
    String(String),
    /// Comparison operator symbol: `=`, `!=`, `>`, `>=`, `<`, `<=` or a lone `!`
    Symbol,
    LeftParen,
    RightParen,
}

/// A Token represents a lexical unit in the SQL query
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    /// Source text of the token, quotes included for strings
    pub literal: String,
    /// Byte offset of the token in the query string
    pub position: usize,
}

impl Token {
    /// Check if this is a bareword matching `keyword`, ignoring case
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Word && self.literal.eq_ignore_ascii_case(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}' at position {}", self.literal, self.position)
    }
}

/// SQL Lexer for breaking a query string into tokens
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Start offset of the bareword being accumulated
    word_start: Option<usize>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from a SQL query string
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
            word_start: None,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        while let Some((pos, ch)) = self.chars.next() {
            match ch {
                c if c.is_whitespace() || c == ',' || c == ';' => self.flush(pos),
                '(' => self.push_single(pos, TokenType::LeftParen),
                ')' => self.push_single(pos, TokenType::RightParen),
                '\'' => {
                    self.flush(pos);
                    self.read_string(pos)?;
                }
                '!' | '>' | '<' => {
                    self.flush(pos);
                    let mut literal = ch.to_string();
                    if let Some(&(_, '=')) = self.chars.peek() {
                        self.chars.next();
                        literal.push('=');
                    }
                    self.tokens.push(Token {
                        token_type: TokenType::Symbol,
                        literal,
                        position: pos,
                    });
                }
                '=' => self.push_single(pos, TokenType::Symbol),
                _ => {
                    if self.word_start.is_none() {
                        self.word_start = Some(pos);
                    }
                }
            }
        }

        self.flush(self.input.len());
        Ok(self.tokens)
    }

    /// Emit the pending bareword, if any, ending at byte offset `end`
    fn flush(&mut self, end: usize) {
        if let Some(start) = self.word_start.take() {
            self.tokens.push(Token {
                token_type: TokenType::Word,
                literal: self.input[start..end].to_string(),
                position: start,
            });
        }
    }

    /// Emit a single-character token
    fn push_single(&mut self, pos: usize, token_type: TokenType) {
        self.flush(pos);
        let end = pos + self.input[pos..].chars().next().map_or(1, char::len_utf8);
        self.tokens.push(Token {
            token_type,
            literal: self.input[pos..end].to_string(),
            position: pos,
        });
    }

    /// Read a quoted string whose opening quote sits at `start`
    fn read_string(&mut self, start: usize) -> ParseResult<()> {
        let mut value = String::new();

        while let Some((pos, ch)) = self.chars.next() {
            if ch != '\'' {
                value.push(ch);
                continue;
            }

            // A doubled quote is an escaped quote
            if let Some(&(_, '\'')) = self.chars.peek() {
                self.chars.next();
                value.push('\'');
                continue;
            }

            self.tokens.push(Token {
                token_type: TokenType::String(value),
                literal: self.input[start..=pos].to_string(),
                position: start,
            });
            return Ok(());
        }

        Err(ParseError::UnterminatedString(start))
    }
}

/// Tokenize a query string
pub fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    Lexer::new(input).tokenize()
}
