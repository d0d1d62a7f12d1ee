use std::fmt::Display;
use std::rc::Rc;

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {} instead", .got.kind)]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("could not parse {literal} as integer")]
    InvalidInteger {
        literal: Rc<str>,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("no prefix parse function for {} found", .0.kind)]
    NoPrefixFunction(Token),
}

#[derive(Debug, PartialEq)]
pub enum Expected {
    Token(TokenKind),
    Identifier,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Identifier => write!(f, "identifier"),
        }
    }
}

impl ParseError {
    pub fn unexpected_token(expected: TokenKind, got: Token) -> ParseError {
        ParseError::UnexpectedToken {
            expected: Expected::Token(expected),
            got,
        }
    }

    pub fn unexpected_other(expected: Expected, got: Token) -> ParseError {
        ParseError::UnexpectedToken { expected, got }
    }
}
