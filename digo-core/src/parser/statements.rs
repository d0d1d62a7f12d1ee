use crate::ast::{BlockStatement, Identifier, Statement};
use crate::lexer::TokenKind;
use crate::parser::expressions::{parse_expression, Precedence};
use crate::parser::{ParseError, Parser};

/// Parses one statement and the semicolon that may follow it.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let statement = match parser.peek_kind() {
        TokenKind::Let => Statement::Let(parse_let_statement(parser)?),
        TokenKind::Return => Statement::Return(parse_return_statement(parser)?),
        TokenKind::LBrace => {
            parser.next_token();
            Statement::Block(parse_block_statement(parser)?)
        }
        _ => Statement::Expression(parse_expression_statement(parser)?),
    };
    parser.next_if(&TokenKind::SemiColon);

    Ok(statement)
}

fn parse_let_statement(parser: &mut Parser) -> Result<crate::ast::LetStatement, ParseError> {
    parser.expect_token(TokenKind::Let)?;
    let name = parser.parse_ident()?;
    let value = match parser.peek_kind() {
        TokenKind::Assign => {
            parser.next_token();
            Some(parse_expression(parser, Precedence::Lowest)?)
        }
        TokenKind::SemiColon | TokenKind::RBrace | TokenKind::Eof => None,
        _ => {
            return Err(ParseError::unexpected_token(
                TokenKind::Assign,
                parser.peek().clone(),
            ))
        }
    };

    Ok(crate::ast::LetStatement {
        identifier: Identifier { name },
        value,
    })
}

fn parse_return_statement(parser: &mut Parser) -> Result<crate::ast::ReturnStatement, ParseError> {
    parser.expect_token(TokenKind::Return)?;
    let value = parse_expression(parser, Precedence::Lowest)?;

    Ok(crate::ast::ReturnStatement { value })
}

fn parse_expression_statement(parser: &mut Parser) -> Result<crate::ast::Expression, ParseError> {
    parse_expression(parser, Precedence::Lowest)
}

/// Parses the statements of a block whose `{` was already consumed, up to and
/// including the closing `}`.
pub fn parse_block_statement(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let mut statements = Vec::new();

    loop {
        match parser.peek_kind() {
            TokenKind::RBrace => {
                parser.next_token();
                return Ok(BlockStatement { statements });
            }
            TokenKind::Eof => {
                return Err(ParseError::unexpected_token(
                    TokenKind::RBrace,
                    parser.peek().clone(),
                ))
            }
            TokenKind::SemiColon => {
                parser.next_token();
            }
            _ => statements.push(parse_statement(parser)?),
        }
    }
}
