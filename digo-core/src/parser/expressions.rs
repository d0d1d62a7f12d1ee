use std::rc::Rc;

use super::error::ParseError;
use super::statements::parse_block_statement;
use crate::ast::{Expression, Identifier};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;

#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
    Select,
}

pub fn precedence_of(token: &TokenKind) -> Precedence {
    match token {
        TokenKind::Equal => Precedence::Equals,
        TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan => Precedence::LessGreater,
        TokenKind::GreaterThan => Precedence::LessGreater,
        TokenKind::Plus => Precedence::Sum,
        TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk => Precedence::Product,
        TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        TokenKind::Period => Precedence::Select,
        _ => Precedence::Lowest,
    }
}

/// Precedence climbing: parse a prefix expression, then keep folding it into
/// infix expressions while the next operator binds tighter than `precedence`.
pub fn parse_expression(
    parser: &mut Parser,
    precedence: Precedence,
) -> Result<crate::ast::Expression, ParseError> {
    let token = parser.next_token();
    let mut left_expression = prefix_parsing(token, parser)?;

    loop {
        let next_kind = parser.peek_kind();
        if precedence >= precedence_of(next_kind) {
            break;
        }
        let Some(infix_parse_function) = infix_parsing_function(next_kind) else {
            break;
        };
        parser.next_token();
        left_expression = infix_parse_function(left_expression, parser)?;
    }

    Ok(left_expression)
}

fn prefix_operation(
    kind: crate::ast::PrefixOperationKind,
) -> impl FnOnce(&mut Parser) -> Result<Expression, ParseError> {
    move |parser| {
        Ok(Expression::PrefixOperation(
            kind,
            Box::new(parse_expression(parser, Precedence::Prefix)?),
        ))
    }
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;

    Ok(expression)
}

/// Parses `element (, element)* ,? terminator`, the opening token having
/// already been consumed.
fn parse_sequence<T>(
    parser: &mut Parser,
    parse_element: impl Fn(&mut Parser) -> Result<T, ParseError>,
    terminator: TokenKind,
) -> Result<Vec<T>, ParseError> {
    let mut elements = Vec::new();

    loop {
        if parser.next_if(&terminator) {
            return Ok(elements);
        }
        elements.push(parse_element(parser)?);

        if !parser.next_if(&TokenKind::Comma) {
            parser.expect_token(terminator)?;
            return Ok(elements);
        }
    }
}

fn parse_array_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expressions = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::RBracket,
    )?;
    Ok(Expression::ArrayLiteral(expressions))
}

fn parse_if_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = Box::new(parse_expression(parser, Precedence::Lowest)?);
    let mut alternative = None;

    parser.expect_token(TokenKind::LBrace)?;
    let consequence = parse_block_statement(parser)?;

    if parser.next_if(&TokenKind::Else) {
        parser.expect_token(TokenKind::LBrace)?;
        alternative = Some(parse_block_statement(parser)?);
    }

    Ok(Expression::IfExpression {
        condition,
        consequence,
        alternative,
    })
}

fn parse_function_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let parameters = parse_sequence(
        parser,
        |parser| parser.parse_ident().map(|name| Identifier { name }),
        TokenKind::RParen,
    )?;

    parser.expect_token(TokenKind::LBrace)?;
    let body = parse_block_statement(parser)?;

    Ok(Expression::FunctionLiteral {
        parameters: parameters.into(),
        body: Rc::new(body),
    })
}

pub fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident(name) => Ok(Expression::Identifier(Identifier { name })),
        TokenKind::Int(val) => match val.parse() {
            Ok(value) => Ok(Expression::IntegerLiteral(value)),
            Err(source) => Err(ParseError::InvalidInteger {
                literal: val,
                source,
            }),
        },
        TokenKind::String(val) => Ok(Expression::StringLiteral(val.to_string())),
        TokenKind::True => Ok(Expression::BooleanLiteral(true)),
        TokenKind::False => Ok(Expression::BooleanLiteral(false)),
        TokenKind::Bang => prefix_operation(crate::ast::PrefixOperationKind::Bang)(parser),
        TokenKind::Minus => prefix_operation(crate::ast::PrefixOperationKind::Minus)(parser),
        TokenKind::LParen => parse_grouped_expression(parser),
        TokenKind::LBracket => parse_array_literal(parser),
        TokenKind::If => parse_if_expression(parser),
        TokenKind::Function => parse_function_literal(parser),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

type InfixFunction = Box<dyn FnOnce(Expression, &mut Parser) -> Result<Expression, ParseError>>;

fn infix_operation(token: TokenKind, kind: crate::ast::InfixOperationKind) -> InfixFunction {
    Box::new(
        move |left: Expression, parser: &mut Parser| -> Result<Expression, ParseError> {
            let new_precedence = precedence_of(&token);

            Ok(Expression::InfixOperation(
                kind,
                Box::new(left),
                Box::new(parse_expression(parser, new_precedence)?),
            ))
        },
    )
}

fn parse_call_function(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let arguments = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::RParen,
    )?;

    Ok(Expression::CallExpression {
        function: Box::new(left),
        arguments,
    })
}

fn parse_index_expression(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let index = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RBracket)?;

    Ok(Expression::IndexExpression {
        left: Box::new(left),
        index: Box::new(index),
    })
}

fn parse_selector_expression(
    left: Expression,
    parser: &mut Parser,
) -> Result<Expression, ParseError> {
    let name = parser.parse_ident()?;

    Ok(Expression::SelectorExpression {
        receiver: Box::new(left),
        member: Identifier { name },
    })
}

pub fn infix_parsing_function(token: &TokenKind) -> Option<InfixFunction> {
    use crate::ast::InfixOperationKind as InfixKind;

    match token {
        TokenKind::Plus => Some(infix_operation(TokenKind::Plus, InfixKind::Plus)),
        TokenKind::Minus => Some(infix_operation(TokenKind::Minus, InfixKind::Minus)),
        TokenKind::LessThan => Some(infix_operation(TokenKind::LessThan, InfixKind::LessThan)),
        TokenKind::GreaterThan => Some(infix_operation(
            TokenKind::GreaterThan,
            InfixKind::GreaterThan,
        )),
        TokenKind::Equal => Some(infix_operation(TokenKind::Equal, InfixKind::Equal)),
        TokenKind::NotEqual => Some(infix_operation(TokenKind::NotEqual, InfixKind::NotEqual)),
        TokenKind::Asterisk => Some(infix_operation(TokenKind::Asterisk, InfixKind::Multiply)),
        TokenKind::Slash => Some(infix_operation(TokenKind::Slash, InfixKind::Divide)),
        TokenKind::LParen => Some(Box::new(parse_call_function)),
        TokenKind::LBracket => Some(Box::new(parse_index_expression)),
        TokenKind::Period => Some(Box::new(parse_selector_expression)),
        _ => None,
    }
}
