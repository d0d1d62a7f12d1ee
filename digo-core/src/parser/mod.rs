pub mod error;
pub mod expressions;
pub mod statements;

use std::rc::Rc;

use crate::ast::Program;
use crate::lexer::{Token, TokenKind, TokenSource};
pub use error::ParseError;
use statements::parse_statement;

pub struct Parser<'a> {
    tokens: Box<dyn TokenSource + 'a>,
    lookahead: Token,
    previous: TokenKind,
    /// Braces opened and not yet closed by the consumed tokens.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: impl TokenSource + 'a) -> Self {
        let lookahead = tokens.next_token();
        Self {
            tokens: Box::new(tokens),
            lookahead,
            previous: TokenKind::Eof,
            depth: 0,
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.lookahead
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.lookahead.kind
    }

    pub(crate) fn next_token(&mut self) -> Token {
        let next = self.tokens.next_token();
        let token = std::mem::replace(&mut self.lookahead, next);
        match token.kind {
            TokenKind::LBrace => self.depth += 1,
            TokenKind::RBrace => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.previous = token.kind.clone();
        token
    }

    /// Consumes the next token only when it is of the given kind.
    pub(crate) fn next_if(&mut self, token_kind: &TokenKind) -> bool {
        if self.peek_kind() == token_kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Rc<str>, ParseError> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.next_token();
                Ok(name)
            }
            _ => Err(ParseError::unexpected_other(
                error::Expected::Identifier,
                self.peek().clone(),
            )),
        }
    }

    /// On mismatch the offending token is left in place for the caller.
    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        if self.next_if(&token_kind) {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(token_kind, self.peek().clone()))
        }
    }

    /// Parses every statement up to the end of input, collecting syntax
    /// errors instead of stopping at the first one.
    ///
    /// The returned program only holds the statements that parsed cleanly.
    pub fn parse_program_with_errors(&mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while *self.peek_kind() != TokenKind::Eof {
            if self.next_if(&TokenKind::SemiColon) {
                continue;
            }
            match parse_statement(self) {
                Ok(statement) => {
                    statements.push(statement);
                }
                Err(err) => {
                    tracing::debug!(error = %err, "syntax error");
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        (Program { statements }, errors)
    }

    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let (program, errors) = self.parse_program_with_errors();
        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }

    /// Skips the remainder of a broken top-level statement.
    ///
    /// Outside any block it stops after a `;` or before `let`/`return`.
    /// Inside a block it skips up to and including the `}` that closes the
    /// outermost open block.
    fn synchronize(&mut self) {
        if self.depth == 0 && self.previous == TokenKind::SemiColon {
            return;
        }
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return,
                TokenKind::Let | TokenKind::Return if self.depth == 0 => return,
                TokenKind::SemiColon if self.depth == 0 => {
                    self.next_token();
                    return;
                }
                TokenKind::RBrace if self.depth == 1 => {
                    self.next_token();
                    self.next_if(&TokenKind::SemiColon);
                    return;
                }
                _ => {
                    self.next_token();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::lexer::{Token, TokenKind, TokenSource, Tokenizer};
    use crate::parser::Parser;

    fn test_parsing(tests: Vec<(&str, &str)>) {
        for (input, expected) in tests {
            let tokenizer = Tokenizer::new(input);
            let mut parser = Parser::new(tokenizer);

            let program = parser.parse_program().unwrap();

            assert_eq!(program.to_string(), expected)
        }
    }

    fn test_errors(tests: Vec<(&str, Vec<&str>)>) {
        for (input, expected) in tests {
            let mut parser = Parser::new(Tokenizer::new(input));

            let errors = parser.parse_program().unwrap_err();

            assert_eq!(
                errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                expected,
                "input: {}",
                input
            )
        }
    }

    #[test]
    fn test_expression_1() {
        let tests = vec![
            ("-a * b", "((-a) * b);\n"),
            ("!-a", "(!(-a));\n"),
            ("a + b + c", "((a + b) + c);\n"),
            ("a + b - c", "((a + b) - c);\n"),
            ("a * b * c", "((a * b) * c);\n"),
            ("a * b / c", "((a * b) / c);\n"),
            ("a + b / c", "(a + (b / c));\n"),
            (
                "a + b * c + d / e - f",
                "(((a + (b * c)) + (d / e)) - f);\n",
            ),
            ("3 + 4; -5 * 5", "(3 + 4);\n((-5) * 5);\n"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4));\n"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4));\n"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)));\n",
            ),
            ("true == !false", "(true == (!false));\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_expression_precedence() {
        let tests = vec![
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4);\n"),
            ("(5 + 5) * 2", "((5 + 5) * 2);\n"),
            ("2 / (5 + 5)", "(2 / (5 + 5));\n"),
            ("-(5 + 5)", "(-(5 + 5));\n"),
            ("!(true == true)", "(!(true == true));\n"),
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d);\n",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])));\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_call_expression() {
        let tests = vec![
            ("a + add(b * c) + d", "((a + add((b * c))) + d);\n"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)));\n",
            ),
            (
                "add(a + b + c * d / f + g)",
                "add((((a + b) + ((c * d) / f)) + g));\n",
            ),
            ("fn(x) { x }(5)", "fn(x) {x;}(5);\n"),
            ("f()", "f();\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_selector_expression() {
        let tests = vec![
            ("a.len", "a.len;\n"),
            ("[1, 2, 3].len", "[1, 2, 3].len;\n"),
            ("a.push(1)", "a.push(1);\n"),
            ("-a.first", "(-a.first);\n"),
            ("a[0].len", "(a[0]).len;\n"),
            ("a.rest[0]", "(a.rest[0]);\n"),
            ("f(x).last + 1", "(f(x).last + 1);\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_conditional() {
        let tests = vec![
            ("if (x < y) { x }", "if (x < y) {x;};\n"),
            (
                "if (x < y) { x } else { y }",
                "if (x < y) {x;} else {y;};\n",
            ),
            ("if x { return 1; 2 }", "if x {return 1;2;};\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_function() {
        let tests = vec![
            (
                "let getName = fn(person) { person[\"name\"]; };",
                "let getName = fn(person) {(person[\"name\"]);};\n",
            ),
            (
                "let getName = fn(person) { person[\"name\"] };",
                "let getName = fn(person) {(person[\"name\"]);};\n",
            ),
            ("fn() {}", "fn() {};\n"),
            ("fn(x, y,) { x + y }", "fn(x, y) {(x + y);};\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_statements() {
        let tests = vec![
            ("let a;", "let a;\n"),
            ("let a = 5", "let a = 5;\n"),
            ("let a; let b = a", "let a;\nlet b = a;\n"),
            ("return 5;", "return 5;\n"),
            ("{ let a = 1; a }", "{let a = 1;a;}\n"),
            (";;1;;", "1;\n"),
            ("\"hello world\"", "\"hello world\";\n"),
            ("[]", "[];\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_syntax_errors() {
        let tests = vec![
            ("let = 5;", vec!["expected next token to be identifier, got = instead"]),
            ("let x 5;", vec!["expected next token to be =, got 5 instead"]),
            (")", vec!["no prefix parse function for ) found"]),
            ("fn(x) { x", vec!["expected next token to be }, got EOF instead"]),
            ("[1, 2", vec!["expected next token to be ], got EOF instead"]),
            ("a.1", vec!["expected next token to be identifier, got 1 instead"]),
            ("1 + ;", vec!["no prefix parse function for ; found"]),
            (
                "99999999999999999999",
                vec!["could not parse 99999999999999999999 as integer"],
            ),
        ];

        test_errors(tests)
    }

    #[test]
    fn test_errors_accumulate_across_statements() {
        let input = "let a = (1 + 2; let c = 3; let b = (3 + 4;";
        let mut parser = Parser::new(Tokenizer::new(input));

        let (program, errors) = parser.parse_program_with_errors();

        assert_eq!(
            errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            vec![
                "expected next token to be ), got ; instead",
                "expected next token to be ), got ; instead",
            ]
        );
        assert_eq!(program.to_string(), "let c = 3;\n");
    }

    #[test]
    fn test_recovery_after_consumed_semicolon() {
        let mut parser = Parser::new(Tokenizer::new("1 + ; 2"));

        let (program, errors) = parser.parse_program_with_errors();

        assert_eq!(errors.len(), 1);
        assert_eq!(program.to_string(), "2;\n");
    }

    #[test]
    fn test_recovery_without_semicolons() {
        let mut parser = Parser::new(Tokenizer::new("let a = (1 + 2\nlet b = (3 + 4\nlet c = 5\n"));

        let (program, errors) = parser.parse_program_with_errors();

        assert_eq!(
            errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            vec![
                "expected next token to be ), got let instead",
                "expected next token to be ), got let instead",
            ]
        );
        assert_eq!(program.to_string(), "let c = 5;\n");
    }

    #[test]
    fn test_recovery_skips_the_enclosing_block() {
        let input = "let f = fn(x) { let y = (x + 1; y };\nlet g = 3;";
        let mut parser = Parser::new(Tokenizer::new(input));

        let (program, errors) = parser.parse_program_with_errors();

        assert_eq!(
            errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            vec!["expected next token to be ), got ; instead"]
        );
        assert_eq!(program.to_string(), "let g = 3;\n");
    }

    #[test]
    fn test_recovery_skips_nested_blocks() {
        let input = "if (x) { if (y) { return (1; } 2 } let z = 4";
        let mut parser = Parser::new(Tokenizer::new(input));

        let (program, errors) = parser.parse_program_with_errors();

        assert_eq!(errors.len(), 1);
        assert_eq!(program.to_string(), "let z = 4;\n");
    }

    struct Tokens(std::vec::IntoIter<TokenKind>);

    impl TokenSource for Tokens {
        fn next_token(&mut self) -> Token {
            let kind = self.0.next().unwrap_or(TokenKind::Eof);
            Token {
                kind,
                start: 0,
                end: 0,
            }
        }
    }

    #[test]
    fn test_any_token_source() {
        let tokens = Tokens(
            vec![
                TokenKind::Int("1".into()),
                TokenKind::Plus,
                TokenKind::Int("2".into()),
                TokenKind::Asterisk,
                TokenKind::Int("3".into()),
            ]
            .into_iter(),
        );

        let program = Parser::new(tokens).parse_program().unwrap();

        assert_eq!(program.to_string(), "(1 + (2 * 3));\n");
    }
}
