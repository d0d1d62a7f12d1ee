use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Illegal(Rc<str>),
    Ident(Rc<str>),
    Int(Rc<str>),
    String(Rc<str>),

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Equal,
    NotEqual,

    GreaterThan,
    LessThan,

    Comma,
    Period,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,

    Eof,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn eof(position: usize) -> Self {
        Token {
            kind: TokenKind::Eof,
            start: position,
            end: position,
        }
    }
}

/// Anything the parser can pull tokens from.
///
/// Once the input is exhausted every further call returns a token of kind
/// [`TokenKind::Eof`].
pub trait TokenSource {
    fn next_token(&mut self) -> Token;
}

fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "fn" => Some(TokenKind::Function),
        "let" => Some(TokenKind::Let),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "return" => Some(TokenKind::Return),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self { input, iter }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.next_idx(),
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self
            .iter
            .next_if(|(_, ch)| Self::is_letter(*ch) || ch.is_ascii_digit())
            .is_some()
        {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token {
            kind: keywords(ident).unwrap_or_else(|| TokenKind::Ident(ident.into())),
            start,
            end,
        }
    }

    fn read_number(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        let end = self.next_idx();
        Token {
            kind: TokenKind::Int(self.input[start..end].into()),
            start,
            end,
        }
    }

    fn read_string(&mut self, start: usize) -> Token {
        let contents_start = start + 1;
        loop {
            match self.iter.next() {
                Some((idx, '"')) => {
                    return Token {
                        kind: TokenKind::String(self.input[contents_start..idx].into()),
                        start,
                        end: self.next_idx(),
                    }
                }
                None => return self.token(TokenKind::Illegal("unterminated string".into()), start),
                _ => {}
            }
        }
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    /// Consumes `second` if it follows, choosing between the two-character
    /// and the single-character token.
    fn one_or_two(
        &mut self,
        start: usize,
        second: char,
        double: TokenKind,
        single: TokenKind,
    ) -> Token {
        if self.iter.next_if(|(_, ch)| *ch == second).is_some() {
            self.token(double, start)
        } else {
            self.token(single, start)
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.iter.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let (idx, ch) = self.iter.next()?;
        let tok = match ch {
            '=' => self.one_or_two(idx, '=', TokenKind::Equal, TokenKind::Assign),
            '!' => self.one_or_two(idx, '=', TokenKind::NotEqual, TokenKind::Bang),
            '+' => self.token(TokenKind::Plus, idx),
            '-' => self.token(TokenKind::Minus, idx),
            '*' => self.token(TokenKind::Asterisk, idx),
            '/' => self.token(TokenKind::Slash, idx),
            '<' => self.token(TokenKind::LessThan, idx),
            '>' => self.token(TokenKind::GreaterThan, idx),
            ',' => self.token(TokenKind::Comma, idx),
            '.' => self.token(TokenKind::Period, idx),
            ';' => self.token(TokenKind::SemiColon, idx),
            '(' => self.token(TokenKind::LParen, idx),
            ')' => self.token(TokenKind::RParen, idx),
            '{' => self.token(TokenKind::LBrace, idx),
            '}' => self.token(TokenKind::RBrace, idx),
            '[' => self.token(TokenKind::LBracket, idx),
            ']' => self.token(TokenKind::RBracket, idx),
            '"' => self.read_string(idx),
            c if Tokenizer::is_letter(c) => self.read_identifier(idx),
            c if c.is_ascii_digit() => self.read_number(idx),
            _ => self.token(TokenKind::Illegal(ch.to_string().into()), idx),
        };
        Some(tok)
    }
}

impl<'a> TokenSource for Tokenizer<'a> {
    fn next_token(&mut self) -> Token {
        let end = self.input.len();
        self.next().unwrap_or_else(|| Token::eof(end))
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenKind::*;
        let symbol = match self {
            Illegal(text) | Ident(text) | Int(text) => return write!(f, "{}", text),
            String(text) => return write!(f, "\"{}\"", text),
            Assign => "=",
            Plus => "+",
            Minus => "-",
            Bang => "!",
            Asterisk => "*",
            Slash => "/",
            Equal => "==",
            NotEqual => "!=",
            GreaterThan => ">",
            LessThan => "<",
            Comma => ",",
            Period => ".",
            SemiColon => ";",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Function => "fn",
            Let => "let",
            True => "true",
            False => "false",
            If => "if",
            Else => "else",
            Return => "return",
            Eof => "EOF",
        };
        write!(f, "{}", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|token| token.kind).collect()
    }

    #[test]
    fn test_single_characters() {
        let input = "=+(){},;";
        let output = Tokenizer::new(input).collect::<Vec<_>>();

        assert_eq!(
            output,
            vec![
                Token {
                    kind: TokenKind::Assign,
                    start: 0,
                    end: 1
                },
                Token {
                    kind: TokenKind::Plus,
                    start: 1,
                    end: 2
                },
                Token {
                    kind: TokenKind::LParen,
                    start: 2,
                    end: 3
                },
                Token {
                    kind: TokenKind::RParen,
                    start: 3,
                    end: 4
                },
                Token {
                    kind: TokenKind::LBrace,
                    start: 4,
                    end: 5
                },
                Token {
                    kind: TokenKind::RBrace,
                    start: 5,
                    end: 6
                },
                Token {
                    kind: TokenKind::Comma,
                    start: 6,
                    end: 7
                },
                Token {
                    kind: TokenKind::SemiColon,
                    start: 7,
                    end: 8
                }
            ]
        );
    }

    #[test]
    fn test_statements() {
        let input = "let five = 5;
    let add = fn(x, y) {
    x + y;
    };
    let result = add(five, 10);
    ";
        let expected_output = vec![
            TokenKind::Let,
            TokenKind::Ident("five".into()),
            TokenKind::Assign,
            TokenKind::Int("5".into()),
            TokenKind::SemiColon,
            TokenKind::Let,
            TokenKind::Ident("add".into()),
            TokenKind::Assign,
            TokenKind::Function,
            TokenKind::LParen,
            TokenKind::Ident("x".into()),
            TokenKind::Comma,
            TokenKind::Ident("y".into()),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Ident("x".into()),
            TokenKind::Plus,
            TokenKind::Ident("y".into()),
            TokenKind::SemiColon,
            TokenKind::RBrace,
            TokenKind::SemiColon,
            TokenKind::Let,
            TokenKind::Ident("result".into()),
            TokenKind::Assign,
            TokenKind::Ident("add".into()),
            TokenKind::LParen,
            TokenKind::Ident("five".into()),
            TokenKind::Comma,
            TokenKind::Int("10".into()),
            TokenKind::RParen,
            TokenKind::SemiColon,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_operators() {
        let input = "
    !-/*5;
    5 < 10 > 5;
    10 == 10;
    10 != 9;";

        let expected_output = vec![
            TokenKind::Bang,
            TokenKind::Minus,
            TokenKind::Slash,
            TokenKind::Asterisk,
            TokenKind::Int("5".into()),
            TokenKind::SemiColon,
            TokenKind::Int("5".into()),
            TokenKind::LessThan,
            TokenKind::Int("10".into()),
            TokenKind::GreaterThan,
            TokenKind::Int("5".into()),
            TokenKind::SemiColon,
            TokenKind::Int("10".into()),
            TokenKind::Equal,
            TokenKind::Int("10".into()),
            TokenKind::SemiColon,
            TokenKind::Int("10".into()),
            TokenKind::NotEqual,
            TokenKind::Int("9".into()),
            TokenKind::SemiColon,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_keywords() {
        let input = "if (5 < 10) {
    return true;
    } else {
    return false;
    }";

        let expected_output = vec![
            TokenKind::If,
            TokenKind::LParen,
            TokenKind::Int("5".into()),
            TokenKind::LessThan,
            TokenKind::Int("10".into()),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Return,
            TokenKind::True,
            TokenKind::SemiColon,
            TokenKind::RBrace,
            TokenKind::Else,
            TokenKind::LBrace,
            TokenKind::Return,
            TokenKind::False,
            TokenKind::SemiColon,
            TokenKind::RBrace,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_arrays_strings_and_selectors() {
        let expected_output = vec![
            TokenKind::LBracket,
            TokenKind::Int("1".into()),
            TokenKind::Comma,
            TokenKind::String("two words".into()),
            TokenKind::RBracket,
            TokenKind::Period,
            TokenKind::Ident("len".into()),
        ];

        assert_eq!(kinds("[1, \"two words\"].len"), expected_output)
    }

    #[test]
    fn test_identifiers_may_contain_digits() {
        let expected_output = vec![
            TokenKind::Let,
            TokenKind::Ident("add2".into()),
            TokenKind::Assign,
            TokenKind::Int("2".into()),
            TokenKind::Ident("x".into()),
            TokenKind::Ident("_tmp_1".into()),
        ];

        assert_eq!(kinds("let add2 = 2x _tmp_1"), expected_output)
    }

    #[test]
    fn test_string_token_span_includes_quotes() {
        let output = Tokenizer::new(" \"ab\"").collect::<Vec<_>>();

        assert_eq!(
            output,
            vec![Token {
                kind: TokenKind::String("ab".into()),
                start: 1,
                end: 5
            }]
        );
    }

    #[test]
    fn test_illegal_tokens() {
        assert_eq!(
            kinds("@ \"open"),
            vec![
                TokenKind::Illegal("@".into()),
                TokenKind::Illegal("unterminated string".into()),
            ]
        );
    }

    #[test]
    fn test_eof_repeats() {
        let mut tokenizer = Tokenizer::new("x");

        assert_eq!(tokenizer.next_token().kind, TokenKind::Ident("x".into()));
        assert_eq!(tokenizer.next_token(), Token::eof(1));
        assert_eq!(tokenizer.next_token(), Token::eof(1));
    }
}
