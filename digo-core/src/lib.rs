pub mod ast;
pub mod lexer;
pub mod parser;

/// Tokenizes and parses a whole source text.
pub fn parse(input: &str) -> Result<ast::Program, Vec<parser::ParseError>> {
    parser::Parser::new(lexer::Tokenizer::new(input)).parse_program()
}
