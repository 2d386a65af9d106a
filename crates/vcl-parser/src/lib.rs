//! VCL Parser - Recursive descent parser
//!
//! Parses VCL source code into an AST. Expressions use precedence climbing;
//! statements and declarations are plain recursive descent.

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use vcl_ast::{Expr, Program};
use vcl_lexer::tokenize;

/// Parse a source string into a Program AST
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_program()
}

/// Parse a source string, recording `file` in every node position
pub fn parse_file(source: &str, file: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens).with_file(file);
    parser.parse_program()
}

/// Parse a standalone expression
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_expression_root()
}
