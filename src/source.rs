use crate::ast::Module;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Lex and parse one source file into an untyped module.
pub fn parse_module(source: &str, file: &str) -> Result<Module, String> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize().map_err(|e| e.to_string())?;
    let mut parser = Parser::new(tokens, file);
    parser.parse().map_err(|e| e.to_string())
}
