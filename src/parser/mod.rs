use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use crate::pos::{Loc, Pos};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parse error [{line}:{col}]: {msg}")]
    Error {
        msg: String,
        line: usize,
        col: usize,
    },
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: String,
    /// Package of the module being parsed; prefixes every type path
    /// declared in it.
    package: Vec<String>,
}

mod core;
mod decl;
mod expr;
mod types;
