use super::*;
use crate::types::{CallConv, Prim, Ty};

impl Parser {
    /// A type annotation: a primitive name, a dotted type path, a tuple
    /// `(a, b)`, a grouped type `(a)`, or a function type `(a, b) -> r`.
    pub(super) fn parse_type(&mut self) -> Result<Ty, ParseError> {
        if self.check_exact(&TokenKind::LParen) {
            self.advance();
            self.skip_newlines();
            let mut items = Vec::new();
            if !self.check_exact(&TokenKind::RParen) {
                loop {
                    items.push(self.parse_type()?);
                    self.skip_newlines();
                    if self.check_exact(&TokenKind::Comma) {
                        self.advance();
                        self.skip_newlines();
                    } else {
                        break;
                    }
                }
            }
            self.expect_exact(&TokenKind::RParen)?;

            if self.check_exact(&TokenKind::Arrow) {
                self.advance();
                let ret = self.parse_type()?;
                return Ok(Ty::Func(items, Box::new(ret), CallConv::Normal));
            }
            return match items.len() {
                0 => Err(self.error("Expected a type inside parentheses")),
                1 => Ok(items.pop().unwrap()),
                _ => Ok(Ty::Tuple(items)),
            };
        }

        let path = self.parse_type_path()?;
        if path.pack.is_empty() {
            if let Some(p) = prim_name(&path.name) {
                return Ok(Ty::Prim(p));
            }
        }
        Ok(Ty::Inst(path))
    }
}

fn prim_name(s: &str) -> Option<Prim> {
    match s {
        "int" => Some(Prim::Int),
        "float" => Some(Prim::Float),
        "bool" => Some(Prim::Bool),
        "short" => Some(Prim::Short),
        "string" => Some(Prim::Str),
        "void" => Some(Prim::Void),
        _ => None,
    }
}
