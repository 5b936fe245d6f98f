use std::collections::{HashMap, HashSet};

use super::*;
use crate::types::{Ty, TypePath};

impl Parser {
    /// A dotted path: all segments but the last form the package.
    pub(super) fn parse_type_path(&mut self) -> Result<TypePath, ParseError> {
        let mut segs = vec![self.expect_ident("Expected a type path")?];
        while self.check_exact(&TokenKind::Dot) {
            self.advance();
            segs.push(self.expect_ident("Expected path segment after '.'")?);
        }
        let name = segs.pop().unwrap();
        Ok(TypePath::new(segs, name))
    }

    pub(super) fn parse_type_def(&mut self) -> Result<TypeDef, ParseError> {
        let start = self.here();

        let mut mods = HashSet::new();
        loop {
            let m = match self.current().kind {
                TokenKind::Public => MemberMod::Public,
                TokenKind::Private => MemberMod::Private,
                _ => break,
            };
            self.advance();
            mods.insert(m);
        }

        let kind_is_class = match self.current().kind {
            TokenKind::Class => true,
            TokenKind::Struct => false,
            _ => {
                return Err(self.error(format!(
                    "Expected 'class' or 'struct', found {:?}",
                    self.current().kind
                )))
            }
        };
        self.advance();

        let name = self.expect_ident("Expected type name")?;
        let path = TypePath::new(self.package.clone(), name);

        let kind = if kind_is_class {
            let mut extends = None;
            if self.check_exact(&TokenKind::Extends) {
                self.advance();
                extends = Some(self.parse_type_path()?);
            }
            let mut implements = Vec::new();
            if self.check_exact(&TokenKind::Implements) {
                self.advance();
                implements.push(self.parse_type_path()?);
                while self.check_exact(&TokenKind::Comma) {
                    self.advance();
                    implements.push(self.parse_type_path()?);
                }
            }
            TypeDefKind::Class {
                extends,
                implements,
            }
        } else {
            TypeDefKind::Struct
        };

        self.expect_exact(&TokenKind::LBrace)?;
        self.skip_seps();

        let mut members = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) {
            if self.is_eof() {
                return Err(self.error("Unterminated type body"));
            }
            members.push(self.parse_member()?);
            self.skip_seps();
        }
        self.expect_exact(&TokenKind::RBrace)?;

        Ok(TypeDef {
            path,
            kind,
            mods,
            members,
            pos: self.span_from(start),
        })
    }

    fn parse_member(&mut self) -> Result<MemberDef, ParseError> {
        let start = self.here();

        let mut atts = HashMap::new();
        while self.check_exact(&TokenKind::At) {
            self.advance();
            let name = self.expect_ident("Expected attribute name after '@'")?;
            self.expect_exact(&TokenKind::LParen)?;
            let value = self.parse_const_arg()?;
            self.expect_exact(&TokenKind::RParen)?;
            atts.insert(name, value);
            self.skip_seps();
        }

        let mut mods = HashSet::new();
        loop {
            let m = match self.current().kind {
                TokenKind::Static => MemberMod::Static,
                TokenKind::Public => MemberMod::Public,
                TokenKind::Private => MemberMod::Private,
                TokenKind::Extern => MemberMod::Extern,
                _ => break,
            };
            self.advance();
            mods.insert(m);
        }

        match self.current().kind {
            TokenKind::Var | TokenKind::Val => {
                let variability = if self.check_exact(&TokenKind::Var) {
                    Variability::Variable
                } else {
                    Variability::Constant
                };
                self.advance();
                let name = self.expect_ident("Expected field name")?;
                let mut ty = None;
                if self.check_exact(&TokenKind::Colon) {
                    self.advance();
                    ty = Some(self.parse_type()?);
                }
                let mut init = None;
                if self.check_exact(&TokenKind::Assign) {
                    self.advance();
                    self.skip_newlines();
                    init = Some(self.parse_expr()?);
                }
                Ok(MemberDef {
                    name,
                    kind: MemberKind::Var {
                        variability,
                        ty,
                        init,
                    },
                    mods,
                    atts,
                    pos: self.span_from(start),
                })
            }
            TokenKind::Func => {
                self.advance();
                let name = self.expect_ident("Expected function name")?;
                let params = self.parse_params()?;
                let ret = if self.check_exact(&TokenKind::Colon) {
                    self.advance();
                    self.parse_type()?
                } else {
                    Ty::VOID
                };
                let body = if mods.contains(&MemberMod::Extern) {
                    None
                } else {
                    Some(self.parse_block()?)
                };
                Ok(MemberDef {
                    name,
                    kind: MemberKind::Func { params, ret, body },
                    mods,
                    atts,
                    pos: self.span_from(start),
                })
            }
            TokenKind::New => {
                self.advance();
                let params = self.parse_params()?;
                let body = self.parse_block()?;
                Ok(MemberDef {
                    name: "new".to_string(),
                    kind: MemberKind::Constr { params, body },
                    mods,
                    atts,
                    pos: self.span_from(start),
                })
            }
            _ => Err(self.error(format!(
                "Expected a member declaration, found {:?}",
                self.current().kind
            ))),
        }
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect_exact(&TokenKind::LParen)?;
        self.skip_newlines();
        let mut params = Vec::new();
        if !self.check_exact(&TokenKind::RParen) {
            loop {
                let name = self.expect_ident("Expected parameter name")?;
                self.expect_exact(&TokenKind::Colon)?;
                let ty = self.parse_type()?;
                params.push(Param { name, ty });
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
        Ok(params)
    }

    fn parse_const_arg(&mut self) -> Result<Const, ParseError> {
        let value = match self.current().kind.clone() {
            TokenKind::Int(i) => Const::Int(i),
            TokenKind::Float(f) => Const::Float(f),
            TokenKind::Str(s) => Const::Str(s),
            TokenKind::Bool(b) => Const::Bool(b),
            TokenKind::Null => Const::Null,
            other => {
                return Err(self.error(format!(
                    "Expected a constant attribute argument, found {:?}",
                    other
                )))
            }
        };
        self.advance();
        Ok(value)
    }
}
