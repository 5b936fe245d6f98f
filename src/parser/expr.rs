use super::*;

impl Parser {
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assign()
    }

    /// Assignment is right-associative and loosest.
    fn parse_assign(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_equality()?;

        let op = match self.current().kind {
            TokenKind::Assign => BinOp::Assign,
            TokenKind::PlusAssign => BinOp::AddAssign,
            TokenKind::MinusAssign => BinOp::SubAssign,
            TokenKind::StarAssign => BinOp::MulAssign,
            TokenKind::SlashAssign => BinOp::DivAssign,
            _ => return Ok(left),
        };
        self.advance();
        self.skip_newlines();
        let right = self.parse_assign()?;
        let pos = left.pos.merge(&right.pos);
        Ok(Expr::new(
            ExprDef::BinOp(op, Box::new(left), Box::new(right)),
            pos,
        ))
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Eq => BinOp::Eq,
                TokenKind::Neq => BinOp::Neq,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.parse_comparison()?;
            let pos = left.pos.merge(&right.pos);
            left = Expr::new(ExprDef::BinOp(op, Box::new(left), Box::new(right)), pos);
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.parse_additive()?;
            let pos = left.pos.merge(&right.pos);
            left = Expr::new(ExprDef::BinOp(op, Box::new(left), Box::new(right)), pos);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.parse_multiplicative()?;
            let pos = left.pos.merge(&right.pos);
            left = Expr::new(ExprDef::BinOp(op, Box::new(left), Box::new(right)), pos);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.parse_unary()?;
            let pos = left.pos.merge(&right.pos);
            left = Expr::new(ExprDef::BinOp(op, Box::new(left), Box::new(right)), pos);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.here();
        let op = match self.current().kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Bang => UnOp::Not,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::new(
            ExprDef::UnOp(op, Box::new(operand)),
            self.span_from(start),
        ))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let start = self.here();
        let mut expr = self.parse_atom()?;

        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_ident("Expected field name after '.'")?;
                    expr = Expr::new(
                        ExprDef::Field(Box::new(expr), field),
                        self.span_from(start),
                    );
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_args()?;
                    expr = Expr::new(
                        ExprDef::Call(Box::new(expr), args),
                        self.span_from(start),
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.skip_newlines();
                    let index = self.parse_expr()?;
                    self.skip_newlines();
                    self.expect_exact(&TokenKind::RBracket)?;
                    expr = Expr::new(
                        ExprDef::Index(Box::new(expr), Box::new(index)),
                        self.span_from(start),
                    );
                }
                TokenKind::As => {
                    self.advance();
                    let ty = self.parse_type()?;
                    expr = Expr::new(ExprDef::Cast(Box::new(expr), ty), self.span_from(start));
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Arguments after a consumed '('.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.skip_newlines();
        let mut args = Vec::new();
        if !self.check_exact(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
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
        Ok(args)
    }

    pub(super) fn parse_block(&mut self) -> Result<Expr, ParseError> {
        let start = self.here();
        self.expect_exact(&TokenKind::LBrace)?;
        self.skip_seps();

        let mut exprs = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) {
            if self.is_eof() {
                return Err(self.error("Unterminated block"));
            }
            exprs.push(self.parse_expr()?);
            if matches!(self.current().kind, TokenKind::Newline | TokenKind::Semi) {
                self.skip_seps();
            } else if !self.check_exact(&TokenKind::RBrace) {
                return Err(self.error(format!(
                    "Expected end of expression, found {:?}",
                    self.current().kind
                )));
            }
        }
        self.expect_exact(&TokenKind::RBrace)?;

        Ok(Expr::new(ExprDef::Block(exprs), self.span_from(start)))
    }

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let start = self.here();
        self.expect_exact(&TokenKind::If)?;
        let cond = self.parse_expr()?;
        let then = self.parse_block()?;

        // `else` must follow the closing brace on the same line
        let otherwise = if self.check_exact(&TokenKind::Else) {
            self.advance();
            if self.check_exact(&TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(Expr::new(
            ExprDef::If(Box::new(cond), Box::new(then), otherwise),
            self.span_from(start),
        ))
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let start = self.here();

        match self.current().kind.clone() {
            TokenKind::Int(i) => {
                self.advance();
                Ok(Expr::new(
                    ExprDef::Const(Const::Int(i)),
                    self.span_from(start),
                ))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::new(
                    ExprDef::Const(Const::Float(f)),
                    self.span_from(start),
                ))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::new(
                    ExprDef::Const(Const::Str(s)),
                    self.span_from(start),
                ))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Expr::new(
                    ExprDef::Const(Const::Bool(b)),
                    self.span_from(start),
                ))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::new(
                    ExprDef::Const(Const::Null),
                    self.span_from(start),
                ))
            }
            TokenKind::This => {
                self.advance();
                Ok(Expr::new(ExprDef::This, self.span_from(start)))
            }
            TokenKind::Super => {
                self.advance();
                Ok(Expr::new(ExprDef::Super, self.span_from(start)))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::new(ExprDef::Ident(name), self.span_from(start)))
            }
            TokenKind::New => {
                self.advance();
                let path = self.parse_type_path()?;
                self.expect_exact(&TokenKind::LParen)?;
                let args = self.parse_args()?;
                Ok(Expr::new(ExprDef::New(path, args), self.span_from(start)))
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let mut items = vec![self.parse_expr()?];
                self.skip_newlines();
                while self.check_exact(&TokenKind::Comma) {
                    self.advance();
                    self.skip_newlines();
                    items.push(self.parse_expr()?);
                    self.skip_newlines();
                }
                self.expect_exact(&TokenKind::RParen)?;
                if items.len() == 1 {
                    let inner = items.pop().unwrap();
                    Ok(Expr::new(
                        ExprDef::Paren(Box::new(inner)),
                        self.span_from(start),
                    ))
                } else {
                    Ok(Expr::new(ExprDef::Tuple(items), self.span_from(start)))
                }
            }
            TokenKind::LBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => {
                self.advance();
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                Ok(Expr::new(
                    ExprDef::While(Box::new(cond), Box::new(body)),
                    self.span_from(start),
                ))
            }
            TokenKind::Var | TokenKind::Val => {
                let variability = if self.check_exact(&TokenKind::Var) {
                    Variability::Variable
                } else {
                    Variability::Constant
                };
                self.advance();
                let name = self.expect_ident("Expected binding name")?;
                let mut ty = None;
                if self.check_exact(&TokenKind::Colon) {
                    self.advance();
                    ty = Some(self.parse_type()?);
                }
                self.expect_exact(&TokenKind::Assign)?;
                self.skip_newlines();
                let init = self.parse_expr()?;
                Ok(Expr::new(
                    ExprDef::Decl(variability, ty, name, Box::new(init)),
                    self.span_from(start),
                ))
            }
            TokenKind::Break => {
                self.advance();
                Ok(Expr::new(ExprDef::Break, self.span_from(start)))
            }
            TokenKind::Continue => {
                self.advance();
                Ok(Expr::new(ExprDef::Continue, self.span_from(start)))
            }
            TokenKind::Return => {
                self.advance();
                let value = if matches!(
                    self.current().kind,
                    TokenKind::Newline | TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof
                ) {
                    None
                } else {
                    Some(Box::new(self.parse_expr()?))
                };
                Ok(Expr::new(ExprDef::Return(value), self.span_from(start)))
            }
            other => Err(self.error(format!("Expected an expression, found {:?}", other))),
        }
    }
}
