use super::*;

impl Parser {
    pub fn new(tokens: Vec<Token>, file: impl Into<String>) -> Self {
        Parser {
            tokens,
            pos: 0,
            file: file.into(),
            package: Vec::new(),
        }
    }

    pub(super) fn error(&self, msg: impl Into<String>) -> ParseError {
        let tok = self.current();
        ParseError::Error {
            msg: msg.into(),
            line: tok.line,
            col: tok.col,
        }
    }

    pub(super) fn current(&self) -> &Token {
        if self.pos < self.tokens.len() {
            &self.tokens[self.pos]
        } else {
            self.tokens.last().unwrap()
        }
    }

    pub(super) fn advance(&mut self) -> &Token {
        let tok = if self.pos < self.tokens.len() {
            &self.tokens[self.pos]
        } else {
            self.tokens.last().unwrap()
        };
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub(super) fn check_exact(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    pub(super) fn is_newline(&self) -> bool {
        matches!(self.current().kind, TokenKind::Newline)
    }

    pub(super) fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    pub(super) fn expect_kind(&mut self, kind: &TokenKind, msg: &str) -> Result<Token, ParseError> {
        if std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.error(format!("{}: found {:?}", msg, self.current().kind)))
        }
    }

    pub(super) fn expect_exact(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if &self.current().kind == kind {
            Ok(self.advance().clone())
        } else {
            Err(self.error(format!(
                "Expected {:?}, found {:?}",
                kind,
                self.current().kind
            )))
        }
    }

    pub(super) fn expect_ident(&mut self, msg: &str) -> Result<String, ParseError> {
        let tok = self.expect_kind(&TokenKind::Ident(String::new()), msg)?;
        match tok.kind {
            TokenKind::Ident(s) => Ok(s),
            _ => unreachable!(),
        }
    }

    pub(super) fn skip_newlines(&mut self) {
        while self.is_newline() {
            self.advance();
        }
    }

    /// Skip over statement separators: newlines and semicolons.
    pub(super) fn skip_seps(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline | TokenKind::Semi) {
            self.advance();
        }
    }

    pub(super) fn here(&self) -> Loc {
        let tok = self.current();
        Loc::new(tok.line, tok.col)
    }

    pub(super) fn prev_loc(&self) -> Loc {
        if self.pos > 0 {
            let tok = &self.tokens[self.pos - 1];
            Loc::new(tok.line, tok.col)
        } else {
            self.here()
        }
    }

    pub(super) fn span_from(&self, start: Loc) -> Pos {
        Pos::new(self.file.clone(), start, self.prev_loc())
    }

    pub fn parse(&mut self) -> Result<Module, ParseError> {
        self.skip_seps();

        let mut package = Vec::new();
        if self.check_exact(&TokenKind::Package) {
            self.advance();
            package.push(self.expect_ident("Expected package name after 'package'")?);
            while self.check_exact(&TokenKind::Dot) {
                self.advance();
                package.push(self.expect_ident("Expected package segment after '.'")?);
            }
            self.skip_seps();
        }
        self.package = package.clone();

        let mut imports = Vec::new();
        while self.check_exact(&TokenKind::Import) {
            self.advance();
            imports.push(self.parse_type_path()?);
            self.skip_seps();
        }

        let mut defs = Vec::new();
        while !self.is_eof() {
            defs.push(self.parse_type_def()?);
            self.skip_seps();
        }

        Ok(Module {
            package,
            imports,
            defs,
        })
    }
}
