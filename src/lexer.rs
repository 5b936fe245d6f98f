use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    // Identifiers
    Ident(String),
    // Keywords
    Package,
    Import,
    Class,
    Struct,
    Extends,
    Implements,
    Var,
    Val,
    Func,
    New,
    Static,
    Public,
    Private,
    Extern,
    If,
    Else,
    While,
    Break,
    Continue,
    Return,
    This,
    Super,
    Null,
    As,
    // Operators
    Eq,          // ==
    Neq,         // !=
    Le,          // <=
    Ge,          // >=
    Lt,          // <
    Gt,          // >
    Assign,      // =
    PlusAssign,  // +=
    MinusAssign, // -=
    StarAssign,  // *=
    SlashAssign, // /=
    Plus,        // +
    Minus,       // -
    Star,        // *
    Slash,       // /
    Bang,        // !
    Arrow,       // ->
    Dot,         // .
    Comma,       // ,
    Colon,       // :
    Semi,        // ;
    At,          // @
    LParen,      // (
    RParen,      // )
    LBrace,      // {
    RBrace,      // }
    LBracket,    // [
    RBracket,    // ]
    // Structure
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Error)]
pub enum LexError {
    #[error("lex error [{line}:{col}]: {msg}")]
    Error {
        msg: String,
        line: usize,
        col: usize,
    },
}

fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "package" => Some(TokenKind::Package),
        "import" => Some(TokenKind::Import),
        "class" => Some(TokenKind::Class),
        "struct" => Some(TokenKind::Struct),
        "extends" => Some(TokenKind::Extends),
        "implements" => Some(TokenKind::Implements),
        "var" => Some(TokenKind::Var),
        "val" => Some(TokenKind::Val),
        "func" => Some(TokenKind::Func),
        "new" => Some(TokenKind::New),
        "static" => Some(TokenKind::Static),
        "public" => Some(TokenKind::Public),
        "private" => Some(TokenKind::Private),
        "extern" => Some(TokenKind::Extern),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "return" => Some(TokenKind::Return),
        "this" => Some(TokenKind::This),
        "super" => Some(TokenKind::Super),
        "null" => Some(TokenKind::Null),
        "as" => Some(TokenKind::As),
        "true" => Some(TokenKind::Bool(true)),
        "false" => Some(TokenKind::Bool(false)),
        _ => None,
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn error(&self, msg: impl Into<String>) -> LexError {
        LexError::Error {
            msg: msg.into(),
            line: self.line,
            col: self.col,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while self.pos < self.chars.len() {
            self.scan_token(&mut tokens)?;
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            line: self.line,
            col: self.col,
        });

        Ok(tokens)
    }

    fn scan_token(&mut self, tokens: &mut Vec<Token>) -> Result<(), LexError> {
        let ch = match self.current() {
            Some(c) => c,
            None => return Ok(()),
        };

        // Whitespace
        if ch == ' ' || ch == '\t' || ch == '\r' {
            self.advance();
            return Ok(());
        }

        // Newline: collapse runs, never emit one first
        if ch == '\n' {
            let line = self.line;
            let col = self.col;
            self.advance();
            let suppress = tokens
                .last()
                .map(|t| matches!(t.kind, TokenKind::Newline))
                .unwrap_or(true);
            if !suppress {
                tokens.push(Token {
                    kind: TokenKind::Newline,
                    line,
                    col,
                });
            }
            return Ok(());
        }

        // Comments
        if ch == '/' && self.peek(1) == Some('/') {
            while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
                self.advance();
            }
            return Ok(());
        }

        // Strings
        if ch == '"' {
            let tok = self.scan_string()?;
            tokens.push(tok);
            return Ok(());
        }

        // Numbers
        if ch.is_ascii_digit() {
            let tok = self.scan_number()?;
            tokens.push(tok);
            return Ok(());
        }

        // Identifiers / keywords
        if ch.is_alphabetic() || ch == '_' {
            let tok = self.scan_identifier();
            tokens.push(tok);
            return Ok(());
        }

        // Operators
        let tok = self.scan_operator()?;
        tokens.push(tok);
        Ok(())
    }

    fn scan_string(&mut self) -> Result<Token, LexError> {
        let line = self.line;
        let col = self.col;
        self.advance(); // consume opening "

        let mut value = String::new();
        loop {
            match self.current() {
                None | Some('\n') => return Err(self.error("Unterminated string literal")),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('0') => value.push('\0'),
                        Some(c) => value.push(c),
                        None => return Err(self.error("Unterminated string literal")),
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        Ok(Token {
            kind: TokenKind::Str(value),
            line,
            col,
        })
    }

    fn scan_number(&mut self) -> Result<Token, LexError> {
        let line = self.line;
        let col = self.col;
        let mut num_str = String::new();
        let mut is_float = false;

        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                num_str.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if self.current() == Some('.') && self.peek(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            is_float = true;
            num_str.push('.');
            self.advance();
            while let Some(c) = self.current() {
                if c.is_ascii_digit() {
                    num_str.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if is_float {
            let f: f64 = num_str
                .parse()
                .map_err(|_| self.error("Invalid floating-point number"))?;
            Ok(Token {
                kind: TokenKind::Float(f),
                line,
                col,
            })
        } else {
            let i: i64 = num_str
                .parse()
                .map_err(|_| self.error("Invalid integer literal"))?;
            Ok(Token {
                kind: TokenKind::Int(i),
                line,
                col,
            })
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut ident = String::new();

        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword(&ident).unwrap_or(TokenKind::Ident(ident));
        Token { kind, line, col }
    }

    fn scan_operator(&mut self) -> Result<Token, LexError> {
        let line = self.line;
        let col = self.col;
        let ch = self.advance().unwrap();

        let kind = match ch {
            '=' if self.current() == Some('=') => {
                self.advance();
                TokenKind::Eq
            }
            '!' if self.current() == Some('=') => {
                self.advance();
                TokenKind::Neq
            }
            '<' if self.current() == Some('=') => {
                self.advance();
                TokenKind::Le
            }
            '>' if self.current() == Some('=') => {
                self.advance();
                TokenKind::Ge
            }
            '+' if self.current() == Some('=') => {
                self.advance();
                TokenKind::PlusAssign
            }
            '-' if self.current() == Some('=') => {
                self.advance();
                TokenKind::MinusAssign
            }
            '*' if self.current() == Some('=') => {
                self.advance();
                TokenKind::StarAssign
            }
            '/' if self.current() == Some('=') => {
                self.advance();
                TokenKind::SlashAssign
            }
            '-' if self.current() == Some('>') => {
                self.advance();
                TokenKind::Arrow
            }
            '=' => TokenKind::Assign,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '!' => TokenKind::Bang,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semi,
            '@' => TokenKind::At,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            other => return Err(self.error(format!("Unknown character: {:?}", other))),
        };

        Ok(Token { kind, line, col })
    }
}
