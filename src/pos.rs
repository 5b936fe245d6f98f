use std::fmt;

/// A line/column pair, 1-based, as produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    pub line: usize,
    pub col: usize,
}

impl Loc {
    pub fn new(line: usize, col: usize) -> Self {
        Loc { line, col }
    }
}

/// A source span: file name plus the first and last location covered by a
/// node. Every syntax tree node, untyped or typed, carries one; errors
/// report it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub file: String,
    pub min: Loc,
    pub max: Loc,
}

impl Pos {
    pub fn new(file: impl Into<String>, min: Loc, max: Loc) -> Self {
        Pos {
            file: file.into(),
            min,
            max,
        }
    }

    /// Synthetic position for nodes that have no source text of their own.
    pub fn none() -> Self {
        Pos {
            file: String::new(),
            min: Loc::new(0, 0),
            max: Loc::new(0, 0),
        }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Pos) -> Pos {
        let min = if (other.min.line, other.min.col) < (self.min.line, self.min.col) {
            other.min
        } else {
            self.min
        };
        let max = if (other.max.line, other.max.col) > (self.max.line, self.max.col) {
            other.max
        } else {
            self.max
        };
        Pos {
            file: self.file.clone(),
            min,
            max,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.min.line, self.min.col)
        } else {
            write!(f, "{}:{}:{}", self.file, self.min.line, self.min.col)
        }
    }
}
