use crate::ast::Variability;
use crate::types::Ty;

/// The lexical scope stack. One frame per function or constructor body;
/// the base frame backs member-initializer typing at module level.
///
/// Lookup searches frames top-of-stack downward, and within a frame the
/// most recent binding wins, so inner declarations shadow outer ones.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Vec<(String, Variability, Ty)>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Vec::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Vec::new());
    }

    pub fn pop_scope(&mut self) {
        self.frames.pop();
    }

    pub fn define(&mut self, name: impl Into<String>, variability: Variability, ty: Ty) {
        if self.frames.is_empty() {
            self.frames.push(Vec::new());
        }
        self.frames
            .last_mut()
            .unwrap()
            .push((name.into(), variability, ty));
    }

    pub fn lookup(&self, name: &str) -> Option<(Variability, &Ty)> {
        for frame in self.frames.iter().rev() {
            for (n, variability, ty) in frame.iter().rev() {
                if n == name {
                    return Some((*variability, ty));
                }
            }
        }
        None
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        ScopeStack::new()
    }
}
